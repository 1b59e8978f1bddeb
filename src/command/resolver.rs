//! Intent resolution - converts parsed intent records into typed actions
//!
//! The parser produces loosely-typed records with mostly-optional
//! fields. Resolution turns each record into one `ResolvedAction`
//! variant carrying exactly the fields that action needs, filling
//! defaults where the record is silent. Resolution is total: every
//! record maps to some action, with unhandled kinds landing in
//! `Unknown`.

use crate::core::config::config;
use crate::llm::parser::{IntentKind, IntentRecord};

/// A fully-typed action ready for execution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAction {
    /// Open a URL or named page
    Navigate {
        url: Option<String>,
        page_name: Option<String>,
    },
    /// Click an element found by text or selector
    Click {
        element_text: Option<String>,
        element_selector: Option<String>,
    },
    /// Type a value into a form field
    Fill {
        field_name: Option<String>,
        value: Option<String>,
    },
    /// Scroll the page
    Scroll { direction: ScrollDirection },
    /// Pause for a duration
    Wait { seconds: f32 },
    /// Answer a question about the product
    Question { text: String },
    /// A kind this build cannot act on
    Unknown { kind: IntentKind },
}

/// Scroll directions the executor knows how to script
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollDirection {
    Down,
    Up,
    Top,
    Bottom,
    /// A direction with no matching script
    Other(String),
}

impl ScrollDirection {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "down" => ScrollDirection::Down,
            "up" => ScrollDirection::Up,
            "top" => ScrollDirection::Top,
            "bottom" => ScrollDirection::Bottom,
            _ => ScrollDirection::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScrollDirection::Down => "down",
            ScrollDirection::Up => "up",
            ScrollDirection::Top => "top",
            ScrollDirection::Bottom => "bottom",
            ScrollDirection::Other(s) => s,
        }
    }
}

/// Resolve a parsed intent record to a typed action
pub fn resolve(record: &IntentRecord) -> ResolvedAction {
    match &record.kind {
        IntentKind::Navigate => ResolvedAction::Navigate {
            url: record.target_url.clone(),
            page_name: record.page_name.clone(),
        },
        IntentKind::Click => ResolvedAction::Click {
            element_text: record.element_text.clone(),
            element_selector: record.element_selector.clone(),
        },
        IntentKind::Fill => ResolvedAction::Fill {
            field_name: record.field_name.clone(),
            value: record.value.clone(),
        },
        IntentKind::Scroll => ResolvedAction::Scroll {
            direction: ScrollDirection::parse(record.direction.as_deref().unwrap_or("down")),
        },
        IntentKind::Wait => ResolvedAction::Wait {
            seconds: record.duration.unwrap_or(config().default_wait_secs),
        },
        IntentKind::Question => ResolvedAction::Question {
            text: record
                .question
                .clone()
                .unwrap_or_else(|| record.original_command.clone()),
        },
        kind => ResolvedAction::Unknown { kind: kind.clone() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_navigate() {
        let record = IntentRecord {
            kind: IntentKind::Navigate,
            target_url: Some("https://app.example/".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve(&record),
            ResolvedAction::Navigate {
                url: Some("https://app.example/".into()),
                page_name: None,
            }
        );
    }

    #[test]
    fn test_resolve_scroll_defaults_down() {
        let record = IntentRecord {
            kind: IntentKind::Scroll,
            ..Default::default()
        };
        assert_eq!(
            resolve(&record),
            ResolvedAction::Scroll {
                direction: ScrollDirection::Down,
            }
        );
    }

    #[test]
    fn test_resolve_scroll_unknown_direction_preserved() {
        let record = IntentRecord {
            kind: IntentKind::Scroll,
            direction: Some("sideways".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve(&record),
            ResolvedAction::Scroll {
                direction: ScrollDirection::Other("sideways".into()),
            }
        );
    }

    #[test]
    fn test_resolve_wait_uses_default_duration() {
        let record = IntentRecord {
            kind: IntentKind::Wait,
            ..Default::default()
        };
        let ResolvedAction::Wait { seconds } = resolve(&record) else {
            panic!("expected wait");
        };
        assert!((seconds - crate::core::config::config().default_wait_secs).abs() < 0.001);
    }

    #[test]
    fn test_resolve_wait_keeps_parsed_duration() {
        let record = IntentRecord {
            kind: IntentKind::Wait,
            duration: Some(3.5),
            ..Default::default()
        };
        assert_eq!(resolve(&record), ResolvedAction::Wait { seconds: 3.5 });
    }

    #[test]
    fn test_resolve_question_falls_back_to_original_command() {
        let record = IntentRecord {
            kind: IntentKind::Question,
            original_command: "is it fast?".into(),
            ..Default::default()
        };
        assert_eq!(
            resolve(&record),
            ResolvedAction::Question {
                text: "is it fast?".into(),
            }
        );
    }

    #[test]
    fn test_resolve_unknown_keeps_kind() {
        let record = IntentRecord {
            kind: IntentKind::Other("teleport".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve(&record),
            ResolvedAction::Unknown {
                kind: IntentKind::Other("teleport".into()),
            }
        );
    }

    #[test]
    fn test_scroll_direction_parse_case_insensitive() {
        assert_eq!(ScrollDirection::parse("DOWN"), ScrollDirection::Down);
        assert_eq!(ScrollDirection::parse("Top"), ScrollDirection::Top);
        assert_eq!(ScrollDirection::parse("bottom").as_str(), "bottom");
    }
}
