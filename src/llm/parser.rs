//! Parse natural language commands into structured intents
//!
//! The LLM turns spoken commands into structured intent records, with a
//! keyword fallback when no LLM is configured or the call fails. Parsing
//! never fails outright - a command that cannot be understood comes back
//! as an `Unknown` intent with low confidence rather than an error.

use crate::command::rules::RuleBook;
use crate::llm::client::LlmClient;
use crate::llm::context::ProductContext;
use serde::{Deserialize, Deserializer, Serialize};

/// The kind of action a command asks for
///
/// Serialized as the lowercase intent name the LLM prompt uses.
/// Unrecognized names are preserved in `Other` so the executor can name
/// them when it apologizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentKind {
    /// Open a URL or named page
    Navigate,
    /// Click an element on the current page
    Click,
    /// Type a value into a form field
    Fill,
    /// Scroll the page
    Scroll,
    /// Pause for a duration
    Wait,
    /// Ask about the product (not a page action)
    Question,
    /// Could not determine intent
    Unknown,
    /// Parsing produced an error record
    Error,
    /// An intent name this build does not know
    Other(String),
}

impl From<String> for IntentKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "navigate" => IntentKind::Navigate,
            "click" => IntentKind::Click,
            "fill" => IntentKind::Fill,
            "scroll" => IntentKind::Scroll,
            "wait" => IntentKind::Wait,
            "question" => IntentKind::Question,
            "unknown" => IntentKind::Unknown,
            "error" => IntentKind::Error,
            _ => IntentKind::Other(s),
        }
    }
}

impl From<IntentKind> for String {
    fn from(kind: IntentKind) -> Self {
        kind.to_string()
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentKind::Navigate => write!(f, "navigate"),
            IntentKind::Click => write!(f, "click"),
            IntentKind::Fill => write!(f, "fill"),
            IntentKind::Scroll => write!(f, "scroll"),
            IntentKind::Wait => write!(f, "wait"),
            IntentKind::Question => write!(f, "question"),
            IntentKind::Unknown => write!(f, "unknown"),
            IntentKind::Error => write!(f, "error"),
            IntentKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Structured intent parsed from a natural language command
///
/// Every field except `kind` is optional; the executor decides which
/// fields a given kind actually needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRecord {
    /// The type of action requested
    #[serde(rename = "intent")]
    pub kind: IntentKind,
    /// Full URL for navigate intents
    #[serde(default)]
    pub target_url: Option<String>,
    /// Spoken page name for navigate intents
    #[serde(default)]
    pub page_name: Option<String>,
    /// Visible text of the element to click
    #[serde(default)]
    pub element_text: Option<String>,
    /// CSS selector for the element to click
    #[serde(default)]
    pub element_selector: Option<String>,
    /// Field name for fill intents
    #[serde(default)]
    pub field_name: Option<String>,
    /// Value to type for fill intents
    #[serde(default)]
    pub value: Option<String>,
    /// Scroll direction (down, up, top, bottom)
    #[serde(default)]
    pub direction: Option<String>,
    /// The question text for question intents
    #[serde(default)]
    pub question: Option<String>,
    /// Seconds to wait for wait intents
    #[serde(default, deserialize_with = "de_duration")]
    pub duration: Option<f32>,
    /// Parser's confidence in the interpretation (0.0 - 1.0)
    #[serde(default)]
    pub confidence: f32,
    /// The raw command this record was parsed from
    #[serde(default)]
    pub original_command: String,
    /// Why parsing failed, for unknown records
    #[serde(default)]
    pub error: Option<String>,
}

impl Default for IntentRecord {
    fn default() -> Self {
        Self {
            kind: IntentKind::Unknown,
            target_url: None,
            page_name: None,
            element_text: None,
            element_selector: None,
            field_name: None,
            value: None,
            direction: None,
            question: None,
            duration: None,
            confidence: 0.0,
            original_command: String::new(),
            error: None,
        }
    }
}

/// Accept durations the LLM writes as either a number or a string
fn de_duration<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f32),
        Str(String),
    }

    let raw: Option<NumOrStr> = Option::deserialize(deserializer)?;
    // Non-finite values count as unparseable so the default applies.
    Ok(match raw {
        Some(NumOrStr::Num(n)) => Some(n).filter(|f| f.is_finite()),
        Some(NumOrStr::Str(s)) => s.trim().parse::<f32>().ok().filter(|f| f.is_finite()),
        None => None,
    })
}

const PARSE_SYSTEM_PROMPT: &str = r#"You are a command parser for a voice-controlled website demo pilot. Parse the user's spoken command into a structured JSON intent.

Intent kinds (use the lowercase name exactly):
- "navigate": open a URL or a named page. Fields: target_url (full URL if stated), page_name (spoken page name).
- "click": click an element. Fields: element_text (visible text), element_selector (CSS selector if stated).
- "fill": type into a form field. Fields: field_name, value.
- "scroll": scroll the page. Fields: direction ("down", "up", "top", or "bottom").
- "wait": pause. Fields: duration (seconds, as a number).
- "question": the speaker is asking about the product, not directing the browser. Fields: question (the question text).

Rules:
1. Return ONLY a JSON object, no prose and no code fences.
2. Always include "intent" and "confidence" (0.0 to 1.0).
3. Only include the fields the intent needs. Omit fields you cannot infer.
4. Prefer page_name over target_url unless the command states a full URL.
5. Questions about the product ("what does it cost?") are "question", not browser actions.

Examples:
"Go to the dashboard" -> {"intent": "navigate", "page_name": "dashboard", "confidence": 0.9}
"Open https://app.example/profile" -> {"intent": "navigate", "target_url": "https://app.example/profile", "confidence": 0.95}
"Click the sign in button" -> {"intent": "click", "element_text": "sign in", "confidence": 0.9}
"Fill email as demo@example.com" -> {"intent": "fill", "field_name": "email", "value": "demo@example.com", "confidence": 0.9}
"Scroll down a bit" -> {"intent": "scroll", "direction": "down", "confidence": 0.85}
"Wait three seconds" -> {"intent": "wait", "duration": 3, "confidence": 0.9}
"How much does this cost?" -> {"intent": "question", "question": "How much does this cost?", "confidence": 0.9}"#;

/// Normalize a spoken command into an intent record
///
/// Tries the LLM first when a client is available, then falls back to
/// keyword matching. Never fails: the worst case is an `Unknown` record
/// carrying the raw command and a parse error note.
pub async fn normalize(
    client: Option<&LlmClient>,
    input: &str,
    rules: &RuleBook,
    context: &ProductContext,
) -> IntentRecord {
    if let Some(client) = client {
        match llm_parse(client, input, context).await {
            Ok(record) => return enrich(record, input, rules, context),
            Err(e) => {
                tracing::warn!("LLM parse failed, using keyword fallback: {}", e);
            }
        }
    }

    fallback_parse(input, rules)
}

async fn llm_parse(
    client: &LlmClient,
    input: &str,
    context: &ProductContext,
) -> crate::core::error::Result<IntentRecord> {
    let user_prompt = format!(
        "PRODUCT CONTEXT:\n{}\n\nCOMMAND:\n{}\n\nReturn only the JSON:",
        context.summary(),
        input
    );

    let response = client.complete(PARSE_SYSTEM_PROMPT, &user_prompt).await?;
    let json_str = extract_json(&response).ok_or_else(|| {
        crate::core::error::DocentError::LlmError(format!(
            "no JSON object in parser response: {}",
            response
        ))
    })?;

    let record: IntentRecord = serde_json::from_str(json_str)?;
    Ok(record)
}

/// Extract a JSON object from LLM response text
///
/// Models sometimes wrap JSON in code fences or prose. Take everything
/// between the first '{' and the last '}'.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Fill the gaps an LLM record tends to leave
fn enrich(
    mut record: IntentRecord,
    input: &str,
    rules: &RuleBook,
    context: &ProductContext,
) -> IntentRecord {
    record.original_command = input.to_string();

    if record.confidence <= 0.0 {
        record.confidence = 0.8;
    }
    record.confidence = record.confidence.clamp(0.0, 1.0);

    if record.kind == IntentKind::Navigate && record.target_url.is_none() {
        record.target_url = record
            .page_name
            .as_deref()
            .and_then(|name| context.find_page(name))
            .map(|page| page.url.clone())
            .or_else(|| rules.urls.resolve(input));
    }

    if record.kind == IntentKind::Question && record.question.is_none() {
        record.question = Some(input.to_string());
    }

    record
}

/// Keyword-based fallback parser
///
/// Used when no LLM is configured or the call fails. Matches the
/// command against ordered keyword rules; earlier rules win. Commands
/// that match nothing come back as `Unknown`.
pub fn fallback_parse(input: &str, rules: &RuleBook) -> IntentRecord {
    let lower = input.to_lowercase();

    let mut record = IntentRecord {
        original_command: input.to_string(),
        ..Default::default()
    };

    let Some(kind) = rules.keywords.match_kind(&lower) else {
        record.error = Some("Could not parse command".into());
        record.confidence = 0.3;
        return record;
    };

    match kind {
        IntentKind::Navigate => {
            record.kind = IntentKind::Navigate;
            record.target_url = rules.urls.resolve(input);
            record.confidence = 0.6;
        }
        IntentKind::Click => {
            record.kind = IntentKind::Click;
            record.element_text = Some(crate::command::rules::extract_element_text(&lower));
            record.confidence = 0.6;
        }
        IntentKind::Fill => {
            let (field, value) = crate::command::rules::extract_field_and_value(&lower);
            record.kind = IntentKind::Fill;
            record.field_name = Some(field);
            record.value = Some(value);
            record.confidence = 0.6;
        }
        IntentKind::Scroll => {
            record.kind = IntentKind::Scroll;
            record.direction = Some(scroll_direction(&lower));
            record.confidence = 0.6;
        }
        IntentKind::Question => {
            record.kind = IntentKind::Question;
            record.question = Some(input.to_string());
            record.confidence = 0.7;
        }
        _ => {
            record.error = Some("Could not parse command".into());
            record.confidence = 0.3;
        }
    }

    record
}

/// Pick a scroll direction from the command text
///
/// Scans specific directions before generic ones so "scroll to top"
/// never matches the "up" in a longer word.
fn scroll_direction(lower: &str) -> String {
    for dir in ["top", "bottom", "up", "down"] {
        if lower.contains(dir) {
            return dir.to_string();
        }
    }
    "down".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::script::sample_product;
    use proptest::prelude::*;

    fn rules() -> RuleBook {
        RuleBook::for_product(&sample_product()).unwrap()
    }

    #[test]
    fn test_kind_from_string() {
        assert_eq!(IntentKind::from("navigate".to_string()), IntentKind::Navigate);
        assert_eq!(IntentKind::from("NAVIGATE".to_string()), IntentKind::Navigate);
        assert_eq!(IntentKind::from("question".to_string()), IntentKind::Question);
        assert_eq!(
            IntentKind::from("teleport".to_string()),
            IntentKind::Other("teleport".to_string())
        );
    }

    #[test]
    fn test_kind_display_roundtrip() {
        for kind in [
            IntentKind::Navigate,
            IntentKind::Click,
            IntentKind::Fill,
            IntentKind::Scroll,
            IntentKind::Wait,
            IntentKind::Question,
            IntentKind::Unknown,
        ] {
            let name = kind.to_string();
            assert_eq!(IntentKind::from(name), kind);
        }
    }

    #[test]
    fn test_extract_json_plain() {
        let text = r#"{"intent": "navigate", "confidence": 0.9}"#;
        assert_eq!(extract_json(text), Some(text));
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "```json\n{\"intent\": \"click\"}\n```";
        assert_eq!(extract_json(text), Some("{\"intent\": \"click\"}"));
    }

    #[test]
    fn test_extract_json_with_prose() {
        let text = "Here is the intent: {\"intent\": \"wait\", \"duration\": 2} as requested.";
        assert_eq!(
            extract_json(text),
            Some("{\"intent\": \"wait\", \"duration\": 2}")
        );
    }

    #[test]
    fn test_extract_json_none() {
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_record_parses_string_duration() {
        let record: IntentRecord =
            serde_json::from_str(r#"{"intent": "wait", "duration": "2.5"}"#).unwrap();
        assert_eq!(record.kind, IntentKind::Wait);
        assert_eq!(record.duration, Some(2.5));
    }

    #[test]
    fn test_record_parses_numeric_duration() {
        let record: IntentRecord =
            serde_json::from_str(r#"{"intent": "wait", "duration": 3}"#).unwrap();
        assert_eq!(record.duration, Some(3.0));
    }

    #[test]
    fn test_record_drops_non_finite_duration() {
        // "inf" parses as a float but is useless as a sleep length
        let record: IntentRecord =
            serde_json::from_str(r#"{"intent": "wait", "duration": "inf"}"#).unwrap();
        assert_eq!(record.duration, None);

        // 1e39 overflows f32 to infinity on the numeric path
        let record: IntentRecord =
            serde_json::from_str(r#"{"intent": "wait", "duration": 1e39}"#).unwrap();
        assert_eq!(record.duration, None);

        let record: IntentRecord =
            serde_json::from_str(r#"{"intent": "wait", "duration": "nan"}"#).unwrap();
        assert_eq!(record.duration, None);
    }

    #[test]
    fn test_record_unknown_kind_preserved() {
        let record: IntentRecord =
            serde_json::from_str(r#"{"intent": "teleport", "confidence": 0.5}"#).unwrap();
        assert_eq!(record.kind, IntentKind::Other("teleport".to_string()));
    }

    #[test]
    fn test_fallback_navigate() {
        let record = fallback_parse("go to the dashboard", &rules());
        assert_eq!(record.kind, IntentKind::Navigate);
        assert!(record.target_url.is_some());
        assert_eq!(record.original_command, "go to the dashboard");
    }

    #[test]
    fn test_fallback_click() {
        let record = fallback_parse("click the sign in button", &rules());
        assert_eq!(record.kind, IntentKind::Click);
        assert_eq!(record.element_text.as_deref(), Some("sign in button"));
    }

    #[test]
    fn test_fallback_fill() {
        let record = fallback_parse("fill email as demo@example.com", &rules());
        assert_eq!(record.kind, IntentKind::Fill);
        assert_eq!(record.field_name.as_deref(), Some("email"));
        assert_eq!(record.value.as_deref(), Some("demo@example.com"));
    }

    #[test]
    fn test_fallback_scroll_directions() {
        let down = fallback_parse("scroll down", &rules());
        assert_eq!(down.direction.as_deref(), Some("down"));

        let top = fallback_parse("scroll to the top", &rules());
        assert_eq!(top.direction.as_deref(), Some("top"));

        let bottom = fallback_parse("scroll to the bottom", &rules());
        assert_eq!(bottom.direction.as_deref(), Some("bottom"));

        let bare = fallback_parse("scroll the page", &rules());
        assert_eq!(bare.direction.as_deref(), Some("down"));
    }

    #[test]
    fn test_fallback_question() {
        let record = fallback_parse("what does this cost?", &rules());
        assert_eq!(record.kind, IntentKind::Question);
        assert_eq!(record.question.as_deref(), Some("what does this cost?"));
        assert!((record.confidence - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_fallback_unknown() {
        let record = fallback_parse("frobnicate the widget", &rules());
        assert_eq!(record.kind, IntentKind::Unknown);
        assert!(record.error.is_some());
        assert!((record.confidence - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_fallback_keyword_order_navigate_wins() {
        // "go" appears before "click" in the rule order, so a command
        // containing both parses as navigate
        let record = fallback_parse("go click something", &rules());
        assert_eq!(record.kind, IntentKind::Navigate);
    }

    #[tokio::test]
    async fn test_normalize_without_llm_uses_fallback() {
        let rules = rules();
        let ctx = ProductContext::empty();
        let record = normalize(None, "go home", &rules, &ctx).await;
        assert_eq!(record.kind, IntentKind::Navigate);
        assert_eq!(record.original_command, "go home");
    }

    #[test]
    fn test_enrich_fills_navigate_url_from_page_name() {
        let config = sample_product();
        let rules = RuleBook::for_product(&config).unwrap();
        let ctx = ProductContext::from_config(&config);

        let record = IntentRecord {
            kind: IntentKind::Navigate,
            page_name: Some("profile".into()),
            confidence: 0.9,
            ..Default::default()
        };

        let enriched = enrich(record, "go to my profile", &rules, &ctx);
        assert!(enriched.target_url.is_some());
        assert!(enriched.target_url.unwrap().contains("profile"));
    }

    #[test]
    fn test_enrich_defaults_confidence() {
        let rules = rules();
        let ctx = ProductContext::empty();

        let record = IntentRecord {
            kind: IntentKind::Click,
            element_text: Some("submit".into()),
            ..Default::default()
        };

        let enriched = enrich(record, "click submit", &rules, &ctx);
        assert!((enriched.confidence - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_enrich_fills_question_text() {
        let rules = rules();
        let ctx = ProductContext::empty();

        let record = IntentRecord {
            kind: IntentKind::Question,
            confidence: 0.9,
            ..Default::default()
        };

        let enriched = enrich(record, "is it secure?", &rules, &ctx);
        assert_eq!(enriched.question.as_deref(), Some("is it secure?"));
    }

    proptest! {
        // The keyword path takes no service calls and holds no state, so
        // parsing the same text twice must yield the same record.
        #[test]
        fn fallback_parse_is_pure(s in ".{0,80}") {
            let rules = rules();
            prop_assert_eq!(fallback_parse(&s, &rules), fallback_parse(&s, &rules));
        }
    }
}
