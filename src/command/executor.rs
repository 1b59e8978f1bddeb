//! Command execution - drives resolved actions through the browser
//!
//! Every executed action produces an `ActionResult` whose message is
//! written to be spoken aloud. Demo-level failures (element not found,
//! page refused to load) come back as `Ok` results with `success:
//! false` so the narration keeps flowing; only infrastructure failures
//! (the browser session itself breaking) surface as errors.

use crate::browser::locator::{click_chain, fill_chain};
use crate::browser::session::Browser;
use crate::command::resolver::{ResolvedAction, ScrollDirection};
use crate::core::config::config;
use crate::core::error::{DocentError, Result};
use crate::llm::parser::IntentKind;
use crate::llm::qa::QaAnswerer;
use serde::Serialize;
use tokio::time::sleep;

/// Outcome of one executed action, phrased for narration
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    /// Whether the action did what the command asked
    pub success: bool,
    /// Speakable description of what happened
    pub message: String,
    /// The kind of action that ran
    pub action: IntentKind,
    pub url: Option<String>,
    pub title: Option<String>,
    pub field: Option<String>,
    pub value: Option<String>,
    pub direction: Option<String>,
    pub duration: Option<f32>,
    /// Short failure note for logs, absent on success
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(action: IntentKind, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            action,
            url: None,
            title: None,
            field: None,
            value: None,
            direction: None,
            duration: None,
            error: None,
        }
    }

    pub fn failed(
        action: IntentKind,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            action,
            url: None,
            title: None,
            field: None,
            value: None,
            direction: None,
            duration: None,
            error: Some(error.into()),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Executes resolved actions against a browser session
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute one action, returning a speakable result
    ///
    /// `Err` means the browser session itself failed mid-action;
    /// everything the demo can talk through comes back as `Ok`.
    pub async fn execute(
        browser: &dyn Browser,
        action: ResolvedAction,
        answerer: &QaAnswerer,
    ) -> Result<ActionResult> {
        match action {
            ResolvedAction::Navigate { url, page_name } => {
                Self::navigate(browser, url, page_name).await
            }
            ResolvedAction::Click {
                element_text,
                element_selector,
            } => Self::click(browser, element_text, element_selector).await,
            ResolvedAction::Fill { field_name, value } => {
                Self::fill(browser, field_name, value).await
            }
            ResolvedAction::Scroll { direction } => Self::scroll(browser, direction).await,
            ResolvedAction::Wait { seconds } => {
                // Durations the sleep timer cannot represent fall back
                // to the default instead of panicking mid-command.
                let (wait, seconds) = match std::time::Duration::try_from_secs_f32(seconds) {
                    Ok(wait) => (wait, seconds),
                    Err(_) => {
                        let default = config().default_wait_secs;
                        (std::time::Duration::from_secs_f32(default), default)
                    }
                };
                sleep(wait).await;
                Ok(
                    ActionResult::ok(IntentKind::Wait, format!("I waited for {} seconds.", seconds))
                        .with_duration(seconds),
                )
            }
            ResolvedAction::Question { text } => {
                let answer = answerer.answer(&text).await;
                Ok(ActionResult::ok(IntentKind::Question, answer))
            }
            ResolvedAction::Unknown { kind } => Ok(ActionResult::failed(
                kind.clone(),
                format!(
                    "I don't understand how to handle the '{}' action. \
                     Could you try rephrasing your command?",
                    kind
                ),
                format!("Unknown intent: {}", kind),
            )),
        }
    }

    async fn navigate(
        browser: &dyn Browser,
        url: Option<String>,
        page_name: Option<String>,
    ) -> Result<ActionResult> {
        let Some(url) = url else {
            let note = page_name
                .map(|p| format!("No URL specified for page '{}'", p))
                .unwrap_or_else(|| "No URL specified".to_string());
            return Ok(ActionResult::failed(
                IntentKind::Navigate,
                "I couldn't navigate because no URL was specified.",
                note,
            ));
        };

        if let Err(e) = browser.goto(&url).await {
            return Ok(ActionResult::failed(
                IntentKind::Navigate,
                format!("I couldn't navigate to the page. {}", e),
                e.to_string(),
            )
            .with_url(url));
        }

        sleep(config().page_settle).await;

        let result = match browser.page_info().await {
            Ok(info) if !info.title.is_empty() => ActionResult::ok(
                IntentKind::Navigate,
                format!("I navigated to {} and loaded the '{}' page.", url, info.title),
            )
            .with_title(info.title),
            Ok(_) => ActionResult::ok(
                IntentKind::Navigate,
                format!("I navigated to {} and the page loaded successfully.", url),
            ),
            Err(e) => {
                tracing::debug!("page info unavailable after navigation: {}", e);
                ActionResult::ok(IntentKind::Navigate, format!("I navigated to {}.", url))
            }
        };

        Ok(result.with_url(url))
    }

    async fn click(
        browser: &dyn Browser,
        element_text: Option<String>,
        element_selector: Option<String>,
    ) -> Result<ActionResult> {
        if element_text.is_none() && element_selector.is_none() {
            return Ok(ActionResult::failed(
                IntentKind::Click,
                "I couldn't click because no element was specified.",
                "No element specified",
            ));
        }

        let target = element_text
            .as_deref()
            .or(element_selector.as_deref())
            .unwrap_or("element")
            .to_string();

        for locator in click_chain(element_text.as_deref(), element_selector.as_deref()) {
            let Some(element) = browser.find(&locator).await? else {
                continue;
            };

            browser.scroll_into_view(&element).await.ok();
            sleep(config().element_settle).await;

            return Ok(match browser.click(&element).await {
                Ok(()) => ActionResult::ok(
                    IntentKind::Click,
                    format!("I clicked on '{}' and the action was completed.", target),
                ),
                Err(e) => ActionResult::failed(
                    IntentKind::Click,
                    format!("I had trouble clicking '{}': {}", target, e),
                    e.to_string(),
                ),
            });
        }

        Ok(ActionResult::failed(
            IntentKind::Click,
            format!("I couldn't find the element '{}' to click.", target),
            format!("Element '{}' not found", target),
        ))
    }

    async fn fill(
        browser: &dyn Browser,
        field_name: Option<String>,
        value: Option<String>,
    ) -> Result<ActionResult> {
        let (Some(field), Some(value)) = (field_name, value) else {
            return Ok(ActionResult::failed(
                IntentKind::Fill,
                "I couldn't fill the field because field name or value is missing.",
                "Missing field name or value",
            ));
        };

        for locator in fill_chain(&field) {
            let Some(element) = browser.find(&locator).await? else {
                continue;
            };

            browser.scroll_into_view(&element).await.ok();
            sleep(config().element_settle).await;

            return Ok(match async {
                browser.clear(&element).await?;
                browser.send_keys(&element, &value).await
            }
            .await
            {
                Ok(()) => ActionResult::ok(
                    IntentKind::Fill,
                    format!("I filled in the {} field with '{}'.", field, value),
                )
                .with_field(field)
                .with_value(value),
                Err(e) => ActionResult::failed(
                    IntentKind::Fill,
                    format!("I had trouble filling the {} field: {}", field, e),
                    e.to_string(),
                ),
            });
        }

        Ok(ActionResult::failed(
            IntentKind::Fill,
            format!("I couldn't find the {} field to fill.", field),
            format!("Field '{}' not found", field),
        ))
    }

    async fn scroll(browser: &dyn Browser, direction: ScrollDirection) -> Result<ActionResult> {
        let px = config().scroll_pixels;
        // An unrecognized direction runs no script but is still narrated.
        let script = match &direction {
            ScrollDirection::Down => Some(format!("window.scrollBy(0, {});", px)),
            ScrollDirection::Up => Some(format!("window.scrollBy(0, -{});", px)),
            ScrollDirection::Top => Some("window.scrollTo(0, 0);".to_string()),
            ScrollDirection::Bottom => {
                Some("window.scrollTo(0, document.body.scrollHeight);".to_string())
            }
            ScrollDirection::Other(_) => None,
        };

        if let Some(script) = script {
            if let Err(e) = browser.execute(&script, vec![]).await {
                return Ok(ActionResult::failed(
                    IntentKind::Scroll,
                    format!("I couldn't scroll the page. {}", e),
                    e.to_string(),
                ));
            }
        }

        let spoken = direction.as_str();
        Ok(ActionResult::ok(
            IntentKind::Scroll,
            format!("I scrolled {} on the page.", spoken),
        )
        .with_direction(spoken))
    }
}

/// Spoken result for an action that died on an infrastructure error
pub fn apologize(kind: IntentKind, err: &DocentError) -> ActionResult {
    ActionResult::failed(
        kind,
        format!("I encountered an error: {}", err),
        err.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_result() {
        let result = ActionResult::ok(IntentKind::Navigate, "done");
        assert!(result.success);
        assert_eq!(result.message, "done");
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failed_result_keeps_error() {
        let result = ActionResult::failed(IntentKind::Click, "could not click", "not found");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("not found"));
    }

    #[test]
    fn test_builders() {
        let result = ActionResult::ok(IntentKind::Fill, "filled")
            .with_field("email")
            .with_value("demo@example.com");
        assert_eq!(result.field.as_deref(), Some("email"));
        assert_eq!(result.value.as_deref(), Some("demo@example.com"));
    }

    #[test]
    fn test_apologize_is_speakable() {
        let err = DocentError::WebDriverError("connection reset".into());
        let result = apologize(IntentKind::Navigate, &err);
        assert!(!result.success);
        assert!(result.message.starts_with("I encountered an error:"));
        assert!(result.message.contains("connection reset"));
    }

    #[test]
    fn test_result_serializes() {
        let result = ActionResult::ok(IntentKind::Wait, "I waited for 2 seconds.").with_duration(2.0);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"action\":\"wait\""));
    }
}
