//! WebDriver session management
//!
//! Talks the W3C WebDriver protocol to a chromedriver endpoint over
//! plain HTTP. The `Browser` trait is the seam the executor and
//! sequencer drive through, so tests can swap in a scripted fake
//! without a real browser.

use crate::browser::locator::Locator;
use crate::core::error::{DocentError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// W3C key for element ids in WebDriver payloads
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque WebDriver element reference
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    /// The element as a script argument for `execute`
    pub fn to_arg(&self) -> serde_json::Value {
        json!({ ELEMENT_KEY: self.0 })
    }
}

/// What the browser reports about the current page
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub title: String,
    pub url: String,
    pub ready_state: String,
}

/// How to reach and configure the browser
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver endpoint, e.g. `http://localhost:9515`
    pub endpoint: String,
    /// Run the browser without a visible window
    pub headless: bool,
}

impl BrowserConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headless: false,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

/// The browser operations the demo pilot needs
///
/// `find` distinguishes "not on this page" (`Ok(None)`) from the
/// session itself failing (`Err`), so locator chains can keep trying
/// alternatives without masking real breakage.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn page_info(&self) -> Result<PageInfo>;

    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    async fn clear(&self, element: &ElementHandle) -> Result<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;

    async fn execute(&self, script: &str, args: Vec<serde_json::Value>)
        -> Result<serde_json::Value>;

    /// Bring an element into the viewport before interacting with it
    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<()> {
        self.execute("arguments[0].scrollIntoView(true);", vec![element.to_arg()])
            .await?;
        Ok(())
    }
}

/// Every WebDriver response wraps its payload in a `value` field
#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    value: serde_json::Value,
}

/// A live session against a chromedriver endpoint
pub struct WebDriverSession {
    http: reqwest::Client,
    base: String,
    session_id: String,
}

fn chrome_args(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--window-size=1920,1080".to_string(),
    ];
    if headless {
        args.push("--headless".to_string());
    }
    args
}

impl WebDriverSession {
    /// Start a new browser session
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let base = config.endpoint.trim_end_matches('/').to_string();

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": chrome_args(config.headless) }
                }
            }
        });

        let response = http
            .post(format!("{}/session", base))
            .json(&capabilities)
            .send()
            .await
            .map_err(|e| {
                DocentError::WebDriverError(format!("could not reach WebDriver at {}: {}", base, e))
            })?;

        let (status, value) = Self::decode(response).await?;
        if !status.is_success() {
            return Err(Self::protocol_error(&value));
        }

        let Some(session_id) = value["sessionId"].as_str() else {
            return Err(DocentError::WebDriverError(
                "new session response missing sessionId".into(),
            ));
        };

        tracing::info!("WebDriver session {} started at {}", session_id, base);

        Ok(Self {
            http,
            base,
            session_id: session_id.to_string(),
        })
    }

    /// End the session and close the browser window
    pub async fn close(self) -> Result<()> {
        let url = format!("{}/session/{}", self.base, self.session_id);
        self.http
            .delete(&url)
            .send()
            .await
            .map_err(|e| DocentError::WebDriverError(e.to_string()))?;
        tracing::info!("WebDriver session {} closed", self.session_id);
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn decode(
        response: reqwest::Response,
    ) -> Result<(reqwest::StatusCode, serde_json::Value)> {
        let status = response.status();
        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| DocentError::WebDriverError(e.to_string()))?;
        Ok((status, wire.value))
    }

    fn protocol_error(value: &serde_json::Value) -> DocentError {
        let error = value["error"].as_str().unwrap_or("unknown error");
        let message = value["message"].as_str().unwrap_or("");
        DocentError::WebDriverError(format!("{}: {}", error, message))
    }

    /// Run one session-scoped WebDriver command
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/session/{}{}", self.base, self.session_id, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocentError::WebDriverError(e.to_string()))?;

        let (status, value) = Self::decode(response).await?;
        if !status.is_success() {
            return Err(Self::protocol_error(&value));
        }
        Ok(value)
    }
}

#[async_trait]
impl Browser for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn page_info(&self) -> Result<PageInfo> {
        let title = self
            .command(Method::GET, "/title", None)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let url = self
            .command(Method::GET, "/url", None)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let ready_state = self
            .execute("return document.readyState", vec![])
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(PageInfo {
            title,
            url,
            ready_state,
        })
    }

    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
        let (using, value) = locator.strategy();
        let url = format!("{}/session/{}/element", self.base, self.session_id);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "using": using, "value": value }))
            .send()
            .await
            .map_err(|e| DocentError::WebDriverError(e.to_string()))?;

        let (status, body) = Self::decode(response).await?;
        if !status.is_success() {
            // Absent elements are an expected outcome, not a failure
            if body["error"].as_str() == Some("no such element") {
                return Ok(None);
            }
            return Err(Self::protocol_error(&body));
        }

        match body[ELEMENT_KEY].as_str() {
            Some(id) => Ok(Some(ElementHandle(id.to_string()))),
            None => Err(DocentError::WebDriverError(
                "element response missing element id".into(),
            )),
        }
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element.0),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/clear", element.0),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/value", element.0),
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    async fn execute(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_headless() {
        let args = chrome_args(true);
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));

        let args = chrome_args(false);
        assert!(!args.contains(&"--headless".to_string()));
    }

    #[test]
    fn test_element_arg_uses_w3c_key() {
        let element = ElementHandle("abc123".into());
        let arg = element.to_arg();
        assert_eq!(arg[ELEMENT_KEY].as_str(), Some("abc123"));
    }

    #[test]
    fn test_protocol_error_formatting() {
        let body = json!({ "error": "no such window", "message": "window was closed" });
        let err = WebDriverSession::protocol_error(&body);
        let text = err.to_string();
        assert!(text.contains("no such window"));
        assert!(text.contains("window was closed"));
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::new("http://localhost:9515/").with_headless(true);
        assert!(config.headless);
        assert_eq!(config.endpoint, "http://localhost:9515/");
    }
}
