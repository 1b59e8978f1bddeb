//! Shared test fixtures: a scripted in-memory browser and fast timing
#![allow(dead_code)]

use async_trait::async_trait;
use docent::browser::locator::Locator;
use docent::browser::session::{Browser, ElementHandle, PageInfo};
use docent::core::config::{set_config, RuntimeConfig};
use docent::core::error::{DocentError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shrink every wait so integration tests run in milliseconds
///
/// First caller in the process wins; later calls are no-ops, which is
/// fine because every test wants the same timings.
pub fn fast_config() {
    let _ = set_config(RuntimeConfig {
        page_settle: Duration::from_millis(5),
        element_settle: Duration::from_millis(2),
        login_settle: Duration::from_millis(5),
        default_wait_secs: 0.05,
        scroll_pixels: 500,
        default_step_wait_secs: 0.05,
        final_question_window_secs: 0.05,
        question_capacity: 1,
        parse_max_tokens: 1000,
        answer_max_tokens: 300,
        temperature: 0.7,
    });
}

#[derive(Default)]
struct Inner {
    /// url -> title to report after navigation
    titles: HashMap<String, String>,
    /// keys that make a locator findable when its selector contains them
    findable: HashSet<String>,
    /// urls whose navigation fails
    fail_urls: HashSet<String>,
    visited: Vec<String>,
    clicks: Vec<String>,
    typed: Vec<(String, String)>,
    scripts: Vec<String>,
    current_url: String,
}

/// In-memory browser that records what the pilot does to it
///
/// Clones share state, so a test can keep one handle while the
/// sequencer owns another.
#[derive(Clone, Default)]
pub struct ScriptedBrowser {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(self, url: &str, title: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .titles
            .insert(url.to_string(), title.to_string());
        self
    }

    /// Make locators whose selector contains `key` findable
    pub fn with_element(self, key: &str) -> Self {
        self.inner.lock().unwrap().findable.insert(key.to_string());
        self
    }

    pub fn with_failing_url(self, url: &str) -> Self {
        self.inner.lock().unwrap().fail_urls.insert(url.to_string());
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.inner.lock().unwrap().visited.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.inner.lock().unwrap().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().typed.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.inner.lock().unwrap().scripts.clone()
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_urls.contains(url) {
            return Err(DocentError::WebDriverError(format!(
                "net::ERR_CONNECTION_REFUSED on {}",
                url
            )));
        }
        inner.visited.push(url.to_string());
        inner.current_url = url.to_string();
        Ok(())
    }

    async fn page_info(&self) -> Result<PageInfo> {
        let inner = self.inner.lock().unwrap();
        let title = inner
            .titles
            .get(&inner.current_url)
            .cloned()
            .unwrap_or_default();
        Ok(PageInfo {
            title,
            url: inner.current_url.clone(),
            ready_state: "complete".to_string(),
        })
    }

    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
        let (_, value) = locator.strategy();
        let inner = self.inner.lock().unwrap();
        let hit = inner.findable.iter().find(|key| value.contains(key.as_str()));
        Ok(hit.map(|key| ElementHandle(key.clone())))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.inner.lock().unwrap().clicks.push(element.0.clone());
        Ok(())
    }

    async fn clear(&self, _element: &ElementHandle) -> Result<()> {
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .typed
            .push((element.0.clone(), text.to_string()));
        Ok(())
    }

    async fn execute(
        &self,
        script: &str,
        _args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.inner.lock().unwrap().scripts.push(script.to_string());
        Ok(serde_json::Value::Null)
    }
}
