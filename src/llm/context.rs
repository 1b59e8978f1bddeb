//! Gather product context for LLM prompts
//!
//! This module builds product summaries that help the LLM parser
//! understand the demoed website for better command disambiguation, and
//! that ground Q&A answers. The context includes the configured pages,
//! the demo's feature list, and the pilot's recent actions.

use crate::demo::script::ProductConfig;

/// Product context for LLM prompts
///
/// Contains a summary of the configured product that helps the LLM
/// parser map page names to URLs and keeps answers on topic.
pub struct ProductContext {
    /// Display name of the demoed product
    pub product_name: String,
    /// One-paragraph product description from the config
    pub description: String,
    /// The product's home URL
    pub base_url: String,
    /// Pages the speaker might reference by name
    pub pages: Vec<PageSummary>,
    /// Feature names shown by the demo script
    pub features: Vec<String>,
    /// The pilot's most recent actions, oldest first
    pub recent_actions: Vec<String>,
}

/// A page that can be referenced in commands
pub struct PageSummary {
    /// The page's spoken name
    pub name: String,
    /// Where the page lives
    pub url: String,
}

impl ProductContext {
    /// Build a product context from a demo configuration
    ///
    /// # Arguments
    /// * `config` - The product configuration to extract context from
    ///
    /// # Returns
    /// A ProductContext suitable for LLM prompt construction
    pub fn from_config(config: &ProductConfig) -> Self {
        let mut pages: Vec<PageSummary> = config
            .pages
            .iter()
            .map(|p| PageSummary {
                name: p.name.clone(),
                url: p.url.clone(),
            })
            .collect();

        // Fall back to the demo steps when no page table is configured,
        // skipping duplicate URLs so the prompt stays short
        if pages.is_empty() {
            for step in &config.demo_steps {
                if pages.iter().any(|p| p.url == step.url) {
                    continue;
                }
                pages.push(PageSummary {
                    name: step.name.clone(),
                    url: step.url.clone(),
                });
            }
        }

        let features = config
            .demo_steps
            .iter()
            .map(|s| s.name.clone())
            .collect();

        Self {
            product_name: config.product_name.clone(),
            description: config.description.clone(),
            base_url: config.base_url.clone(),
            pages,
            features,
            recent_actions: Vec::new(),
        }
    }

    /// Generate a text summary of the context for LLM prompts
    ///
    /// # Returns
    /// A human-readable summary of the product context
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("Product: {}\n", self.product_name));
        s.push_str(&format!("About: {}\n", self.description));
        s.push_str(&format!("Home URL: {}\n", self.base_url));

        if !self.pages.is_empty() {
            s.push_str("\nPages:\n");
            for page in &self.pages {
                s.push_str(&format!("- {} ({})\n", page.name, page.url));
            }
        }

        if !self.features.is_empty() {
            s.push_str(&format!("\nDemo features: {}\n", self.features.join(", ")));
        }

        if !self.recent_actions.is_empty() {
            s.push_str("\nRecent actions:\n");
            for action in &self.recent_actions {
                s.push_str(&format!("- {}\n", action));
            }
        }

        s
    }

    /// Create an empty context for testing
    pub fn empty() -> Self {
        Self {
            product_name: "Unknown".into(),
            description: String::new(),
            base_url: String::new(),
            pages: vec![],
            features: vec![],
            recent_actions: vec![],
        }
    }

    /// Record an action the pilot performed
    pub fn add_action(&mut self, action: impl Into<String>) {
        self.recent_actions.push(action.into());
        // Keep only the last 5 actions
        if self.recent_actions.len() > 5 {
            self.recent_actions.remove(0);
        }
    }

    /// Get a page by name (case-insensitive partial match)
    pub fn find_page(&self, name: &str) -> Option<&PageSummary> {
        let name_lower = name.to_lowercase();
        self.pages
            .iter()
            .find(|p| p.name.to_lowercase().contains(&name_lower))
    }
}
