//! Demo script definitions
//!
//! A product demo is data: an ordered list of steps over a product
//! configuration, loaded from JSON or built in code. Scripts say what
//! to show and what to say about it; the sequencer decides how.

use crate::core::config::config;
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a demo step does when it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// Open the step's URL
    Navigate,
    /// Click the step's element selector
    Click,
    /// Sign in with the configured credentials
    Login,
    /// Present a form page without submitting it
    FormFill,
    /// Linger on a page while the narration runs
    Showcase,
}

fn default_wait_time() -> f32 {
    config().default_step_wait_secs
}

/// One step of a scripted demo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoStep {
    /// Short display name for logs and reports
    pub name: String,
    /// What this step demonstrates
    pub description: String,
    /// Page the step runs against
    pub url: String,
    #[serde(rename = "action_type")]
    pub action: StepAction,
    /// CSS selector for click steps
    #[serde(default)]
    pub element_selector: Option<String>,
    /// Seconds to hold after the step, listening for questions
    #[serde(default = "default_wait_time")]
    pub wait_time: f32,
    /// What to say while the step runs; omitted steps get a generic line
    #[serde(default)]
    pub voice_script: Option<String>,
}

/// Demo account credentials for login steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A page the audience can ask to see by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRoute {
    pub name: String,
    pub url: String,
    /// Extra phrases that refer to this page
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// Everything the pilot knows about one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub product_name: String,
    /// The product's home URL
    pub base_url: String,
    /// One-paragraph pitch used in prompts and canned answers
    pub description: String,
    #[serde(default)]
    pub login_credentials: Option<Credentials>,
    /// Spoken at the start of every demo run
    pub welcome_message: String,
    /// Spoken after the final question window; a default applies if omitted
    #[serde(default)]
    pub closing_message: Option<String>,
    pub demo_steps: Vec<DemoStep>,
    #[serde(default)]
    pub pages: Vec<PageRoute>,
}

impl ProductConfig {
    /// Stable identifier derived from the product name
    pub fn slug(&self) -> String {
        self.product_name.to_lowercase().replace(' ', "_")
    }
}

/// Load a product configuration from a JSON file
pub fn load_config(path: &Path) -> Result<ProductConfig> {
    let text = std::fs::read_to_string(path)?;
    let config: ProductConfig = serde_json::from_str(&text)?;
    Ok(config)
}

/// Write a product configuration to a JSON file
pub fn save_config(config: &ProductConfig, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(config)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Built-in demo script for a campus transit booking site
///
/// Serves as the default product and as a worked example of the config
/// shape. The URLs and credentials point at a placeholder domain.
pub fn sample_product() -> ProductConfig {
    let base = "https://transit.lakeside-campus.example/";

    ProductConfig {
        product_name: "Lakeside Campus Transit".to_string(),
        base_url: base.to_string(),
        description: "Lakeside Campus Transit is a campus travel platform where riders \
                      book seats on scheduled routes, manage digital tickets, and pay \
                      from a built-in wallet."
            .to_string(),
        login_credentials: Some(Credentials {
            email: "demo.rider@lakeside-campus.example".to_string(),
            password: "demo-pass-1234".to_string(),
        }),
        welcome_message: "Hello everyone! Welcome to the Lakeside Campus Transit \
                          demonstration. I'll walk you through the platform step by \
                          step, and you can ask questions at any time."
            .to_string(),
        closing_message: Some(
            "Thanks for joining the tour of Lakeside Campus Transit! I'm happy to \
             revisit any page you'd like another look at."
                .to_string(),
        ),
        demo_steps: vec![
            DemoStep {
                name: "Homepage".to_string(),
                description: "The landing page and main navigation".to_string(),
                url: base.to_string(),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 4.0,
                voice_script: Some(
                    "Welcome! This is the Lakeside Campus Transit homepage, the front \
                     door for campus travel. From here riders reach every feature of \
                     the platform."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Sign-in Page".to_string(),
                description: "Where riders sign in with their campus email".to_string(),
                url: format!("{}accounts/login/", base),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 3.0,
                voice_script: Some(
                    "Let's head over to the sign-in page. Riders use their campus \
                     email here to reach their personal dashboard."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Automatic Login".to_string(),
                description: "Signing in with the demo account".to_string(),
                url: format!("{}accounts/login/", base),
                action: StepAction::Login,
                element_selector: None,
                wait_time: 4.0,
                voice_script: Some(
                    "I'll sign in with a demo account now. Watch the fields fill in \
                     and the dashboard open automatically."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Dashboard".to_string(),
                description: "The rider dashboard after signing in".to_string(),
                url: base.to_string(),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 4.0,
                voice_script: Some(
                    "Here's the rider dashboard. It puts today's routes, the wallet \
                     balance, and upcoming trips in one view."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Profile Management".to_string(),
                description: "Contact details and travel preferences".to_string(),
                url: format!("{}profile/", base),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 3.0,
                voice_script: Some(
                    "This is the profile page, where riders manage their contact \
                     details and travel preferences."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Ticket Management".to_string(),
                description: "Current and past tickets with live status".to_string(),
                url: format!("{}my-tickets/", base),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 4.0,
                voice_script: Some(
                    "On the tickets page you can see every pass you hold, current and \
                     past, with live status for each."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Booking System".to_string(),
                description: "Booking a seat and paying from the wallet".to_string(),
                url: format!("{}booking/", base),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 5.0,
                voice_script: Some(
                    "The booking page is the heart of the product. Pick a route, \
                     choose a seat, and pay from the wallet in a few clicks."
                        .to_string(),
                ),
            },
            DemoStep {
                name: "Demo Complete".to_string(),
                description: "Back to the homepage to wrap up".to_string(),
                url: base.to_string(),
                action: StepAction::Navigate,
                element_selector: None,
                wait_time: 3.0,
                voice_script: Some(
                    "And that brings us back home. That's the full tour of Lakeside \
                     Campus Transit."
                        .to_string(),
                ),
            },
        ],
        pages: vec![
            PageRoute {
                name: "home".to_string(),
                url: base.to_string(),
                phrases: vec!["homepage".to_string(), "main page".to_string()],
            },
            PageRoute {
                name: "dashboard".to_string(),
                url: base.to_string(),
                phrases: vec!["overview".to_string()],
            },
            PageRoute {
                name: "sign in".to_string(),
                url: format!("{}accounts/login/", base),
                phrases: vec!["login page".to_string(), "log in".to_string()],
            },
            PageRoute {
                name: "profile".to_string(),
                url: format!("{}profile/", base),
                phrases: vec!["my account".to_string(), "account settings".to_string()],
            },
            PageRoute {
                name: "tickets".to_string(),
                url: format!("{}my-tickets/", base),
                phrases: vec!["my tickets".to_string(), "ticket history".to_string()],
            },
            PageRoute {
                name: "booking".to_string(),
                url: format!("{}booking/", base),
                phrases: vec!["book a ride".to_string(), "reserve".to_string()],
            },
            PageRoute {
                name: "wallet".to_string(),
                url: format!("{}booking/wallet/", base),
                phrases: vec!["payment".to_string(), "balance".to_string()],
            },
        ],
    }
}
