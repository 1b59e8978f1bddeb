//! Ordered matching rules for the keyword fallback
//!
//! When no LLM is configured the pilot still has to understand
//! commands, resolve page names to URLs, and answer common questions.
//! All three fallbacks are driven by ordered rule lists held in plain
//! structs, so the matching order is visible in one place and earlier
//! rules always win.

use crate::core::error::{DocentError, Result};
use crate::demo::script::ProductConfig;
use crate::llm::parser::IntentKind;
use regex::Regex;

/// Navigation verbs shared by the keyword table and URL resolution
const NAV_KEYWORDS: &[&str] = &["go", "navigate", "open", "visit"];

const CLICK_KEYWORDS: &[&str] = &["click", "press", "tap", "hit"];

/// Everything the fallback parser needs for one product
pub struct RuleBook {
    /// Intent keyword rules, checked in order
    pub keywords: KeywordTable,
    /// URL resolution rules for navigate commands
    pub urls: UrlRules,
}

impl RuleBook {
    /// Build the rule book for a product configuration
    ///
    /// Fails only when a configured page phrase produces an invalid
    /// pattern, which is a configuration error worth stopping on.
    pub fn for_product(config: &ProductConfig) -> Result<Self> {
        Ok(Self {
            keywords: KeywordTable::standard(),
            urls: UrlRules::for_product(config)?,
        })
    }
}

/// One keyword rule: any listed keyword maps the command to this kind
pub struct KeywordRule {
    pub kind: IntentKind,
    pub keywords: &'static [&'static str],
}

/// Intent keywords checked in declaration order
///
/// A command containing keywords from several rules gets the first
/// rule's kind. Navigation outranks clicking, clicking outranks
/// filling, and question words come last so action verbs win.
pub struct KeywordTable {
    pub rules: Vec<KeywordRule>,
}

impl KeywordTable {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                KeywordRule {
                    kind: IntentKind::Navigate,
                    keywords: NAV_KEYWORDS,
                },
                KeywordRule {
                    kind: IntentKind::Click,
                    keywords: CLICK_KEYWORDS,
                },
                KeywordRule {
                    kind: IntentKind::Fill,
                    keywords: &["fill", "enter", "type", "input"],
                },
                KeywordRule {
                    kind: IntentKind::Scroll,
                    keywords: &["scroll", "move"],
                },
                KeywordRule {
                    kind: IntentKind::Question,
                    keywords: &[
                        "what", "how", "why", "when", "where", "who", "help", "explain",
                        "tell me", "?",
                    ],
                },
            ],
        }
    }

    /// Match a lowercased command against the rules in order
    pub fn match_kind(&self, lower: &str) -> Option<IntentKind> {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
            .map(|rule| rule.kind.clone())
    }
}

/// One URL rule: commands matching the pattern resolve to this URL
pub struct UrlRule {
    pub pattern: Regex,
    pub url: String,
}

/// Resolves navigate commands to URLs, checked in order
///
/// Resolution order: an explicit URL in the command, then the
/// product's configured pages, then well-known external sites, then a
/// bare `name.com` domain, and finally the product home URL when the
/// command has a navigation verb but names nothing resolvable.
pub struct UrlRules {
    explicit: Regex,
    /// Pages from the product configuration
    pub product: Vec<UrlRule>,
    /// Well-known external sites
    pub external: Vec<UrlRule>,
    domain: Regex,
    /// Where navigation lands when no page is named
    pub home: String,
}

const EXTERNAL_SITES: &[&str] = &[
    "google",
    "youtube",
    "facebook",
    "twitter",
    "instagram",
    "linkedin",
    "github",
    "stackoverflow",
    "amazon",
    "netflix",
];

impl UrlRules {
    pub fn for_product(config: &ProductConfig) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| DocentError::ConfigError(format!("bad page pattern: {}", e)))
        };

        let mut product = Vec::new();
        for route in &config.pages {
            let mut phrases = vec![regex::escape(&route.name.to_lowercase())];
            phrases.extend(route.phrases.iter().map(|p| regex::escape(&p.to_lowercase())));
            let pattern = format!(r"\b(?:{})\b", phrases.join("|"));
            product.push(UrlRule {
                pattern: compile(&pattern)?,
                url: route.url.clone(),
            });
        }

        let mut external = Vec::new();
        for site in EXTERNAL_SITES {
            let pattern = format!(r"\b{}(?:\.com)?\b", site);
            external.push(UrlRule {
                pattern: compile(&pattern)?,
                url: format!("https://www.{}.com", site),
            });
        }

        Ok(Self {
            explicit: compile(r"https?://[^\s]+")?,
            product,
            external,
            domain: compile(r"\b([a-z0-9-]+)\.com\b")?,
            home: config.base_url.clone(),
        })
    }

    /// Resolve a raw command to a URL, if anything matches
    ///
    /// Explicit URLs are matched against the raw command so casing in
    /// paths survives; everything else matches lowercased text.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        if let Some(m) = self.explicit.find(raw) {
            return Some(m.as_str().to_string());
        }

        let lower = raw.to_lowercase();

        for rule in &self.product {
            if rule.pattern.is_match(&lower) {
                return Some(rule.url.clone());
            }
        }

        for rule in &self.external {
            if rule.pattern.is_match(&lower) {
                return Some(rule.url.clone());
            }
        }

        if let Some(caps) = self.domain.captures(&lower) {
            if let Some(name) = caps.get(1) {
                return Some(format!("https://www.{}.com", name.as_str()));
            }
        }

        if NAV_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Some(self.home.clone());
        }

        None
    }
}

/// Pull the element description out of a click command
///
/// Takes everything after the first click verb and strips leading
/// filler words. "click on the sign in button" becomes "sign in
/// button". Empty remainders default to "button".
pub fn extract_element_text(lower: &str) -> String {
    for kw in CLICK_KEYWORDS {
        let Some(pos) = lower.find(kw) else { continue };
        let mut rest = lower[pos + kw.len()..].trim_start();

        let mut stripped = true;
        while stripped {
            stripped = false;
            for article in ["on ", "the ", "a ", "an "] {
                if let Some(r) = rest.strip_prefix(article) {
                    rest = r.trim_start();
                    stripped = true;
                }
            }
        }

        let rest = rest.trim();
        if !rest.is_empty() {
            return rest.to_string();
        }
    }
    "button".to_string()
}

/// Pull the field name and value out of a fill command
///
/// Understands "fill <field> as <value>" and "enter/type <value> in
/// <field>". Commands matching neither shape get placeholder names so
/// the executor can still report what it was asked to do.
pub fn extract_field_and_value(lower: &str) -> (String, String) {
    if let Some(pos) = lower.find("fill ") {
        let rest = &lower[pos + 5..];
        if let Some((field, value)) = rest.split_once(" as ") {
            return (clean_or(field, "input"), clean_or(value, "value"));
        }
    }

    for kw in ["enter ", "type ", "input "] {
        let Some(pos) = lower.find(kw) else { continue };
        let rest = &lower[pos + kw.len()..];
        for sep in [" into ", " in "] {
            if let Some((value, field)) = rest.split_once(sep) {
                let field = field.trim().strip_prefix("the ").unwrap_or(field).trim();
                return (clean_or(field, "input"), clean_or(value, "value"));
            }
        }
    }

    ("input".to_string(), "value".to_string())
}

fn clean_or(s: &str, fallback: &str) -> String {
    let t = s.trim();
    if t.is_empty() {
        fallback.to_string()
    } else {
        t.to_string()
    }
}

/// One canned answer topic with its trigger keywords
pub struct AnswerRule {
    pub topic: &'static str,
    pub keywords: &'static [&'static str],
}

/// Canned answer topics checked in declaration order
///
/// A question touching several topics gets the first matching one, so
/// account questions outrank pricing and pricing outranks features.
pub struct AnswerRules {
    pub rules: Vec<AnswerRule>,
}

impl AnswerRules {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                AnswerRule {
                    topic: "account",
                    keywords: &["sign in", "login", "log in", "sign up", "register", "account"],
                },
                AnswerRule {
                    topic: "getting_started",
                    keywords: &[
                        "how to use",
                        "how do i",
                        "getting started",
                        "first time",
                        "begin",
                    ],
                },
                AnswerRule {
                    topic: "pricing",
                    keywords: &["price", "cost", "pricing", "expensive", "cheap", "fee", "payment"],
                },
                AnswerRule {
                    topic: "features",
                    keywords: &[
                        "feature",
                        "functionality",
                        "capability",
                        "what can",
                        "does it",
                        "can you",
                    ],
                },
                AnswerRule {
                    topic: "security",
                    keywords: &[
                        "security",
                        "safe",
                        "secure",
                        "privacy",
                        "data protection",
                        "encryption",
                    ],
                },
                AnswerRule {
                    topic: "integration",
                    keywords: &[
                        "integration",
                        "api",
                        "connect",
                        "third party",
                        "integrate",
                        "sync",
                    ],
                },
                AnswerRule {
                    topic: "support",
                    keywords: &["support", "help", "assistance", "training", "onboarding"],
                },
                AnswerRule {
                    topic: "performance",
                    keywords: &["fast", "speed", "performance", "slow", "latency", "response time"],
                },
                AnswerRule {
                    topic: "customization",
                    keywords: &["customize", "custom", "personalize", "configure", "settings"],
                },
                AnswerRule {
                    topic: "comparison",
                    keywords: &[
                        "competitor",
                        "compare",
                        "alternative",
                        "versus",
                        "better than",
                        "different from",
                    ],
                },
                AnswerRule {
                    topic: "technical",
                    keywords: &[
                        "technical",
                        "requirements",
                        "system",
                        "server",
                        "database",
                        "infrastructure",
                    ],
                },
                AnswerRule {
                    topic: "scale",
                    keywords: &["scale", "growth", "expand", "users", "volume", "enterprise"],
                },
                AnswerRule {
                    topic: "demo",
                    keywords: &["demo", "showing", "screen", "example", "sample"],
                },
            ],
        }
    }

    /// Find the first topic whose keywords appear in the question
    pub fn lookup(&self, question: &str) -> Option<&'static str> {
        let lower = question.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
            .map(|rule| rule.topic)
    }
}

/// Canned answer text for a matched topic
pub fn canned_answer(topic: &str, config: &ProductConfig) -> String {
    let name = &config.product_name;
    match topic {
        "account" => format!(
            "Signing in to {} is quick. You create an account with your email, and once \
             you're in, everything you see is personalized to you. I can walk through the \
             sign-in flow again if that would help.",
            name
        ),
        "getting_started" => format!(
            "Getting started with {} only takes a few minutes. After you sign up you land \
             right where we are now, and the interface walks you through your first steps.",
            name
        ),
        "pricing" => format!(
            "{} offers flexible plans depending on how your team works. I don't want to \
             misquote numbers here, so our team will follow up with exact pricing after \
             the demo.",
            name
        ),
        "features" => format!(
            "{} What you're seeing today covers the core workflow, and there's more under \
             the hood. Is there a particular capability you'd like me to open up?",
            config.description
        ),
        "security" => format!(
            "Security is built into {} from the start. Your data is encrypted in transit, \
             access is controlled per account, and your information is never shared with \
             third parties.",
            name
        ),
        "integration" => format!(
            "{} is designed to fit into the tools you already use. It connects with the \
             common services out of the box, and the API covers anything custom.",
            name
        ),
        "support" => format!(
            "You're never on your own with {}. Support is available whenever you need it, \
             and onboarding help is included so your team is productive from day one.",
            name
        ),
        "performance" => format!(
            "{} is built to stay fast as you grow. Pages load quickly even under heavy \
             use, and the service is monitored around the clock.",
            name
        ),
        "customization" => format!(
            "Most of {} can be shaped to how your team works. Workflows, fields, and \
             notifications are all adjustable from the settings screens, no technical \
             work needed for the common cases.",
            name
        ),
        "comparison" => format!(
            "Where {} stands apart is how little setup it needs and how much support \
             comes with it. Tell me which alternative you're weighing and I'll show \
             you the difference live rather than talk it through.",
            name
        ),
        "technical" => format!(
            "{} runs entirely in the browser, so there's nothing to install or host on \
             your side. We run the servers and the data layer behind it; a modern \
             browser is the only requirement.",
            name
        ),
        "scale" => format!(
            "{} grows with you. The same account structure works from a single user to \
             a whole organization, and capacity is added automatically as usage climbs, \
             with no migration along the way.",
            name
        ),
        "demo" => format!(
            "What you're watching is the live product, not a mockup. Everything I click \
             is really happening in {}, which is the best way to see how it would feel \
             for your team.",
            name
        ),
        _ => format!(
            "That's a great question! {} is designed to provide the best user experience. \
             Would you like me to show you a specific feature?",
            name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::script::sample_product;
    use proptest::prelude::*;

    fn urls() -> UrlRules {
        UrlRules::for_product(&sample_product()).unwrap()
    }

    #[test]
    fn test_keyword_order() {
        let table = KeywordTable::standard();
        assert_eq!(table.match_kind("go to the page"), Some(IntentKind::Navigate));
        assert_eq!(table.match_kind("press the button"), Some(IntentKind::Click));
        assert_eq!(table.match_kind("type my name"), Some(IntentKind::Fill));
        assert_eq!(table.match_kind("scroll down"), Some(IntentKind::Scroll));
        assert_eq!(table.match_kind("what is this"), Some(IntentKind::Question));
        assert_eq!(table.match_kind("blargh"), None);
    }

    #[test]
    fn test_navigate_beats_question() {
        // "open" appears before the question rule, so asking to open
        // something is a navigation even with a question mark
        let table = KeywordTable::standard();
        assert_eq!(
            table.match_kind("open the dashboard?"),
            Some(IntentKind::Navigate)
        );
    }

    #[test]
    fn test_explicit_url_wins() {
        let resolved = urls().resolve("go to https://app.example/Deep/Path");
        assert_eq!(resolved.as_deref(), Some("https://app.example/Deep/Path"));
    }

    #[test]
    fn test_product_page_resolution() {
        let resolved = urls().resolve("go to my profile");
        assert!(resolved.is_some());
        assert!(resolved.unwrap().contains("profile"));
    }

    #[test]
    fn test_external_site_resolution() {
        let resolved = urls().resolve("open google for me");
        assert_eq!(resolved.as_deref(), Some("https://www.google.com"));
    }

    #[test]
    fn test_bare_domain_resolution() {
        let resolved = urls().resolve("visit acme-corp.com please");
        assert_eq!(resolved.as_deref(), Some("https://www.acme-corp.com"));
    }

    #[test]
    fn test_nav_verb_falls_back_to_home() {
        let config = sample_product();
        let resolved = urls().resolve("go back");
        assert_eq!(resolved.as_deref(), Some(config.base_url.as_str()));
    }

    #[test]
    fn test_no_match_without_nav_verb() {
        assert_eq!(urls().resolve("the quick brown fox"), None);
    }

    #[test]
    fn test_product_page_beats_external() {
        // A configured page named like an external site resolves to the
        // product, because product rules come first
        let mut config = sample_product();
        config.pages.insert(
            0,
            crate::demo::script::PageRoute {
                name: "google".into(),
                url: "https://app.example/google-sync".into(),
                phrases: vec![],
            },
        );
        let rules = UrlRules::for_product(&config).unwrap();
        assert_eq!(
            rules.resolve("open google").as_deref(),
            Some("https://app.example/google-sync")
        );
    }

    #[test]
    fn test_extract_element_text() {
        assert_eq!(extract_element_text("click the submit button"), "submit button");
        assert_eq!(extract_element_text("click on the sign in link"), "sign in link");
        assert_eq!(extract_element_text("press save"), "save");
        assert_eq!(extract_element_text("click"), "button");
    }

    #[test]
    fn test_extract_field_and_value_fill_as() {
        let (field, value) = extract_field_and_value("fill email as demo@example.com");
        assert_eq!(field, "email");
        assert_eq!(value, "demo@example.com");
    }

    #[test]
    fn test_extract_field_and_value_enter_in() {
        let (field, value) = extract_field_and_value("enter hello world in the search box");
        assert_eq!(field, "search box");
        assert_eq!(value, "hello world");
    }

    #[test]
    fn test_extract_field_and_value_default() {
        let (field, value) = extract_field_and_value("fill out the form");
        assert_eq!(field, "input");
        assert_eq!(value, "value");
    }

    #[test]
    fn test_answer_lookup_order() {
        let rules = AnswerRules::standard();
        // Mentions both login and pricing: account comes first
        assert_eq!(rules.lookup("does my login cost extra?"), Some("account"));
        assert_eq!(rules.lookup("how much does it cost?"), Some("pricing"));
        assert_eq!(rules.lookup("is it secure?"), Some("security"));
        assert_eq!(
            rules.lookup("can I customize the dashboard?"),
            Some("customization")
        );
        assert_eq!(
            rules.lookup("what makes you better than your competitors?"),
            Some("comparison")
        );
        assert_eq!(
            rules.lookup("what are the technical requirements?"),
            Some("technical")
        );
        assert_eq!(rules.lookup("how many users can it handle?"), Some("scale"));
        // Mentions both api and custom: integration comes first
        assert_eq!(rules.lookup("is the api customizable?"), Some("integration"));
        assert_eq!(rules.lookup("completely unrelated"), None);
    }

    #[test]
    fn test_canned_answers_name_the_product() {
        let config = sample_product();
        for rule in AnswerRules::standard().rules {
            let answer = canned_answer(rule.topic, &config);
            assert!(!answer.is_empty(), "empty answer for topic {}", rule.topic);
        }
        assert!(canned_answer("pricing", &config).contains(&config.product_name));
    }

    proptest! {
        #[test]
        fn element_text_never_empty(s in ".{0,80}") {
            let lower = s.to_lowercase();
            prop_assert!(!extract_element_text(&lower).is_empty());
        }

        #[test]
        fn field_and_value_never_empty(s in ".{0,80}") {
            let lower = s.to_lowercase();
            let (field, value) = extract_field_and_value(&lower);
            prop_assert!(!field.is_empty());
            prop_assert!(!value.is_empty());
        }

        #[test]
        fn url_resolution_never_panics(s in ".{0,80}") {
            let rules = UrlRules::for_product(&sample_product()).unwrap();
            let _ = rules.resolve(&s);
        }
    }
}
