//! Element location strategies and fallback chains
//!
//! Pages rarely expose elements the way a spoken command describes
//! them, so every lookup is a chain of locators tried in order. The
//! chains are plain vectors so tests can assert exactly what gets
//! tried and in what sequence.

/// One way of finding an element on a page
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    XPath(String),
    Css(String),
    PartialLinkText(String),
    /// Matched via a `[name=...]` CSS selector
    Name(String),
    /// Matched via a `#id` CSS selector
    Id(String),
}

impl Locator {
    /// The WebDriver location strategy and selector for this locator
    ///
    /// `Name` and `Id` are sugar over CSS selectors; the remaining
    /// variants map straight onto W3C strategy names.
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::XPath(v) => ("xpath", v.clone()),
            Locator::Css(v) => ("css selector", v.clone()),
            Locator::PartialLinkText(v) => ("partial link text", v.clone()),
            Locator::Name(v) => ("css selector", format!("[name='{}']", v)),
            Locator::Id(v) => ("css selector", format!("#{}", v)),
        }
    }
}

/// Locators to try when clicking an element described by a command
///
/// Visible text is the strongest signal a spoken command gives, so
/// text-based locators come first; an explicit selector from the
/// parser goes last as the precise fallback.
pub fn click_chain(element_text: Option<&str>, selector: Option<&str>) -> Vec<Locator> {
    let mut chain = Vec::new();

    if let Some(text) = element_text {
        chain.push(Locator::XPath(format!("//*[contains(text(), '{}')]", text)));
        chain.push(Locator::PartialLinkText(text.to_string()));
        chain.push(Locator::XPath(format!(
            "//button[contains(text(), '{}')]",
            text
        )));
    }

    if let Some(sel) = selector {
        chain.push(Locator::Css(sel.to_string()));
    }

    chain
}

/// Locators to try when filling a form field named by a command
pub fn fill_chain(field: &str) -> Vec<Locator> {
    vec![
        Locator::Name(field.to_string()),
        Locator::Id(field.to_string()),
        Locator::XPath(format!("//input[@placeholder='{}']", field)),
        Locator::XPath(format!(
            "//input[@type='text' or @type='email' or @type='password']\
             [preceding-sibling::label[contains(text(), '{}')]]",
            field
        )),
    ]
}

/// Common selectors for the email / username box on sign-in pages
pub fn email_chain() -> Vec<Locator> {
    [
        "input[type=\"email\"]",
        "input[name=\"email\"]",
        "input[name=\"username\"]",
        "#email",
        "#username",
        ".email-input",
    ]
    .into_iter()
    .map(|s| Locator::Css(s.to_string()))
    .collect()
}

/// Common selectors for the password box on sign-in pages
pub fn password_chain() -> Vec<Locator> {
    [
        "input[type=\"password\"]",
        "input[name=\"password\"]",
        "#password",
        ".password-input",
    ]
    .into_iter()
    .map(|s| Locator::Css(s.to_string()))
    .collect()
}

/// Common selectors for the submit button on sign-in pages
pub fn submit_chain() -> Vec<Locator> {
    [
        "button[type=\"submit\"]",
        "input[type=\"submit\"]",
        "button.login-btn",
        "button.submit-btn",
        ".login-button",
    ]
    .into_iter()
    .map(|s| Locator::Css(s.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_mapping() {
        assert_eq!(
            Locator::XPath("//a".into()).strategy(),
            ("xpath", "//a".to_string())
        );
        assert_eq!(
            Locator::Name("email".into()).strategy(),
            ("css selector", "[name='email']".to_string())
        );
        assert_eq!(
            Locator::Id("password".into()).strategy(),
            ("css selector", "#password".to_string())
        );
        assert_eq!(
            Locator::PartialLinkText("Sign in".into()).strategy(),
            ("partial link text", "Sign in".to_string())
        );
    }

    #[test]
    fn test_click_chain_text_before_selector() {
        let chain = click_chain(Some("Sign in"), Some(".login-btn"));
        assert_eq!(chain.len(), 4);
        assert!(matches!(chain[0], Locator::XPath(_)));
        assert_eq!(chain[1], Locator::PartialLinkText("Sign in".into()));
        assert_eq!(chain[3], Locator::Css(".login-btn".into()));
    }

    #[test]
    fn test_click_chain_selector_only() {
        let chain = click_chain(None, Some("#go"));
        assert_eq!(chain, vec![Locator::Css("#go".into())]);
    }

    #[test]
    fn test_click_chain_empty_when_nothing_given() {
        assert!(click_chain(None, None).is_empty());
    }

    #[test]
    fn test_fill_chain_order() {
        let chain = fill_chain("email");
        assert_eq!(chain[0], Locator::Name("email".into()));
        assert_eq!(chain[1], Locator::Id("email".into()));
        assert!(matches!(&chain[2], Locator::XPath(x) if x.contains("placeholder")));
        assert!(matches!(&chain[3], Locator::XPath(x) if x.contains("label")));
    }

    #[test]
    fn test_login_chains_start_with_typed_inputs() {
        assert_eq!(
            email_chain()[0],
            Locator::Css("input[type=\"email\"]".into())
        );
        assert_eq!(
            password_chain()[0],
            Locator::Css("input[type=\"password\"]".into())
        );
        assert_eq!(
            submit_chain()[0],
            Locator::Css("button[type=\"submit\"]".into())
        );
    }
}
