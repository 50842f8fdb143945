//! Element locators expressed as XPath

use std::fmt;

/// How a flow finds a control on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// A `<button>` whose whitespace-normalized text equals the label exactly
    Button(String),
    /// An `<input>` with this placeholder
    Placeholder(String),
}

impl Locator {
    pub fn button(label: impl Into<String>) -> Self {
        Locator::Button(label.into())
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Locator::Placeholder(text.into())
    }

    pub fn xpath(&self) -> String {
        match self {
            Locator::Button(label) => {
                format!("//button[normalize-space(.)={}]", xpath_literal(label))
            }
            Locator::Placeholder(text) => {
                format!("//input[@placeholder={}]", xpath_literal(text))
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Button(label) => write!(f, "button '{}'", label),
            Locator::Placeholder(text) => write!(f, "input with placeholder '{}'", text),
        }
    }
}

/// Quote `s` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text holding both quote kinds is
/// assembled with `concat()`.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{}'", s);
    }
    if !s.contains('"') {
        return format!("\"{}\"", s);
    }

    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
