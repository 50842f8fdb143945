//! Browser sessions
//!
//! Flows talk to the page only through [`Page`], so they can run against
//! headless Chrome ([`ChromeLauncher`]) or an in-memory fake in tests.

use std::time::Duration;

use crate::config::E2eConfig;
use crate::error::E2eResult;
use crate::locator::Locator;

mod chrome;

#[cfg(test)]
pub(crate) mod fake;

pub use chrome::{ChromeLauncher, ChromePage};

/// One open tab in a browser session owned by a single flow
pub trait Page {
    fn navigate(&self, url: &str) -> E2eResult<()>;

    /// Find the element within `timeout` and click it.
    fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()>;

    /// Find the input within `timeout` and type `text` into it.
    fn fill(&self, locator: &Locator, text: &str, timeout: Duration) -> E2eResult<()>;

    /// Whether the element exists and is rendered. A missing element is `Ok(false)`.
    fn is_visible(&self, locator: &Locator) -> E2eResult<bool>;

    /// Evaluate a JavaScript expression; `undefined` comes back as `Value::Null`.
    fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value>;

    fn reload(&self) -> E2eResult<()>;

    fn screenshot_png(&self) -> E2eResult<Vec<u8>>;

    fn current_url(&self) -> String;
}

/// Opens a fresh, isolated session for each flow
pub trait Launcher: Send + Sync {
    fn launch(&self, config: &E2eConfig) -> E2eResult<Box<dyn Page>>;
}
