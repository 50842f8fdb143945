use std::path::PathBuf;

use tracing::info;

use super::{expect_token, explicit_wait, wait_visible, Flow, FlowOutcome};
use crate::browser::Page;
use crate::config::E2eConfig;
use crate::error::E2eResult;
use crate::fixtures::Credentials;
use crate::locator::Locator;

pub const EMAIL: &str = "Email";
pub const PASSWORD: &str = "Password";

/// Sign in with an existing account and expect the app to store a token
#[derive(Debug, Clone, Default)]
pub struct LoginFlow {
    credentials_path: Option<PathBuf>,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read credentials from `path` instead of `config.credentials_path`.
    pub fn with_credentials_file(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: Some(path.into()),
        }
    }
}

impl Flow for LoginFlow {
    fn name(&self) -> &'static str {
        "login"
    }

    fn run(&self, page: &dyn Page, config: &E2eConfig) -> E2eResult<FlowOutcome> {
        let path = self
            .credentials_path
            .as_deref()
            .unwrap_or(&config.credentials_path);
        let credentials = Credentials::load(path)?;

        let lookup = config.timeouts.lookup();
        let wait = explicit_wait(config);
        info!("login: signing in as {}", credentials.email);

        page.navigate(&config.base_url)?;
        page.click(&Locator::button(config.login.open_label.as_str()), lookup)?;
        wait_visible(page, &Locator::placeholder(EMAIL), &wait)?;

        page.fill(&Locator::placeholder(EMAIL), &credentials.email, lookup)?;
        page.fill(&Locator::placeholder(PASSWORD), &credentials.password, lookup)?;
        page.click(&Locator::button(config.login.submit_label.as_str()), lookup)?;

        let outcome = expect_token(page, config, &wait)?;
        info!("login: token received");
        Ok(outcome)
    }
}
