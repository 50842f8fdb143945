use tracing::info;

use super::{expect_token, explicit_wait, wait_visible, Flow, FlowOutcome};
use crate::browser::Page;
use crate::config::E2eConfig;
use crate::error::E2eResult;
use crate::fixtures::Registration;
use crate::locator::Locator;
use crate::storage;

pub const FULL_NAME: &str = "Full Name";
pub const EMAIL_ADDRESS: &str = "Email Address";
pub const PASSWORD: &str = "Password";
pub const CONFIRM_PASSWORD: &str = "Confirm Password";

/// Create a new account and expect the app to store a token
///
/// Leaves local storage cleared and the page reloaded so whatever uses the
/// app next starts signed out.
#[derive(Debug, Clone, Default)]
pub struct RegisterFlow {
    registration: Option<Registration>,
}

impl RegisterFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit this registration instead of generating one at run time.
    pub fn with_registration(registration: Registration) -> Self {
        Self {
            registration: Some(registration),
        }
    }
}

impl Flow for RegisterFlow {
    fn name(&self) -> &'static str {
        "register"
    }

    fn run(&self, page: &dyn Page, config: &E2eConfig) -> E2eResult<FlowOutcome> {
        let registration = self
            .registration
            .clone()
            .unwrap_or_else(|| Registration::generate(&config.register));
        registration.validate()?;

        let lookup = config.timeouts.lookup();
        let wait = explicit_wait(config);
        info!("register: signing up {}", registration.email);

        page.navigate(&config.base_url)?;
        page.click(&Locator::button(config.register.open_label.as_str()), lookup)?;
        wait_visible(page, &Locator::placeholder(FULL_NAME), &wait)?;

        page.fill(&Locator::placeholder(FULL_NAME), &registration.name, lookup)?;
        page.fill(&Locator::placeholder(EMAIL_ADDRESS), &registration.email, lookup)?;
        page.fill(&Locator::placeholder(PASSWORD), &registration.password, lookup)?;
        page.fill(
            &Locator::placeholder(CONFIRM_PASSWORD),
            &registration.password_confirmation,
            lookup,
        )?;
        page.click(&Locator::button(config.register.submit_label.as_str()), lookup)?;

        let outcome = expect_token(page, config, &wait)?;

        storage::clear(page)?;
        page.reload()?;
        info!("register: token received, storage cleared");

        Ok(outcome)
    }
}
