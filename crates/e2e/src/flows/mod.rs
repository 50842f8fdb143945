//! Browser flows checked by the runner

use tracing::debug;

use crate::browser::Page;
use crate::config::E2eConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::storage;
use crate::wait::Wait;

mod login;
mod register;

pub use login::LoginFlow;
pub use register::RegisterFlow;

/// What a passing flow observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutcome {
    /// Length of the token the app stored; the value itself is never kept
    pub token_len: usize,
}

/// A single end-to-end scenario run in its own browser session
pub trait Flow: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, page: &dyn Page, config: &E2eConfig) -> E2eResult<FlowOutcome>;
}

fn explicit_wait(config: &E2eConfig) -> Wait {
    Wait::new(config.timeouts.wait(), config.timeouts.poll_interval())
}

fn wait_visible(page: &dyn Page, locator: &Locator, wait: &Wait) -> E2eResult<()> {
    wait.until(&format!("{locator} to be visible"), || {
        Ok(page.is_visible(locator)?.then_some(()))
    })
}

/// Wait for the auth token and check it is non-empty.
fn expect_token(page: &dyn Page, config: &E2eConfig, wait: &Wait) -> E2eResult<FlowOutcome> {
    let token = storage::wait_for_item(page, &config.token_key, wait)?;
    if token.is_empty() {
        return Err(E2eError::AssertionFailed(format!(
            "expected a non-empty '{}' in local storage",
            config.token_key
        )));
    }
    debug!("'{}' present ({} chars)", config.token_key, token.len());
    Ok(FlowOutcome {
        token_len: token.len(),
    })
}
