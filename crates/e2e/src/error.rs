//! Error types for E2E flows

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Credentials file {}: {reason}", .path.display())]
    Credentials { path: PathBuf, reason: String },

    #[error("Invalid fixture: {0}")]
    Fixture(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {locator} (waited {waited:?})")]
    ElementNotFound { locator: String, waited: Duration },

    #[error("Timeout waiting for: {condition} (waited {waited:?})")]
    Timeout { condition: String, waited: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Target app at {url} not reachable after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Flow task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Coarse failure class recorded in the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ElementNotFound,
    Timeout,
    Assertion,
    Fixture,
    Config,
    Browser,
    Environment,
}

impl E2eError {
    pub fn kind(&self) -> FailureKind {
        match self {
            E2eError::ElementNotFound { .. } => FailureKind::ElementNotFound,
            E2eError::Timeout { .. } => FailureKind::Timeout,
            E2eError::AssertionFailed(_) => FailureKind::Assertion,
            E2eError::Credentials { .. } | E2eError::Fixture(_) | E2eError::Json(_) => {
                FailureKind::Fixture
            }
            E2eError::Config(_) | E2eError::Toml(_) => FailureKind::Config,
            E2eError::Browser(_) => FailureKind::Browser,
            E2eError::AppUnreachable { .. }
            | E2eError::Task(_)
            | E2eError::Io(_)
            | E2eError::Http(_) => FailureKind::Environment,
        }
    }

    /// Wrap an error coming out of `headless_chrome`, keeping its context chain.
    pub(crate) fn browser(err: anyhow::Error) -> Self {
        E2eError::Browser(format!("{err:#}"))
    }
}
