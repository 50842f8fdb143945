//! Test data: generated registrations and the login credentials file

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RegisterConfig;
use crate::error::{E2eError, E2eResult};

/// The app refuses passwords shorter than this on both forms.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

fn check_email(email: &str) -> Result<(), String> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(format!("'{email}' is not a valid email address"))
    }
}

fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
    } else {
        Ok(())
    }
}

/// `<prefix>_<millis>@<domain>`; unique as long as no two runs share a millisecond.
pub fn unique_email_at(prefix: &str, domain: &str, millis: i64) -> String {
    format!("{prefix}_{millis}@{domain}")
}

/// A new account submitted by the registration flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Registration {
    /// Build a registration with an email stamped with the current wall-clock millisecond.
    pub fn generate(config: &RegisterConfig) -> Self {
        Self::generate_at(config, chrono::Utc::now().timestamp_millis())
    }

    pub fn generate_at(config: &RegisterConfig, millis: i64) -> Self {
        Self {
            name: config.name.clone(),
            email: unique_email_at(&config.email_prefix, &config.email_domain, millis),
            password: config.password.clone(),
            password_confirmation: config.password.clone(),
        }
    }

    /// Apply the app's own form rules so a bad fixture fails here, not as a token timeout.
    pub fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::Fixture("registration name is blank".to_string()));
        }
        check_email(&self.email).map_err(E2eError::Fixture)?;
        check_password(&self.password).map_err(E2eError::Fixture)?;
        if self.password != self.password_confirmation {
            return Err(E2eError::Fixture(
                "password confirmation does not match password".to_string(),
            ));
        }
        Ok(())
    }
}

/// Existing account used by the login flow
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Read and validate a credentials JSON file.
    ///
    /// Both `email` and `password` must be present, be strings and pass the
    /// login form's own checks. Every failure names the file and the problem.
    pub fn load(path: &Path) -> E2eResult<Self> {
        let fail = |reason: String| E2eError::Credentials {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| fail(format!("invalid JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| fail("expected a JSON object".to_string()))?;

        let field = |key: &str| -> E2eResult<String> {
            match object.get(key) {
                None => Err(fail(format!("missing key '{key}'"))),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    Err(fail(format!("key '{key}' is empty")))
                }
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(fail(format!("key '{key}' must be a string"))),
            }
        };

        let credentials = Self {
            email: field("email")?,
            password: field("password")?,
        };
        check_email(&credentials.email).map_err(&fail)?;
        check_password(&credentials.password).map_err(&fail)?;

        Ok(credentials)
    }
}
