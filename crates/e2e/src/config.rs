//! Runner configuration
//!
//! Every URL, timeout and label the flows depend on lives here. Values come
//! from the built-in defaults, an optional TOML file, `AUTHFLOW_*`
//! environment variables and finally CLI flags, in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Top-level configuration shared by every flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Root URL of the app under test
    pub base_url: String,

    /// JSON file holding `email` and `password` for the login flow
    pub credentials_path: PathBuf,

    /// Directory for the run report and failure screenshots
    pub output_dir: PathBuf,

    /// Local storage key the app writes after a successful auth
    pub token_key: String,

    /// Check that `base_url` answers before launching any browser
    pub preflight: bool,

    pub timeouts: TimeoutConfig,
    pub browser: BrowserConfig,
    pub register: RegisterConfig,
    pub login: LoginConfig,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173/".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            output_dir: PathBuf::from("test-results"),
            token_key: "token".to_string(),
            preflight: true,
            timeouts: TimeoutConfig::default(),
            browser: BrowserConfig::default(),
            register: RegisterConfig::default(),
            login: LoginConfig::default(),
        }
    }
}

/// Bounds for every wait the flows perform, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Single element lookup before click or fill
    pub lookup_ms: u64,

    /// Explicit waits: form field visibility and token presence
    pub wait_ms: u64,

    /// Delay between two probes of an explicit wait
    pub poll_interval_ms: u64,

    /// Total time allowed for the preflight reachability check
    pub preflight_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup_ms: 5_000,
            wait_ms: 10_000,
            poll_interval_ms: 500,
            preflight_ms: 5_000,
        }
    }
}

impl TimeoutConfig {
    pub fn lookup(&self) -> Duration {
        Duration::from_millis(self.lookup_ms)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn preflight(&self) -> Duration {
        Duration::from_millis(self.preflight_ms)
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Chrome/Chromium binary (None = auto-detect)
    pub chrome_path: Option<PathBuf>,

    pub window_width: u32,
    pub window_height: u32,

    /// Save a PNG of the page when a flow fails
    pub failure_screenshots: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: 1280,
            window_height: 720,
            failure_screenshots: true,
        }
    }
}

/// Labels and generated values used by the registration flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    pub open_label: String,
    pub submit_label: String,
    pub name: String,
    pub password: String,
    pub email_prefix: String,
    pub email_domain: String,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            open_label: "Register".to_string(),
            submit_label: "Create Account".to_string(),
            name: "Test User".to_string(),
            password: "TestPassword123!".to_string(),
            email_prefix: "testuser".to_string(),
            email_domain: "example.com".to_string(),
        }
    }
}

/// Labels used by the login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub open_label: String,
    pub submit_label: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            open_label: "Login".to_string(),
            submit_label: "Enter Account".to_string(),
        }
    }
}

impl E2eConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    ///
    /// A path that does not exist yields the defaults; a file that exists but
    /// does not parse is an error.
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::from_toml(&std::fs::read_to_string(path)?)?
            }
            Some(path) => {
                debug!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `AUTHFLOW_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("AUTHFLOW_BASE_URL") {
            self.base_url = url;
        }
        if let Some(path) = lookup("AUTHFLOW_CREDENTIALS") {
            self.credentials_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("AUTHFLOW_HEADLESS") {
            self.browser.headless = !matches!(
                value.trim().to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        if let Some(path) = lookup("AUTHFLOW_CHROME_PATH") {
            self.browser.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup("AUTHFLOW_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Reject values no flow could run with.
    pub fn validate(&self) -> E2eResult<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| E2eError::Config(format!("base_url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(E2eError::Config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let t = &self.timeouts;
        for (name, value) in [
            ("lookup_ms", t.lookup_ms),
            ("wait_ms", t.wait_ms),
            ("poll_interval_ms", t.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(E2eError::Config(format!("timeouts.{name} must be > 0")));
            }
        }
        if self.preflight && t.preflight_ms == 0 {
            return Err(E2eError::Config(
                "timeouts.preflight_ms must be > 0 when preflight is enabled".to_string(),
            ));
        }
        if t.poll_interval_ms > t.wait_ms {
            return Err(E2eError::Config(format!(
                "timeouts.poll_interval_ms ({}) exceeds timeouts.wait_ms ({})",
                t.poll_interval_ms, t.wait_ms
            )));
        }

        if self.token_key.trim().is_empty() {
            return Err(E2eError::Config("token_key is empty".to_string()));
        }
        for (name, label) in [
            ("register.open_label", &self.register.open_label),
            ("register.submit_label", &self.register.submit_label),
            ("login.open_label", &self.login.open_label),
            ("login.submit_label", &self.login.submit_label),
        ] {
            if label.trim().is_empty() {
                return Err(E2eError::Config(format!("{name} is empty")));
            }
        }

        Ok(())
    }
}
