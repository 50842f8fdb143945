//! Runs flows in order, one browser session each, and records the results

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::browser::{ChromeLauncher, Launcher, Page};
use crate::config::E2eConfig;
use crate::error::{E2eError, E2eResult, FailureKind};
use crate::flows::{Flow, FlowOutcome, LoginFlow, RegisterFlow};
use crate::probe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Passed,
    Failed,
    /// Not run because an earlier flow failed
    Skipped,
}

/// Result of running a single flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowReport {
    pub name: String,
    pub status: FlowStatus,
    pub duration_ms: u64,
    pub token_len: Option<usize>,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
    pub screenshot: Option<PathBuf>,
}

impl FlowReport {
    fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: FlowStatus::Skipped,
            duration_ms: 0,
            token_len: None,
            error: None,
            failure: None,
            screenshot: None,
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<FlowReport>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: 0 when every flow that ran passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// The default sequence: register, then log in.
pub fn default_flows() -> Vec<Arc<dyn Flow>> {
    vec![Arc::new(RegisterFlow::new()), Arc::new(LoginFlow::new())]
}

/// Sequential flow runner
///
/// Flows never overlap. Each gets a fresh session from the launcher, and
/// the first failure stops the run; later flows are reported as skipped.
pub struct Runner {
    config: Arc<E2eConfig>,
    launcher: Arc<dyn Launcher>,
    flows: Vec<Arc<dyn Flow>>,
}

impl Runner {
    /// Runner driving headless Chrome through the default flows
    pub fn new(config: E2eConfig) -> Self {
        Self::with_launcher(config, Arc::new(ChromeLauncher))
    }

    pub fn with_launcher(config: E2eConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            config: Arc::new(config),
            launcher,
            flows: default_flows(),
        }
    }

    /// Replace the flow sequence.
    pub fn with_flows(mut self, flows: Vec<Arc<dyn Flow>>) -> Self {
        self.flows = flows;
        self
    }

    pub fn config(&self) -> &E2eConfig {
        &self.config
    }

    /// Run every flow in order and build the report.
    ///
    /// Errors returned here are setup problems (bad config, app not
    /// reachable); flow failures are recorded in the report instead.
    pub async fn run(&self) -> E2eResult<RunReport> {
        self.config.validate()?;

        if self.config.preflight {
            probe::wait_for_app(&self.config.base_url, self.config.timeouts.preflight()).await?;
        }

        let start = Instant::now();
        let mut results = Vec::with_capacity(self.flows.len());
        let mut halted = false;

        info!("Running {} flow(s) against {}", self.flows.len(), self.config.base_url);

        for flow in &self.flows {
            if halted {
                warn!("- {} skipped", flow.name());
                results.push(FlowReport::skipped(flow.name()));
                continue;
            }

            let report = self.run_flow(flow.clone()).await;
            match report.status {
                FlowStatus::Passed => info!("✓ {} ({} ms)", report.name, report.duration_ms),
                _ => {
                    error!(
                        "✗ {} - {}",
                        report.name,
                        report.error.as_deref().unwrap_or("unknown error")
                    );
                    halted = true;
                }
            }
            results.push(report);
        }

        let count = |status: FlowStatus| results.iter().filter(|r| r.status == status).count();
        let report = RunReport {
            total: results.len(),
            passed: count(FlowStatus::Passed),
            failed: count(FlowStatus::Failed),
            skipped: count(FlowStatus::Skipped),
            duration_ms: start.elapsed().as_millis() as u64,
            results,
        };

        info!(
            "Results: {} passed, {} failed, {} skipped ({} ms)",
            report.passed, report.failed, report.skipped, report.duration_ms
        );

        Ok(report)
    }

    async fn run_flow(&self, flow: Arc<dyn Flow>) -> FlowReport {
        let name = flow.name().to_string();
        let config = self.config.clone();
        let launcher = self.launcher.clone();
        let start = Instant::now();

        debug!("Starting flow: {}", name);

        // headless_chrome blocks, so keep it off the async workers
        let joined = tokio::task::spawn_blocking(move || {
            execute(flow.as_ref(), launcher.as_ref(), &config)
        })
        .await;

        let (result, screenshot) = joined
            .unwrap_or_else(|e| (Err(E2eError::Task(e.to_string())), None));
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => FlowReport {
                name,
                status: FlowStatus::Passed,
                duration_ms,
                token_len: Some(outcome.token_len),
                error: None,
                failure: None,
                screenshot: None,
            },
            Err(e) => FlowReport {
                name,
                status: FlowStatus::Failed,
                duration_ms,
                token_len: None,
                failure: Some(e.kind()),
                error: Some(e.to_string()),
                screenshot,
            },
        }
    }

    /// Write the report as JSON under the output directory.
    pub fn write_report(&self, report: &RunReport) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Open a session, run the flow and release the session before returning.
fn execute(
    flow: &dyn Flow,
    launcher: &dyn Launcher,
    config: &E2eConfig,
) -> (E2eResult<FlowOutcome>, Option<PathBuf>) {
    let page = match launcher.launch(config) {
        Ok(page) => page,
        Err(e) => return (Err(e), None),
    };

    let result = flow.run(page.as_ref(), config);
    let screenshot = match &result {
        Err(_) if config.browser.failure_screenshots => {
            save_failure_screenshot(page.as_ref(), config, flow.name())
        }
        _ => None,
    };

    (result, screenshot)
}

fn save_failure_screenshot(page: &dyn Page, config: &E2eConfig, flow: &str) -> Option<PathBuf> {
    let attempt = || -> E2eResult<PathBuf> {
        let dir = config.output_dir.join("screenshots");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{flow}-failure.png"));
        std::fs::write(&path, page.screenshot_png()?)?;
        Ok(path)
    };

    match attempt() {
        Ok(path) => {
            info!("Saved failure screenshot ({}): {}", page.current_url(), path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Could not capture failure screenshot for {}: {}", flow, e);
            None
        }
    }
}
