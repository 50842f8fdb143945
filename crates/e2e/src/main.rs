//! Runner entry point: register, then log in, exit with the result.
//!
//! Run with: cargo run -p authflow-e2e

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use authflow_e2e::flows::{Flow, LoginFlow, RegisterFlow};
use authflow_e2e::runner::default_flows;
use authflow_e2e::{E2eConfig, E2eResult, RunReport, Runner};

#[derive(Parser, Debug)]
#[command(name = "authflow-e2e")]
#[command(about = "Browser checks for the registration and login flows")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, default_value = "authflow-e2e.toml")]
    config: PathBuf,

    /// Root URL of the app under test
    #[arg(long)]
    base_url: Option<String>,

    /// Credentials JSON for the login flow
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Which flows to run
    #[arg(long, value_enum, default_value = "all")]
    flow: FlowSelection,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the reachability check before launching the browser
    #[arg(long)]
    no_preflight: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FlowSelection {
    All,
    Register,
    Login,
}

impl FlowSelection {
    fn flows(self) -> Vec<Arc<dyn Flow>> {
        match self {
            FlowSelection::All => default_flows(),
            FlowSelection::Register => vec![Arc::new(RegisterFlow::new())],
            FlowSelection::Login => vec![Arc::new(LoginFlow::new())],
        }
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<i32> {
    let mut config = E2eConfig::load(Some(args.config.as_path()))?;
    apply_args(&mut config, &args);

    let runner = Runner::new(config).with_flows(args.flow.flows());
    let report = runner.run().await?;
    Ok(finish(&runner, &report))
}

/// Write the report and return the run's exit code.
///
/// The exit code reflects the flows only; a report that cannot be written
/// is logged and does not change it.
fn finish(runner: &Runner, report: &RunReport) -> i32 {
    if let Err(e) = runner.write_report(report) {
        error!("Could not write results: {}", e);
    }
    report.exit_code()
}

fn apply_args(config: &mut E2eConfig, args: &Args) {
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(path) = &args.credentials {
        config.credentials_path = path.clone();
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(dir) = &args.output {
        config.output_dir = dir.clone();
    }
    if args.no_preflight {
        config.preflight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_runs_both_flows_with_defaults() {
        let args = Args::try_parse_from(["authflow-e2e"]).unwrap();
        let names: Vec<_> = args.flow.flows().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["register", "login"]);

        let mut config = E2eConfig::default();
        apply_args(&mut config, &args);
        assert!(config.browser.headless);
        assert!(config.preflight);
        assert_eq!(config.base_url, "http://localhost:5173/");
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "authflow-e2e",
            "--base-url",
            "http://127.0.0.1:3001/",
            "--headed",
            "--flow",
            "login",
            "--no-preflight",
            "-o",
            "out",
        ])
        .unwrap();

        let mut config = E2eConfig::default();
        apply_args(&mut config, &args);

        assert_eq!(config.base_url, "http://127.0.0.1:3001/");
        assert!(!config.browser.headless);
        assert!(!config.preflight);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        let names: Vec<_> = args.flow.flows().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["login"]);
    }

    #[test]
    fn test_unwritable_report_keeps_flow_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the output directory should be
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"").unwrap();
        let config = E2eConfig {
            output_dir: blocker,
            ..Default::default()
        };
        let runner = Runner::new(config);

        let report = RunReport {
            total: 1,
            passed: 0,
            failed: 1,
            skipped: 0,
            duration_ms: 5,
            results: Vec::new(),
        };
        assert_eq!(finish(&runner, &report), 1);

        let passing = RunReport {
            passed: 1,
            failed: 0,
            ..report
        };
        assert_eq!(finish(&runner, &passing), 0);
    }
}
