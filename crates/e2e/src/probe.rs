//! Reachability check for the app under test

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Wait until `url` answers a GET with a success status.
pub async fn wait_for_app(url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("App is up at {} ({} attempt(s))", url, attempts);
                return Ok(());
            }
            Ok(resp) => {
                warn!("App at {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for app at {}...", url);
                }
                // Connection refused is expected while the dev server starts
                if !e.is_connect() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(100)).await;
    }

    Err(E2eError::AppUnreachable {
        url: url.to_string(),
        attempts,
    })
}
