//! Bounded polling for page conditions

use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Poll a probe until it yields a value or the timeout elapses.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    timeout: Duration,
    interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Call `probe` until it returns `Some`.
    ///
    /// The probe runs at least once. A [`E2eError::Browser`] from the probe
    /// counts as "not yet": the page may be mid-reload, which destroys the
    /// script context. Any other error ends the wait immediately. Running out
    /// of time yields [`E2eError::Timeout`] naming `condition` and the last
    /// browser error seen, if any.
    pub fn until<T, F>(&self, condition: &str, mut probe: F) -> E2eResult<T>
    where
        F: FnMut() -> E2eResult<Option<T>>,
    {
        let start = Instant::now();
        let mut attempts = 0usize;
        let mut last_error: Option<String> = None;

        loop {
            attempts += 1;
            match probe() {
                Ok(Some(value)) => {
                    debug!(
                        "'{}' met after {} probe(s) in {:?}",
                        condition,
                        attempts,
                        start.elapsed()
                    );
                    return Ok(value);
                }
                Ok(None) => {}
                Err(E2eError::Browser(msg)) => {
                    debug!("'{}' probe {} failed, retrying: {}", condition, attempts, msg);
                    last_error = Some(msg);
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                let condition = match last_error {
                    Some(msg) => format!("{condition} (last browser error: {msg})"),
                    None => condition.to_string(),
                };
                return Err(E2eError::Timeout {
                    condition,
                    waited: elapsed,
                });
            }

            std::thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }
}
