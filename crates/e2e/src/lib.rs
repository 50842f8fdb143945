//! Authflow E2E
//!
//! Browser-driven checks for a web app's sign-up and sign-in flows:
//! - Drives headless Chrome through the registration and login forms
//! - Treats a non-empty `token` in local storage as proof of success
//! - Runs flows strictly in order, one fresh browser per flow, stopping at
//!   the first failure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Runner                                                     │
//! │    ├── probe::wait_for_app(base_url)                        │
//! │    ├── Launcher::launch() -> Box<dyn Page>   (per flow)     │
//! │    ├── Flow::run(page, config) -> FlowOutcome               │
//! │    └── write_report() -> test-results.json                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Flows                                                      │
//! │    ├── RegisterFlow: Register → form → Create Account       │
//! │    │                 → token → clear storage → reload       │
//! │    └── LoginFlow:    Login → form → Enter Account → token   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page (ChromePage via headless_chrome)                      │
//! │    navigate / click / fill / is_visible / evaluate / reload │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod flows;
pub mod locator;
pub mod probe;
pub mod runner;
pub mod storage;
pub mod wait;

pub use config::E2eConfig;
pub use error::{E2eError, E2eResult};
pub use runner::{RunReport, Runner};
