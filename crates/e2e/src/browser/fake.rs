//! In-memory stand-in for the app under test, driven through [`Page`].
//!
//! It mimics the real front end closely enough for the flows: two entry
//! buttons, a registration and a login form found by placeholder, and a
//! token written to local storage after a successful submit.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;

use super::{Launcher, Page};
use crate::config::E2eConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::storage::CLEAR_SCRIPT;

const GET_ITEM_PREFIX: &str = "window.localStorage.getItem(";

/// Server-side behaviour shared by every session opened against it
#[derive(Debug)]
pub(crate) struct FakeApp {
    pub register_label: String,
    pub login_label: String,
    pub register_submit: String,
    pub login_submit: String,
    pub backend_up: bool,
    pub token_value: String,
    /// Token reads that still return null after a successful submit
    pub token_delay_reads: usize,
    /// Script calls that fail after a submit, as while the app reloads itself
    pub reload_failures: usize,
    pub accounts: Vec<(String, String)>,
    pub events: Vec<String>,
    pub launches: usize,
}

impl Default for FakeApp {
    fn default() -> Self {
        Self {
            register_label: "Register".to_string(),
            login_label: "Login".to_string(),
            register_submit: "Create Account".to_string(),
            login_submit: "Enter Account".to_string(),
            backend_up: true,
            token_value: "eyJhbGciOiJIUzI1NiJ9.fake.sig".to_string(),
            token_delay_reads: 2,
            reload_failures: 0,
            accounts: Vec::new(),
            events: Vec::new(),
            launches: 0,
        }
    }
}

impl FakeApp {
    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts.push((email.to_string(), password.to_string()));
        self
    }

    pub fn shared(self) -> Arc<Mutex<FakeApp>> {
        Arc::new(Mutex::new(self))
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    visible: HashSet<Locator>,
    inputs: HashMap<String, String>,
    storage: HashMap<String, String>,
    /// (reads remaining, value) for a token the app is about to write
    pending_token: Option<(usize, String)>,
    /// Script calls left to fail before the page is usable again
    reloading: usize,
}

pub(crate) struct FakePage {
    app: Arc<Mutex<FakeApp>>,
    state: RefCell<PageState>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new(FakeApp::default().shared())
    }
}

impl FakePage {
    pub fn new(app: Arc<Mutex<FakeApp>>) -> Self {
        Self {
            app,
            state: RefCell::new(PageState::default()),
        }
    }

    fn app(&self) -> MutexGuard<'_, FakeApp> {
        self.app.lock().unwrap()
    }

    fn record(&self, event: String) {
        self.app().events.push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.app().events.clone()
    }

    pub fn set_storage(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .storage
            .insert(key.to_string(), value.to_string());
    }

    pub fn storage_item(&self, key: &str) -> Option<String> {
        self.state.borrow().storage.get(key).cloned()
    }

    fn show_entry_controls(&self) {
        let (register, login) = {
            let app = self.app();
            (app.register_label.clone(), app.login_label.clone())
        };
        let mut state = self.state.borrow_mut();
        state.visible.clear();
        state.inputs.clear();
        state.visible.insert(Locator::button(register));
        state.visible.insert(Locator::button(login));
    }

    fn show(&self, locators: Vec<Locator>) {
        self.state.borrow_mut().visible.extend(locators);
    }

    fn input(&self, placeholder: &str) -> String {
        self.state
            .borrow()
            .inputs
            .get(placeholder)
            .cloned()
            .unwrap_or_default()
    }

    fn submit_register(&self) {
        let name = self.input("Full Name");
        let email = self.input("Email Address");
        let password = self.input("Password");
        let confirm = self.input("Confirm Password");

        let mut app = self.app();
        if !app.backend_up || name.trim().is_empty() || password != confirm {
            return;
        }
        app.accounts.push((email, password));
        let pending = (app.token_delay_reads, app.token_value.clone());
        let reloading = app.reload_failures;
        drop(app);
        let mut state = self.state.borrow_mut();
        state.pending_token = Some(pending);
        state.reloading = reloading;
    }

    fn submit_login(&self) {
        let email = self.input("Email");
        let password = self.input("Password");

        let app = self.app();
        let known = app
            .accounts
            .iter()
            .any(|(e, p)| *e == email && *p == password);
        if !app.backend_up || !known {
            return;
        }
        let pending = (app.token_delay_reads, app.token_value.clone());
        let reloading = app.reload_failures;
        drop(app);
        let mut state = self.state.borrow_mut();
        state.pending_token = Some(pending);
        state.reloading = reloading;
    }

    fn get_item(&self, key: &str) -> Value {
        let mut state = self.state.borrow_mut();
        if let Some((reads_left, value)) = state.pending_token.take() {
            if reads_left == 0 {
                state.storage.insert("token".to_string(), value);
            } else {
                state.pending_token = Some((reads_left - 1, value));
            }
        }
        state
            .storage
            .get(key)
            .map(|v| Value::String(v.clone()))
            .unwrap_or(Value::Null)
    }
}

impl Page for FakePage {
    fn navigate(&self, url: &str) -> E2eResult<()> {
        self.record(format!("navigate {url}"));
        self.state.borrow_mut().url = url.to_string();
        self.show_entry_controls();
        Ok(())
    }

    fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        if !self.state.borrow().visible.contains(locator) {
            return Err(E2eError::ElementNotFound {
                locator: locator.to_string(),
                waited: timeout,
            });
        }
        self.record(format!("click {locator}"));

        let (register, login, register_submit, login_submit) = {
            let app = self.app();
            (
                Locator::button(app.register_label.as_str()),
                Locator::button(app.login_label.as_str()),
                Locator::button(app.register_submit.as_str()),
                Locator::button(app.login_submit.as_str()),
            )
        };

        if *locator == register {
            self.show(vec![
                Locator::placeholder("Full Name"),
                Locator::placeholder("Email Address"),
                Locator::placeholder("Password"),
                Locator::placeholder("Confirm Password"),
                register_submit,
            ]);
        } else if *locator == login {
            self.show(vec![
                Locator::placeholder("Email"),
                Locator::placeholder("Password"),
                login_submit,
            ]);
        } else if *locator == register_submit {
            self.submit_register();
        } else if *locator == login_submit {
            self.submit_login();
        }
        Ok(())
    }

    fn fill(&self, locator: &Locator, text: &str, timeout: Duration) -> E2eResult<()> {
        let mut state = self.state.borrow_mut();
        let placeholder = match locator {
            Locator::Placeholder(p) if state.visible.contains(locator) => p.clone(),
            _ => {
                return Err(E2eError::ElementNotFound {
                    locator: locator.to_string(),
                    waited: timeout,
                })
            }
        };
        state.inputs.entry(placeholder).or_default().push_str(text);
        drop(state);
        self.record(format!("fill {locator}"));
        Ok(())
    }

    fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        Ok(self.state.borrow().visible.contains(locator))
    }

    fn evaluate(&self, script: &str) -> E2eResult<Value> {
        {
            let mut state = self.state.borrow_mut();
            if state.reloading > 0 {
                state.reloading -= 1;
                return Err(E2eError::Browser(
                    "Execution context was destroyed.".to_string(),
                ));
            }
        }
        if script == CLEAR_SCRIPT {
            self.record("clear storage".to_string());
            self.state.borrow_mut().storage.clear();
            return Ok(Value::Null);
        }
        if let Some(rest) = script.strip_prefix(GET_ITEM_PREFIX) {
            let literal = rest.strip_suffix(')').unwrap_or(rest);
            let key: String = serde_json::from_str(literal)?;
            return Ok(self.get_item(&key));
        }
        Ok(Value::Null)
    }

    fn reload(&self) -> E2eResult<()> {
        self.record("reload".to_string());
        self.show_entry_controls();
        Ok(())
    }

    fn screenshot_png(&self) -> E2eResult<Vec<u8>> {
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    fn current_url(&self) -> String {
        self.state.borrow().url.clone()
    }
}

/// Opens a [`FakePage`] with empty storage per launch, like a fresh browser profile.
#[derive(Clone)]
pub(crate) struct FakeLauncher {
    pub app: Arc<Mutex<FakeApp>>,
}

impl FakeLauncher {
    pub fn new(app: FakeApp) -> Self {
        Self { app: app.shared() }
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, _config: &E2eConfig) -> E2eResult<Box<dyn Page>> {
        self.app.lock().unwrap().launches += 1;
        Ok(Box::new(FakePage::new(self.app.clone())))
    }
}
