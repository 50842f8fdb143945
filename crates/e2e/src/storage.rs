//! Browser local storage access

use serde_json::Value;

use crate::browser::Page;
use crate::error::E2eResult;
use crate::wait::Wait;

pub(crate) const CLEAR_SCRIPT: &str = "window.localStorage.clear()";

pub(crate) fn get_item_script(key: &str) -> String {
    // A JSON string is a valid JS string literal.
    let literal = Value::String(key.to_string()).to_string();
    format!("window.localStorage.getItem({literal})")
}

/// Read `key` from local storage; `None` when the key is absent.
pub fn read_item(page: &dyn Page, key: &str) -> E2eResult<Option<String>> {
    Ok(match page.evaluate(&get_item_script(key))? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Block until `key` holds a non-null value and return it.
///
/// An empty string counts as present; judging the value is the caller's job.
pub fn wait_for_item(page: &dyn Page, key: &str, wait: &Wait) -> E2eResult<String> {
    let condition = format!("local storage key '{key}' to be set");
    wait.until(&condition, || read_item(page, key))
}

pub fn clear(page: &dyn Page) -> E2eResult<()> {
    page.evaluate(CLEAR_SCRIPT)?;
    Ok(())
}
