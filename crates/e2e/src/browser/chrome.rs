use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tracing::{debug, info};

use super::{Launcher, Page};
use crate::config::E2eConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Launches a new headless Chrome process per session
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

impl Launcher for ChromeLauncher {
    fn launch(&self, config: &E2eConfig) -> E2eResult<Box<dyn Page>> {
        Ok(Box::new(ChromePage::launch(config)?))
    }
}

/// A Chrome process and the single tab a flow drives
///
/// Dropping it kills the browser, so the session is released whether the
/// flow passed or failed.
pub struct ChromePage {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePage {
    pub fn launch(config: &E2eConfig) -> E2eResult<Self> {
        let browser_config = &config.browser;
        let options = LaunchOptions::default_builder()
            .headless(browser_config.headless)
            .window_size(Some((
                browser_config.window_width,
                browser_config.window_height,
            )))
            .path(browser_config.chrome_path.clone())
            .idle_browser_timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| E2eError::Browser(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options).map_err(E2eError::browser)?;
        let tab = browser.new_tab().map_err(E2eError::browser)?;

        info!(
            "Launched Chrome (headless: {}, window: {}x{})",
            browser_config.headless, browser_config.window_width, browser_config.window_height
        );

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl Page for ChromePage {
    fn navigate(&self, url: &str) -> E2eResult<()> {
        debug!("navigate: {}", url);
        self.tab.navigate_to(url).map_err(E2eError::browser)?;
        self.tab.wait_until_navigated().map_err(E2eError::browser)?;
        Ok(())
    }

    fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        debug!("click: {}", locator);
        let element = self
            .tab
            .wait_for_xpath_with_custom_timeout(&locator.xpath(), timeout)
            .map_err(|_| E2eError::ElementNotFound {
                locator: locator.to_string(),
                waited: timeout,
            })?;
        element.click().map_err(E2eError::browser)?;
        Ok(())
    }

    fn fill(&self, locator: &Locator, text: &str, timeout: Duration) -> E2eResult<()> {
        debug!("fill: {} ({} chars)", locator, text.len());
        let element = self
            .tab
            .wait_for_xpath_with_custom_timeout(&locator.xpath(), timeout)
            .map_err(|_| E2eError::ElementNotFound {
                locator: locator.to_string(),
                waited: timeout,
            })?;
        element.type_into(text).map_err(E2eError::browser)?;
        Ok(())
    }

    fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let value = self.evaluate(&visibility_script(locator)?)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn evaluate(&self, script: &str) -> E2eResult<Value> {
        let remote = self.tab.evaluate(script, false).map_err(E2eError::browser)?;
        Ok(remote.value.unwrap_or(Value::Null))
    }

    fn reload(&self) -> E2eResult<()> {
        debug!("reload");
        self.tab.reload(false, None).map_err(E2eError::browser)?;
        self.tab.wait_until_navigated().map_err(E2eError::browser)?;
        Ok(())
    }

    fn screenshot_png(&self) -> E2eResult<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(E2eError::browser)
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        debug!("Closing browser session");
    }
}

/// JS expression: true when the first node matching the locator is rendered.
fn visibility_script(locator: &Locator) -> E2eResult<String> {
    let xpath = serde_json::to_string(&locator.xpath())?;
    Ok(format!(
        r#"(() => {{
    const el = document.evaluate({xpath}, document, null,
        XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
    if (!el) return false;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    if (style.opacity === '0') return false;
    return el.getClientRects().length > 0;
}})()"#
    ))
}
