//! CDP-backed implementation of the page-driver capability
//!
//! [`ChromeSession`] owns one Chrome/Chromium instance via `headless_chrome` and
//! resolves nodes with in-page JavaScript, which lets lookups descend into
//! same-origin embedded frames (CDP has no Selenium-style frame switching, so the
//! session keeps an explicit frame-path stack instead).

use crate::driver::{Locator, PageDriver, PageNode};
use crate::error::{Error, Result};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Options for launching a browser instance
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window (default: true)
    pub headless: bool,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Path to the Chrome/Chromium binary, if not auto-detected
    pub chrome_path: Option<PathBuf>,
    /// Profile directory; a throwaway temp profile when unset
    pub user_data_dir: Option<PathBuf>,
    /// Whether to run with the Chrome sandbox enabled
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        LaunchOptions {
            headless: true,
            window_width: 1366,
            window_height: 900,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

/// Escape a Rust string into a JS double-quoted string literal
fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// JS expression locating `locator` inside the document expression `doc`
fn lookup_js(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => format!("doc.querySelector({})", js_str(selector)),
        Locator::XPath(expr) => format!(
            "doc.evaluate({}, doc, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            js_str(expr)
        ),
    }
}

/// Build an IIFE that descends `frames` from the top document and evaluates to the
/// node matched by `target`, or `null` at any missing step
fn locate_expr(frames: &[Locator], target: &Locator) -> String {
    let mut body = String::from("let doc = document; let el;\n");
    for frame in frames {
        body.push_str(&format!(
            "el = {}; if (!el || !el.contentDocument) return null; doc = el.contentDocument;\n",
            lookup_js(frame)
        ));
    }
    body.push_str(&format!("return {};", lookup_js(target)));
    format!("(function() {{ {body} }})()")
}

/// A node handle bound to the locate expression that found it.
///
/// Every operation re-runs the locate expression, so the handle survives DOM
/// re-renders as long as the same node can still be found.
pub struct ChromeNode {
    tab: Arc<Tab>,
    locate: String,
    summary: String,
}

impl ChromeNode {
    fn eval(&self, expr: &str) -> Result<Option<serde_json::Value>> {
        let remote = self.tab.evaluate(expr, false).map_err(|e| Error::Driver(e.to_string()))?;
        Ok(remote.value)
    }

    /// Run a script of the form `fn(el) -> value`, failing if the node is gone
    fn with_node(&self, action_js: &str) -> Result<serde_json::Value> {
        let expr = format!(
            "(function() {{ const el = {}; if (!el) return null; return ({})(el); }})()",
            self.locate, action_js
        );
        match self.eval(&expr)? {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(Error::Interaction(format!("node no longer present: {}", self.summary))),
        }
    }
}

impl PageNode for ChromeNode {
    fn text(&self) -> Result<String> {
        let value = self.with_node("function(el) { return (el.innerText ?? el.textContent ?? '').trim(); }")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn click(&self) -> Result<()> {
        self.with_node("function(el) { el.click(); return true; }")?;
        log::info!("clicked {}", self.summary);
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        let action = format!(
            "function(el) {{ el.focus(); el.value = ''; el.value = {}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); return true; }}",
            js_str(text)
        );
        self.with_node(&action)?;
        log::info!("typed {} characters into {}", text.chars().count(), self.summary);
        Ok(())
    }

    fn is_visible(&self) -> Result<bool> {
        let value = self.with_node("function(el) { return el.getClientRects().length > 0; }")?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn is_interactable(&self) -> Result<bool> {
        let value = self.with_node(
            "function(el) { return el.getClientRects().length > 0 && !el.disabled; }",
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn invoke_js(&self, fn_decl: &str) -> Result<()> {
        let action = format!("function(el) {{ ({fn_decl})(el); return true; }}");
        self.with_node(&action)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.summary.clone()
    }
}

/// Browser session implementing [`PageDriver`] over a Chrome/Chromium instance
pub struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
    frame_path: Vec<Locator>,
}

impl ChromeSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Raise the idle timeout (default 30s) so a long batch does not lose its session
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }
        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| Error::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tab, frame_path: Vec::new() })
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    fn eval(&self, expr: &str) -> Result<Option<serde_json::Value>> {
        let remote = self.tab.evaluate(expr, false).map_err(|e| Error::Driver(e.to_string()))?;
        Ok(remote.value)
    }
}

impl PageDriver for ChromeSession {
    type Node = ChromeNode;

    fn navigate(&mut self, url: &str) -> Result<()> {
        self.frame_path.clear();
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::NavigationFailed(format!("Navigation timeout: {}", e)))?;
        Ok(())
    }

    fn find_node(&mut self, locator: &Locator) -> Result<Option<ChromeNode>> {
        let locate = locate_expr(&self.frame_path, locator);
        let probe = format!(
            "(function() {{ const el = {locate}; if (!el) return null; \
             return JSON.stringify({{ tag: el.tagName, id: el.id || '', \
             text: (el.textContent || '').trim().slice(0, 60) }}); }})()"
        );

        let raw = match self.eval(&probe)? {
            Some(serde_json::Value::String(s)) => s,
            _ => return Ok(None),
        };

        let info: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| Error::Driver(format!("bad node descriptor: {}", e)))?;
        let tag = info["tag"].as_str().unwrap_or("?").to_lowercase();
        let id = info["id"].as_str().unwrap_or_default();
        let summary = if id.is_empty() {
            format!("<{tag}> ({locator})")
        } else {
            format!("<{tag} id='{id}'> ({locator})")
        };

        Ok(Some(ChromeNode { tab: self.tab.clone(), locate, summary }))
    }

    fn enter_frame(&mut self, locator: &Locator) -> Result<bool> {
        let locate = locate_expr(&self.frame_path, locator);
        let check = format!("(function() {{ const el = {locate}; return !!(el && el.contentDocument); }})()");
        let reachable = self.eval(&check)?.and_then(|v| v.as_bool()).unwrap_or(false);
        if reachable {
            log::debug!("entered frame {}", locator);
            self.frame_path.push(locator.clone());
        }
        Ok(reachable)
    }

    fn reset_scope(&mut self) -> Result<()> {
        self.frame_path.clear();
        Ok(())
    }

    fn capture_page(&mut self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::Driver(format!("screenshot capture failed: {}", e)))
    }

    fn close(&mut self) -> Result<()> {
        // The Browser struct has no public quit; closing its tabs shuts the session down
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| Error::Driver(format!("Failed to get tabs: {}", e)))?
            .clone();
        for tab in tabs {
            let _ = tab.close(false); // Ignore errors on individual tab closes
        }
        Ok(())
    }
}
