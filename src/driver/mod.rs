//! The page-driver capability boundary
//!
//! Everything the resolver and orchestrator know about a browser is expressed by the
//! [`PageDriver`] and [`PageNode`] traits. The production implementation is
//! [`chrome::ChromeSession`] over CDP; tests drive the same traits with an in-memory
//! scripted driver.

pub mod chrome;

pub use chrome::{ChromeSession, LaunchOptions};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to locate a node (or frame) inside the current scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    /// Convenience constructor for a CSS locator
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// Convenience constructor for an XPath locator
    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{s}"),
            Locator::XPath(s) => write!(f, "xpath:{s}"),
        }
    }
}

/// A handle to one located node in the remote document
pub trait PageNode {
    /// Read the node's visible text content
    fn text(&self) -> Result<String>;

    /// Click the node
    fn click(&self) -> Result<()>;

    /// Clear the node and type text into it
    fn type_text(&self, text: &str) -> Result<()>;

    /// Whether the node is currently rendered (has layout boxes)
    fn is_visible(&self) -> Result<bool>;

    /// Whether the node is visible and enabled for interaction
    fn is_interactable(&self) -> Result<bool>;

    /// Run a single-argument JS function against the node, e.g.
    /// `function(el) { el.removeAttribute('target'); }`
    fn invoke_js(&self, fn_decl: &str) -> Result<()>;

    /// A human-readable description of the node for logging
    fn describe(&self) -> String;
}

/// One live connection to a remote, asynchronously rendering document.
///
/// Lookup scope starts at the top-level document; [`enter_frame`] descends one
/// embedded frame at a time and [`reset_scope`] returns to the top. A driver instance
/// is exclusively owned by one batch run and used strictly sequentially.
///
/// [`enter_frame`]: PageDriver::enter_frame
/// [`reset_scope`]: PageDriver::reset_scope
pub trait PageDriver {
    /// The node handle type this driver produces
    type Node: PageNode;

    /// Navigate the session to a URL and wait for the load to settle
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Look for a node in the current scope. `Ok(None)` means "not present right
    /// now" (the resolver will poll again); `Err` means the capability itself failed.
    fn find_node(&mut self, locator: &Locator) -> Result<Option<Self::Node>>;

    /// Descend into an embedded frame. Returns `Ok(false)` if the frame is not
    /// present in the current scope.
    fn enter_frame(&mut self, locator: &Locator) -> Result<bool>;

    /// Return the lookup scope to the top-level document
    fn reset_scope(&mut self) -> Result<()>;

    /// Capture the current page as PNG bytes, for diagnostics
    fn capture_page(&mut self) -> Result<Vec<u8>>;

    /// Tear the session down. Must be safe to call exactly once at end of run.
    fn close(&mut self) -> Result<()>;
}
