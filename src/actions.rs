//! Deferred actions applied to a matched node
//!
//! An [`ActionBinding`] is attached to a resolver alternative and executed only
//! against the node that actually matched. Flows can implement the trait themselves
//! to compose arbitrary post-match behavior; [`InvokeSameTab`] is one such composite
//! (strip the link's `target` attribute so navigation stays in the current tab).

use crate::driver::PageNode;
use crate::error::{Error, Result};

/// A deferred operation applied to the node that satisfied a matched alternative
pub trait ActionBinding<N: PageNode> {
    /// Apply the action to the matched node
    fn apply(&self, node: &N) -> Result<()>;

    /// Short human-readable name for logging
    fn describe(&self) -> String;
}

/// Clear the node and type text into it
pub struct TypeText {
    text: String,
}

impl TypeText {
    pub fn new(text: impl Into<String>) -> Self {
        TypeText { text: text.into() }
    }
}

impl<N: PageNode> ActionBinding<N> for TypeText {
    fn apply(&self, node: &N) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::InvalidInput("cannot type an empty value".to_string()));
        }
        node.type_text(&self.text)?;
        log::info!("typed '{}' into {}", self.text, node.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        "type text".to_string()
    }
}

/// Click the node
#[derive(Default)]
pub struct Invoke;

impl<N: PageNode> ActionBinding<N> for Invoke {
    fn apply(&self, node: &N) -> Result<()> {
        log::info!("clicking {}", node.describe());
        node.click()
    }

    fn describe(&self) -> String {
        "invoke".to_string()
    }
}

/// Observe only: match the node but do nothing to it
#[derive(Default)]
pub struct Observe;

impl<N: PageNode> ActionBinding<N> for Observe {
    fn apply(&self, _node: &N) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "observe".to_string()
    }
}

/// Click a link after removing its `target` attribute, so the navigation opens in
/// the current tab instead of a new one
#[derive(Default)]
pub struct InvokeSameTab;

impl<N: PageNode> ActionBinding<N> for InvokeSameTab {
    fn apply(&self, node: &N) -> Result<()> {
        log::info!("removing target attribute from {}", node.describe());
        node.invoke_js("function(el) { el.removeAttribute('target'); }")?;
        log::info!("clicking {}", node.describe());
        node.click()
    }

    fn describe(&self) -> String {
        "invoke in same tab".to_string()
    }
}
