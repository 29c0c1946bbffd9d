//! Fault-isolating batch orchestration
//!
//! A [`BatchOrchestrator`] owns one session for the whole run: open, authenticate,
//! drive each work item through the flow, close. Failures below the item boundary
//! are absorbed (logged, captured, item omitted from the result); failures at or
//! above it (session open, authentication) abort the batch as
//! [`Error::FatalSetup`]. The session is torn down on every exit path, and teardown
//! failures are logged rather than propagated.

use crate::diag::{DiagnosticSink, NullSink};
use crate::driver::PageDriver;
use crate::error::{Error, Result, SetupPhase};
use crate::logctx::{LogContext, SectionColor};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation token.
///
/// Cloneable and thread-safe; an external controller (e.g. a UI stop button) sets
/// it, and the orchestrator samples it only at item boundaries. An in-flight
/// resolver wait is never interrupted; it runs to its own match or timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next item starts.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

/// A portal-specific flow: how to open a session, authenticate it, and drive one
/// work item through it.
///
/// `process` returns `Ok(Some(outcome))` when the item satisfies the batch's
/// success predicate, `Ok(None)` when it was handled but did not match, and `Err`
/// for an item-confined failure (absorbed by the orchestrator).
pub trait Flow {
    type Driver: PageDriver;
    type Item: fmt::Display;
    type Outcome;

    /// Section name used as the batch's log prefix
    fn name(&self) -> &str;

    fn open_session(&self) -> Result<Self::Driver>;

    fn authenticate(&self, driver: &mut Self::Driver, ctx: &LogContext) -> Result<()>;

    fn process(
        &self,
        driver: &mut Self::Driver,
        item: &Self::Item,
        ctx: &LogContext,
    ) -> Result<Option<Self::Outcome>>;
}

/// Aggregated result of one batch run.
///
/// `matched` preserves the relative input order of items whose flow reported the
/// success predicate; it is append-only during the run and frozen once returned.
#[derive(Debug, Serialize)]
pub struct BatchResult<T> {
    /// Outcomes of items that matched, in input order
    pub matched: Vec<T>,
    /// Number of items whose flow was started
    pub attempted: usize,
    /// Number of items whose flow failed (absorbed)
    pub failed: usize,
    /// True if the run stopped early on cancellation
    pub cancelled: bool,
}

impl<T> BatchResult<T> {
    fn new() -> Self {
        BatchResult { matched: Vec::new(), attempted: 0, failed: 0, cancelled: false }
    }
}

/// Drives an ordered set of work items through a [`Flow`] over one session
pub struct BatchOrchestrator<F: Flow> {
    flow: F,
    diagnostics: Box<dyn DiagnosticSink<F::Driver>>,
    ctx: LogContext,
}

impl<F: Flow> BatchOrchestrator<F> {
    /// Create an orchestrator with a green section context named after the flow
    /// and no diagnostics sink
    pub fn new(flow: F) -> Self {
        let ctx = LogContext::root(SectionColor::Green, flow.name());
        BatchOrchestrator { flow, diagnostics: Box::new(NullSink), ctx }
    }

    /// Replace the section log context (color, prefixes, color rendering)
    pub fn with_context(mut self, ctx: LogContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Attach a diagnostics sink invoked once per failed item
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink<F::Driver> + 'static) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    /// Run the batch.
    ///
    /// Raises only for setup failure (session open or authentication); every other
    /// failure is absorbed into per-item omission from the result. Cancellation is
    /// sampled between items: remaining items are neither started nor represented.
    pub fn run(&self, items: &[F::Item], cancel: &CancelFlag) -> Result<BatchResult<F::Outcome>> {
        let ctx = &self.ctx;

        ctx.debug("opening session");
        let mut driver = self
            .flow
            .open_session()
            .map_err(|e| Error::fatal_setup(SetupPhase::SessionStart, e))?;

        ctx.debug("authenticating");
        if let Err(e) = self.flow.authenticate(&mut driver, ctx) {
            self.teardown(&mut driver);
            return Err(Error::fatal_setup(SetupPhase::Authentication, e));
        }

        ctx.debug(format!("processing {} items", items.len()));
        let mut result = BatchResult::new();

        for item in items {
            if cancel.is_cancelled() {
                ctx.info("cancellation requested; stopping before the next item");
                result.cancelled = true;
                break;
            }

            let item_ctx = ctx.section(item.to_string());
            item_ctx.debug("starting item");
            result.attempted += 1;

            match self.flow.process(&mut driver, item, &item_ctx) {
                Ok(Some(outcome)) => {
                    item_ctx.info("item matched");
                    result.matched.push(outcome);
                }
                Ok(None) => {
                    item_ctx.debug("item did not match");
                }
                Err(e) => {
                    result.failed += 1;
                    item_ctx.recolor(SectionColor::Yellow).error(format!("item failed: {e}"));
                    self.diagnostics.capture(&mut driver, &format!("{item}_ERROR"));
                }
            }
        }

        ctx.info(format!(
            "batch finished: {} matched, {} failed, {} attempted",
            result.matched.len(),
            result.failed,
            result.attempted
        ));
        self.teardown(&mut driver);
        Ok(result)
    }

    /// Close the session; teardown failures are logged, never propagated
    fn teardown(&self, driver: &mut F::Driver) {
        self.ctx.debug("closing session");
        if let Err(e) = driver.close() {
            self.ctx.warn(format!("session teardown failed: {e}"));
        }
    }
}
