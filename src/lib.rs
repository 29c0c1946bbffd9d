//! # pageflow
//!
//! A Rust library for driving a remote, stateful document session (a browser page)
//! through sequences of form interactions to extract business facts, built on the
//! Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Condition resolver**: wait for one of several mutually exclusive outcomes,
//!   each with its own budget, optional embedded-frame path, optional post-match
//!   action, and optional "recognized exceptional outcome" signal
//! - **Batch orchestration**: drive N independent work items through a flow over one
//!   session, absorbing per-item failure, honoring cooperative cancellation, and
//!   guaranteeing session teardown on every exit path
//! - **Capability boundary**: flows talk to [`PageDriver`]/[`PageNode`] traits; the
//!   bundled [`ChromeSession`] implements them over `headless_chrome`, and tests can
//!   substitute an in-memory driver
//! - **Contextual logging**: explicit per-section log contexts (color + prefix list)
//!   threaded through flow and resolver calls
//!
//! ## Resolving a condition
//!
//! ```rust,no_run
//! use pageflow::actions::TypeText;
//! use pageflow::{Alternative, ChromeSession, LaunchOptions, Locator, LogContext, PageDriver, Probe, Resolver};
//! use std::time::Duration;
//!
//! # fn main() -> pageflow::Result<()> {
//! let mut session = ChromeSession::launch(LaunchOptions::new())?;
//! session.navigate("https://portal.example/login")?;
//!
//! let resolver = Resolver::new();
//! let ctx = LogContext::new();
//!
//! // Type the username once the field is interactable, but give up after 10s
//! resolver
//!     .resolve(
//!         &mut session,
//!         vec![
//!             Alternative::new(
//!                 "username field",
//!                 Probe::Interactable(Locator::css("#username")),
//!                 Duration::from_secs(10),
//!             )
//!             .then(TypeText::new("alice")),
//!         ],
//!         &ctx,
//!     )?
//!     .into_outcome()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a batch
//!
//! ```rust,no_run
//! use pageflow::{BatchOrchestrator, CancelFlag, ChromeSession, Flow, LaunchOptions, LogContext};
//!
//! struct SettledCheck;
//!
//! impl Flow for SettledCheck {
//!     type Driver = ChromeSession;
//!     type Item = String;
//!     type Outcome = String;
//!
//!     fn name(&self) -> &str {
//!         "SETTLED"
//!     }
//!
//!     fn open_session(&self) -> pageflow::Result<ChromeSession> {
//!         ChromeSession::launch(LaunchOptions::new())
//!     }
//!
//!     fn authenticate(&self, _driver: &mut ChromeSession, _ctx: &LogContext) -> pageflow::Result<()> {
//!         // a short sequence of resolver calls against the login form
//!         Ok(())
//!     }
//!
//!     fn process(
//!         &self,
//!         _driver: &mut ChromeSession,
//!         item: &String,
//!         _ctx: &LogContext,
//!     ) -> pageflow::Result<Option<String>> {
//!         // fill the search form, read the status cell, decide the predicate
//!         Ok(Some(item.clone()))
//!     }
//! }
//!
//! # fn main() -> pageflow::Result<()> {
//! let orchestrator = BatchOrchestrator::new(SettledCheck);
//! let result = orchestrator.run(&["150056400".to_string()], &CancelFlag::new())?;
//! println!("matched {} of {} items", result.matched.len(), result.attempted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`resolver`]: ordered multi-alternative condition resolution
//! - [`actions`]: deferred actions bound to matched nodes
//! - [`batch`]: batch orchestration, flows, cancellation
//! - [`driver`]: the page-driver capability boundary and the CDP implementation
//! - [`diag`]: best-effort failure diagnostics (screenshots)
//! - [`logctx`]: explicit per-section log contexts
//! - [`settings`]: environment-backed configuration
//! - [`error`]: error types and result aliases

pub mod actions;
pub mod batch;
pub mod diag;
pub mod driver;
pub mod error;
pub mod logctx;
pub mod resolver;
pub mod settings;

pub use actions::ActionBinding;
pub use batch::{BatchOrchestrator, BatchResult, CancelFlag, Flow};
pub use diag::{DiagnosticSink, NullSink, ScreenshotSink};
pub use driver::{ChromeSession, LaunchOptions, Locator, PageDriver, PageNode};
pub use error::{Error, Result, SetupPhase};
pub use logctx::{LogContext, SectionColor, init_logging};
pub use resolver::{Alternative, Probe, Resolution, Resolver, ResolverOutcome, SignalTag};
pub use settings::{PortalSettings, RunnerSettings};
