//! Ordered multi-alternative condition resolution
//!
//! [`Resolver::resolve`] evaluates a non-empty ordered list of [`Alternative`]s
//! against a live document. Each alternative carries its own wait budget, an optional
//! frame path to descend before probing, an optional action to run on the matched
//! node, and an optional signal marker for recognized exceptional outcomes. Exactly
//! one alternative's action or signal fires per call, or none (timeout).
//!
//! Per-alternative budgets let a flow say "try the happy path for up to T1, then
//! check for a known error banner for up to T2" without either wait starving the
//! other. Ordering is strict: once an earlier alternative matches, later ones are
//! never evaluated.

use crate::actions::ActionBinding;
use crate::driver::{Locator, PageDriver, PageNode};
use crate::error::{Error, Result};
use crate::logctx::LogContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// Marker naming a recognized exceptional outcome (e.g. "password-expired")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalTag(String);

impl SignalTag {
    pub fn new(tag: impl Into<String>) -> Self {
        SignalTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The check an alternative polls for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Probe {
    /// The node exists in the current scope
    Present(Locator),
    /// The node exists and is rendered
    Visible(Locator),
    /// The node exists, is rendered, and is enabled for interaction
    Interactable(Locator),
    /// No node matches the locator
    Absent(Locator),
}

impl Probe {
    /// The locator this probe watches
    pub fn locator(&self) -> &Locator {
        match self {
            Probe::Present(loc) | Probe::Visible(loc) | Probe::Interactable(loc) | Probe::Absent(loc) => loc,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Present(loc) => write!(f, "present {loc}"),
            Probe::Visible(loc) => write!(f, "visible {loc}"),
            Probe::Interactable(loc) => write!(f, "interactable {loc}"),
            Probe::Absent(loc) => write!(f, "absent {loc}"),
        }
    }
}

/// One candidate outcome the resolver may observe
pub struct Alternative<N: PageNode> {
    pub(crate) label: String,
    pub(crate) probe: Probe,
    pub(crate) budget: Duration,
    pub(crate) frame_path: Vec<Locator>,
    pub(crate) on_match: Option<Box<dyn ActionBinding<N>>>,
    pub(crate) signal: Option<SignalTag>,
}

impl<N: PageNode> Alternative<N> {
    /// Create an alternative with a human label (used in diagnostics), a probe,
    /// and its own wait budget
    pub fn new(label: impl Into<String>, probe: Probe, budget: Duration) -> Self {
        Alternative {
            label: label.into(),
            probe,
            budget,
            frame_path: Vec::new(),
            on_match: None,
            signal: None,
        }
    }

    /// Descend through these frames, in order, before evaluating the probe
    pub fn within_frames(mut self, frames: Vec<Locator>) -> Self {
        self.frame_path = frames;
        self
    }

    /// Run this action against the matched node
    pub fn then(mut self, action: impl ActionBinding<N> + 'static) -> Self {
        self.on_match = Some(Box::new(action));
        self
    }

    /// Mark a match of this alternative as a recognized exceptional outcome.
    /// A signal match never runs `then` and never produces a normal outcome.
    pub fn signals(mut self, tag: SignalTag) -> Self {
        self.signal = Some(tag);
        self
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.label, self.probe)
    }
}

/// What the resolver observed for the alternative that matched
#[derive(Debug)]
pub struct ResolverOutcome<N: PageNode> {
    /// Zero-based position of the matched alternative in the declared list
    pub index: usize,
    /// The matched node; `None` when the probe matched an absence
    pub node: Option<N>,
    /// The frame path that was descended for the match
    pub frame_path: Vec<Locator>,
}

/// Tagged result of one resolver call.
///
/// Expected-but-exceptional states (a signal match, exhaustion of every budget) are
/// data, not errors; `Err` from [`Resolver::resolve`] is reserved for faults such as
/// driver failures or misconfiguration.
#[derive(Debug)]
pub enum Resolution<N: PageNode> {
    /// An alternative matched normally
    Matched(ResolverOutcome<N>),
    /// A signal-marked alternative matched
    Signal(SignalTag),
    /// Every alternative exhausted its budget; carries the attempted descriptions
    TimedOut(Vec<String>),
}

impl<N: PageNode> Resolution<N> {
    /// Require a normal match, converting `Signal` and `TimedOut` into the
    /// corresponding errors
    pub fn into_outcome(self) -> Result<ResolverOutcome<N>> {
        match self {
            Resolution::Matched(outcome) => Ok(outcome),
            Resolution::Signal(tag) => Err(Error::Signal(tag)),
            Resolution::TimedOut(attempted) => Err(Error::NoAlternativeMatched { attempted }),
        }
    }

    /// The signal tag, if this resolution is a signal match
    pub fn signal(&self) -> Option<&SignalTag> {
        match self {
            Resolution::Signal(tag) => Some(tag),
            _ => None,
        }
    }
}

/// The condition-resolution engine
#[derive(Debug, Clone)]
pub struct Resolver {
    poll_interval: Duration,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver { poll_interval: Duration::from_millis(250) }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the probe polling interval (the suspension point granularity)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Evaluate the alternatives strictly in declared order.
    ///
    /// For each alternative: reset scope to the top document, descend its frame path
    /// (each frame awaited within the alternative's own budget; an unreachable frame
    /// abandons the alternative), then poll its probe until it holds or the budget
    /// elapses. The first match wins; a timed-out alternative costs nothing but its
    /// own budget.
    pub fn resolve<D: PageDriver>(
        &self,
        driver: &mut D,
        alternatives: Vec<Alternative<D::Node>>,
        ctx: &LogContext,
    ) -> Result<Resolution<D::Node>> {
        if alternatives.is_empty() {
            return Err(Error::Configuration("alternative list must not be empty".to_string()));
        }
        for (index, alt) in alternatives.iter().enumerate() {
            if alt.budget.is_zero() {
                return Err(Error::Configuration(format!(
                    "alternative {index} ('{}') has a zero budget",
                    alt.label
                )));
            }
            if alt.on_match.is_some() && matches!(alt.probe, Probe::Absent(_)) {
                return Err(Error::Configuration(format!(
                    "alternative {index} ('{}') binds an action to an absence probe",
                    alt.label
                )));
            }
        }

        let mut attempted = Vec::new();

        for (index, alt) in alternatives.into_iter().enumerate() {
            driver.reset_scope()?;

            let mut frames_ok = true;
            for frame in &alt.frame_path {
                if !self.await_frame(driver, frame, alt.budget)? {
                    ctx.debug(format!(
                        "alternative '{}': frame {} not reachable, moving on",
                        alt.label, frame
                    ));
                    attempted.push(format!("{} [frame {} unreachable]", alt.describe(), frame));
                    frames_ok = false;
                    break;
                }
            }
            if !frames_ok {
                continue;
            }

            ctx.debug(format!("waiting up to {:?} for {}", alt.budget, alt.describe()));

            match self.await_probe(driver, &alt.probe, alt.budget)? {
                Some(node) => {
                    if let Some(tag) = alt.signal {
                        ctx.debug(format!("alternative '{}' matched as signal '{}'", alt.label, tag));
                        return Ok(Resolution::Signal(tag));
                    }
                    if let (Some(action), Some(node)) = (alt.on_match.as_ref(), node.as_ref()) {
                        ctx.debug(format!("applying '{}' to {}", action.describe(), node.describe()));
                        action.apply(node)?;
                    }
                    return Ok(Resolution::Matched(ResolverOutcome {
                        index,
                        node,
                        frame_path: alt.frame_path,
                    }));
                }
                None => {
                    ctx.debug(format!("alternative '{}' timed out", alt.label));
                    attempted.push(alt.describe());
                }
            }
        }

        Ok(Resolution::TimedOut(attempted))
    }

    /// Poll until the frame can be entered or the budget elapses
    fn await_frame<D: PageDriver>(&self, driver: &mut D, frame: &Locator, budget: Duration) -> Result<bool> {
        let deadline = Instant::now() + budget;
        loop {
            if driver.enter_frame(frame)? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Poll until the probe holds or the budget elapses. The probe is checked at
    /// least once even for a nearly-elapsed budget. `Ok(Some(None))` means an
    /// absence probe matched.
    #[allow(clippy::option_option)]
    fn await_probe<D: PageDriver>(
        &self,
        driver: &mut D,
        probe: &Probe,
        budget: Duration,
    ) -> Result<Option<Option<D::Node>>> {
        let deadline = Instant::now() + budget;
        loop {
            if let Some(matched) = Self::check_probe(driver, probe)? {
                return Ok(Some(matched));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// One probe evaluation. `Ok(None)` means "not satisfied right now".
    #[allow(clippy::option_option)]
    fn check_probe<D: PageDriver>(driver: &mut D, probe: &Probe) -> Result<Option<Option<D::Node>>> {
        match probe {
            Probe::Present(loc) => Ok(driver.find_node(loc)?.map(Some)),
            Probe::Visible(loc) => match driver.find_node(loc)? {
                Some(node) if node.is_visible()? => Ok(Some(Some(node))),
                _ => Ok(None),
            },
            Probe::Interactable(loc) => match driver.find_node(loc)? {
                Some(node) if node.is_interactable()? => Ok(Some(Some(node))),
                _ => Ok(None),
            },
            Probe::Absent(loc) => {
                if driver.find_node(loc)?.is_none() {
                    Ok(Some(None))
                } else {
                    Ok(None)
                }
            }
        }
    }
}
