//! Error types and result aliases for pageflow

use crate::resolver::SignalTag;
use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// The setup stage a batch was in when a fatal failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPhase {
    /// Opening the browser session
    SessionStart,
    /// Running the flow's authentication sequence
    Authentication,
}

impl fmt::Display for SetupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupPhase::SessionStart => write!(f, "session start"),
            SetupPhase::Authentication => write!(f, "authentication"),
        }
    }
}

/// Errors that can occur during flow execution
#[derive(Debug, Error)]
pub enum Error {
    /// A resolver or settings value is invalid (programmer/configuration error)
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Every alternative exhausted its budget without matching
    #[error("no alternative matched; attempted: [{}]", .attempted.join("; "))]
    NoAlternativeMatched {
        /// Label and locator of every alternative that was tried, in order
        attempted: Vec<String>,
    },

    /// A signal-marked alternative matched (a recognized exceptional outcome,
    /// e.g. "password expired banner shown")
    #[error("recognized signal outcome: {0}")]
    Signal(SignalTag),

    /// Applying an action to a matched node failed
    #[error("interaction failed: {0}")]
    Interaction(String),

    /// An action was given unusable input (e.g. empty text to type)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The underlying page driver reported a fault
    #[error("driver error: {0}")]
    Driver(String),

    /// The browser session could not be launched
    #[error("session launch failed: {0}")]
    LaunchFailed(String),

    /// Navigation to a URL failed
    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// Session open or authentication failed; the whole batch is aborted
    #[error("batch setup failed during {phase}: {source}")]
    FatalSetup {
        /// Which setup stage failed
        phase: SetupPhase,
        /// The underlying failure
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error as a fatal setup failure for the given phase
    pub fn fatal_setup(phase: SetupPhase, source: Error) -> Self {
        Error::FatalSetup { phase, source: Box::new(source) }
    }

    /// True if this is a fatal setup failure (aborts the batch before any item runs)
    pub fn is_fatal_setup(&self) -> bool {
        matches!(self, Error::FatalSetup { .. })
    }
}
