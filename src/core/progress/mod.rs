//! Progress reporting for long-running builds
//!
//! [`ProgressBar`] is a closed set of backends behind one reporting
//! interface:
//!
//! - [`PlainProgressBar`] - pulse and status messages as plain lines
//! - [`DebugProgressBar`] - every call as its own prefixed line
//! - [`TerminalProgressBar`] - live display redrawn in place
//!
//! Backends are selected by name with [`ProgressBar::new`].

pub mod debug;
pub mod plain;
pub mod terminal;
pub mod tree;

use std::fmt::Display;
use std::str::FromStr;

pub use debug::DebugProgressBar;
pub use plain::PlainProgressBar;
pub use terminal::TerminalProgressBar;
pub use tree::{ProgressLevel, ProgressTree};

use crate::config::defaults::MAX_MESSAGE_LEN;
use crate::error::ProgressError;

/// Backend names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressKind {
    /// `""` or `"plain"`
    #[default]
    Plain,
    /// `"debug"`
    Debug,
    /// `"term"`
    Terminal,
}

impl FromStr for ProgressKind {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "plain" => Ok(Self::Plain),
            "debug" => Ok(Self::Debug),
            "term" => Ok(Self::Terminal),
            other => Err(ProgressError::UnknownType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Debug => write!(f, "debug"),
            Self::Terminal => write!(f, "term"),
        }
    }
}

/// A progress reporting backend
#[derive(Debug)]
pub enum ProgressBar {
    Plain(PlainProgressBar),
    Debug(DebugProgressBar),
    Terminal(TerminalProgressBar),
}

impl ProgressBar {
    /// Create the backend named by `typ`.
    ///
    /// Fails on unknown names, and for `"term"` when standard error is not an
    /// interactive terminal.
    pub fn new(typ: &str) -> Result<Self, ProgressError> {
        Self::from_kind(typ.parse()?)
    }

    /// Create a backend of the given kind reporting to standard error
    pub fn from_kind(kind: ProgressKind) -> Result<Self, ProgressError> {
        Ok(match kind {
            ProgressKind::Plain => Self::Plain(PlainProgressBar::new()),
            ProgressKind::Debug => Self::Debug(DebugProgressBar::new()),
            ProgressKind::Terminal => Self::Terminal(TerminalProgressBar::new()?),
        })
    }

    pub fn kind(&self) -> ProgressKind {
        match self {
            Self::Plain(_) => ProgressKind::Plain,
            Self::Debug(_) => ProgressKind::Debug,
            Self::Terminal(_) => ProgressKind::Terminal,
        }
    }

    /// Whether builds should stream structured status into this backend.
    ///
    /// Plain output keeps the builder's raw output untouched for consumers
    /// that parse it.
    pub fn supports_live_monitoring(&self) -> bool {
        match self {
            Self::Plain(_) => false,
            Self::Debug(_) | Self::Terminal(_) => true,
        }
    }

    /// Set the high-level phase shown next to the spinner
    pub fn set_pulse(&self, msg: impl Display) {
        match self {
            Self::Plain(pb) => pb.set_pulse(msg),
            Self::Debug(pb) => pb.set_pulse(msg),
            Self::Terminal(pb) => pb.set_pulse(msg),
        }
    }

    /// Set the most recent status message
    pub fn set_status(&self, msg: impl Display) {
        match self {
            Self::Plain(pb) => pb.set_status(msg),
            Self::Debug(pb) => pb.set_status(msg),
            Self::Terminal(pb) => pb.set_status(msg),
        }
    }

    /// Set the counters of sub-progress `level`.
    ///
    /// Levels start at 0 and must be added in order; adding level 2 before
    /// level 1 fails.
    pub fn set_progress(
        &self,
        level: usize,
        msg: &str,
        done: u64,
        total: u64,
    ) -> Result<(), ProgressError> {
        match self {
            Self::Plain(_) => Ok(()),
            Self::Debug(pb) => {
                pb.set_progress(level, msg, done, total);
                Ok(())
            }
            Self::Terminal(pb) => pb.set_progress(level, msg, done, total),
        }
    }

    pub fn start(&self) {
        match self {
            Self::Plain(_) => {}
            Self::Debug(pb) => pb.start(),
            Self::Terminal(pb) => pb.start(),
        }
    }

    pub async fn stop(&self) {
        match self {
            Self::Plain(_) => {}
            Self::Debug(pb) => pb.stop(),
            Self::Terminal(pb) => pb.stop().await,
        }
    }
}

/// Collapse newlines and elide text past [`MAX_MESSAGE_LEN`] characters
pub fn shorten(msg: &str) -> String {
    let msg = msg.replace('\n', " ");
    match msg.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((cut, _)) => format!("{}...", &msg[..cut]),
        None => msg,
    }
}
