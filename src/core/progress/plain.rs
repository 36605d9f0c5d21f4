//! Plain progress: messages only, no live display

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes pulse and status messages as plain lines and ignores counters.
///
/// Used when standard error is not a terminal or progress detail is not
/// wanted.
pub struct PlainProgressBar {
    out: Mutex<Box<dyn Write + Send>>,
}

impl PlainProgressBar {
    /// Report to standard error
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Report to an arbitrary writer
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn set_pulse(&self, msg: impl Display) {
        self.line(msg);
    }

    pub fn set_status(&self, msg: impl Display) {
        self.line(msg);
    }

    fn line(&self, msg: impl Display) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writeln!(out, "{msg}") {
            tracing::debug!("cannot write progress message: {err}");
        }
    }
}

impl Default for PlainProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlainProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainProgressBar").finish_non_exhaustive()
    }
}
