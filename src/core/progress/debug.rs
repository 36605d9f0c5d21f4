//! Debug progress: one line per call, never redraws
//!
//! Meant for inspecting the raw sequence of progress events coming out of
//! the builder; earlier lines are never cleared.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::Mutex;

pub struct DebugProgressBar {
    out: Mutex<Box<dyn Write + Send>>,
}

impl DebugProgressBar {
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
        self.line(format_args!("pulse: {msg}"));
    }

    pub fn set_status(&self, msg: impl Display) {
        self.line(format_args!("msg: {msg}"));
    }

    /// Print the counters verbatim, indented two spaces per depth
    pub fn set_progress(&self, level: usize, msg: &str, done: u64, total: u64) {
        let indent = "  ".repeat(level);
        self.line(format_args!("{indent}[{done} / {total}] {msg}"));
    }

    pub fn start(&self) {
        self.line("Start progressbar");
    }

    pub fn stop(&self) {
        self.line("Stop progressbar");
    }

    fn line(&self, msg: impl Display) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writeln!(out, "{msg}") {
            tracing::debug!("cannot write progress line: {err}");
        }
    }
}

impl Default for DebugProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DebugProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugProgressBar").finish_non_exhaustive()
    }
}
