//! Live terminal progress display
//!
//! The display is a block of lines on standard error:
//!
//! ```text
//! [|] <pulse message>
//! [1 / 6] <level 0 message> [█████░░░░░░░]  16%
//! [3 / 11] <level 1 message> [███░░░░░░░░░]  27%
//! Message: <status message>
//! ```
//!
//! A background thread repaints the block every [`RENDER_INTERVAL`] and
//! moves the cursor back to its first line so the next repaint overwrites it
//! in place. The builder status reader is the only writer of the shared
//! state and the redraw thread the only reader; both go through one mutex.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::Instant;

use crossterm::cursor::{Hide, MoveUp, Show};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use tokio::sync::oneshot;
use tokio::time;

use super::shorten;
use super::tree::{ProgressLevel, ProgressTree};
use crate::config::defaults::{BAR_WIDTH, RENDER_INTERVAL, STOP_TIMEOUT};
use crate::error::ProgressError;

/// Spinner glyphs, advanced once per repaint
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// What the display shows; cloned out under the lock for each repaint
#[derive(Debug, Clone, Default)]
struct DisplayState {
    pulse: String,
    status: String,
    tree: ProgressTree,
}

/// State shared between the reporting side and the redraw thread
struct Shared {
    state: Mutex<DisplayState>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn out(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Paint the whole block once; returns the number of lines painted
    fn render(&self, spinner_pos: usize) -> io::Result<u16> {
        let state = self.state().clone();
        let mut out = self.out();
        let out = &mut *out;

        let mut lines: u16 = 0;
        paint_line(out, format_args!("[{}] {}", SPINNER[spinner_pos], state.pulse))?;
        lines += 1;
        for level in state.tree.levels() {
            paint_line(out, format_args!("{}", LevelLine(level)))?;
            lines = lines.saturating_add(1);
        }
        paint_line(out, format_args!("Message: {}", state.status))?;
        lines = lines.saturating_add(1);

        out.queue(MoveUp(lines))?;
        out.flush()?;
        Ok(lines)
    }

    /// Leave the cursor visible and below the last painted block
    fn finish(&self, lines: u16) -> io::Result<()> {
        let mut out = self.out();
        out.queue(Show)?;
        out.queue(Print("\n".repeat(usize::from(lines))))?;
        out.flush()
    }

    fn hide_cursor(&self) -> io::Result<()> {
        let mut out = self.out();
        out.queue(Hide)?;
        out.flush()
    }

    /// Show the cursor unless the writer is busy.
    ///
    /// Returns `Ok(false)` when the redraw thread still holds the writer.
    fn try_show_cursor(&self) -> io::Result<bool> {
        let mut out = match self.out.try_lock() {
            Ok(out) => out,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(false),
        };
        out.queue(Show)?;
        out.flush()?;
        Ok(true)
    }
}

fn paint_line<W: Write + ?Sized>(out: &mut W, line: impl Display) -> io::Result<()> {
    out.queue(Clear(ClearType::CurrentLine))?
        .queue(Print(format_args!("{line}\n")))?;
    Ok(())
}

/// Counter, message, bar and percentage for one level
struct LevelLine<'a>(&'a ProgressLevel);

impl Display for LevelLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = self.0;
        let ratio = level.ratio();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = ((ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        write!(
            f,
            "[{} / {}] {} [{}{}] {:>3.0}%",
            level.done,
            level.total,
            level.message,
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            ratio * 100.0
        )
    }
}

/// Handle to a running redraw thread
struct RenderLoop {
    /// Carries the acknowledgment sender for the final repaint
    shutdown: mpsc::Sender<oneshot::Sender<()>>,
}

impl RenderLoop {
    fn spawn(shared: Arc<Shared>) -> io::Result<Self> {
        let (shutdown, requests) = mpsc::channel();
        thread::Builder::new()
            .name("progress-render".to_string())
            .spawn(move || redraw(&shared, &requests))?;
        Ok(Self { shutdown })
    }
}

/// Repaint on every tick until a shutdown request arrives.
///
/// Runs on its own thread: a stalled terminal blocks only this loop, never
/// the caller waiting in [`TerminalProgressBar::stop`].
fn redraw(shared: &Shared, requests: &mpsc::Receiver<oneshot::Sender<()>>) {
    let mut next_tick = Instant::now() + RENDER_INTERVAL;
    let mut spinner_pos = 0;

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        let request = match requests.recv_timeout(wait) {
            Ok(ack) => Some(ack),
            // a dropped sender also ends the loop, with the same epilogue
            Err(RecvTimeoutError::Disconnected) => None,
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = shared.render(spinner_pos) {
                    tracing::debug!("progress render failed: {err}");
                }
                spinner_pos = (spinner_pos + 1) % SPINNER.len();
                next_tick = (next_tick + RENDER_INTERVAL).max(Instant::now());
                continue;
            }
        };

        let result = shared
            .render(spinner_pos)
            .and_then(|lines| shared.finish(lines));
        if let Err(err) = result {
            tracing::debug!("final progress render failed: {err}");
        }
        if let Some(ack) = request {
            let _ = ack.send(());
        }
        return;
    }
}

/// In-place redrawing progress display for interactive terminals
pub struct TerminalProgressBar {
    shared: Arc<Shared>,
    render_loop: Mutex<Option<RenderLoop>>,
}

impl TerminalProgressBar {
    /// Display on standard error.
    ///
    /// Fails with [`ProgressError::NotATerminal`] unless standard error is an
    /// interactive terminal.
    pub fn new() -> Result<Self, ProgressError> {
        if !io::stderr().is_terminal() {
            return Err(ProgressError::NotATerminal);
        }
        Ok(Self::with_writer(io::stderr()))
    }

    /// Display on an arbitrary writer, without the terminal check
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DisplayState::default()),
                out: Mutex::new(Box::new(out)),
            }),
            render_loop: Mutex::new(None),
        }
    }

    pub fn set_pulse(&self, msg: impl Display) {
        self.shared.state().pulse = shorten(&msg.to_string());
    }

    pub fn set_status(&self, msg: impl Display) {
        self.shared.state().status = shorten(&msg.to_string());
    }

    pub fn set_progress(
        &self,
        level: usize,
        msg: &str,
        done: u64,
        total: u64,
    ) -> Result<(), ProgressError> {
        self.shared.state().tree.set(level, msg, done, total)
    }

    /// Snapshot of the sub-progress levels
    pub fn sub_progress(&self) -> Vec<ProgressLevel> {
        self.shared.state().tree.levels().to_vec()
    }

    /// Current (shortened) pulse message
    pub fn pulse(&self) -> String {
        self.shared.state().pulse.clone()
    }

    /// Current (shortened) status message
    pub fn status(&self) -> String {
        self.shared.state().status.clone()
    }

    /// Whether the redraw thread is running
    pub fn is_running(&self) -> bool {
        self.render_loop().is_some()
    }

    /// Hide the cursor and start the redraw thread.
    ///
    /// Does nothing if the thread is already running.
    pub fn start(&self) {
        let mut render_loop = self.render_loop();
        if render_loop.is_some() {
            return;
        }
        if let Err(err) = self.shared.hide_cursor() {
            tracing::debug!("cannot hide cursor: {err}");
        }
        match RenderLoop::spawn(Arc::clone(&self.shared)) {
            Ok(spawned) => *render_loop = Some(spawned),
            Err(err) => tracing::warn!("cannot start progress render thread: {err}"),
        }
    }

    /// Ask the redraw thread for a final repaint and wait for it to finish.
    ///
    /// The wait is bounded by [`STOP_TIMEOUT`], even when the terminal has
    /// stopped accepting output. On timeout a warning is logged, the thread
    /// is left to exit on its own and the cursor is restored here if the
    /// writer is free. Does nothing if the thread is not running.
    pub async fn stop(&self) {
        let Some(render_loop) = self.render_loop().take() else {
            return;
        };

        let (ack, acked) = oneshot::channel();
        let finished = if render_loop.shutdown.send(ack).is_ok() {
            matches!(time::timeout(STOP_TIMEOUT, acked).await, Ok(Ok(())))
        } else {
            false
        };

        if !finished {
            tracing::warn!(
                "no progress render shutdown after {}s",
                STOP_TIMEOUT.as_secs()
            );
            match self.shared.try_show_cursor() {
                Ok(true) => {}
                Ok(false) => tracing::debug!("terminal busy, cursor left hidden"),
                Err(err) => tracing::debug!("cannot show cursor: {err}"),
            }
        }
    }

    fn render_loop(&self) -> MutexGuard<'_, Option<RenderLoop>> {
        self.render_loop.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for TerminalProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalProgressBar")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
