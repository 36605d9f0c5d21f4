//! External builder supervision
//!
//! Runs the builder on a serialized plan and relays its progress to a
//! [`ProgressBar`]. Two modes exist:
//!
//! - **live**: for backends that show progress, the builder is asked to
//!   write status records to descriptor 3; those are decoded and forwarded
//!   while messages and traces are kept for the failure report.
//! - **direct**: for plain output, the builder runs unmonitored with its
//!   standard output and error passed through untouched, so callers that
//!   parse the raw builder output keep working.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::defaults::{DEFAULT_BUILDER, MONITOR_FD, MONITOR_FORMAT};
use crate::core::progress::ProgressBar;
use crate::core::status::{StatusEvent, StatusScanner};
use crate::error::BuildError;
use crate::infra::aux_channel::spawn_with_auxiliary_channel;

/// Everything one builder run needs
#[derive(Debug, Clone, Default)]
pub struct BuildJob {
    /// Serialized build plan, fed to the builder on standard input
    pub plan: Vec<u8>,
    /// Builder object store directory
    pub store: PathBuf,
    /// Directory receiving the exported artifacts
    pub output_dir: PathBuf,
    /// Pipelines to export
    pub exports: Vec<String>,
    /// Extra `KEY=VALUE` environment entries
    pub extra_env: Vec<String>,
}

impl BuildJob {
    pub fn new(plan: Vec<u8>, store: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            plan,
            store: store.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Add a pipeline to export
    #[must_use]
    pub fn with_export(mut self, export: impl Into<String>) -> Self {
        self.exports.push(export.into());
        self
    }

    /// Add several pipelines to export
    #[must_use]
    pub fn with_exports<I, S>(mut self, exports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports.extend(exports.into_iter().map(Into::into));
        self
    }

    /// Add a `KEY=VALUE` environment entry
    #[must_use]
    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.extra_env.push(entry.into());
        self
    }

    /// Add several `KEY=VALUE` environment entries
    #[must_use]
    pub fn with_env_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_env.extend(entries.into_iter().map(Into::into));
        self
    }
}

/// Messages and traces collected during one live run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLog {
    entries: Vec<String>,
}

impl TraceLog {
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// Launches the external builder and relays its status
#[derive(Debug, Clone)]
pub struct BuildSupervisor {
    program: String,
    leading_args: Vec<String>,
}

impl Default for BuildSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_BUILDER)
    }
}

impl BuildSupervisor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Build from a command line such as `["sudo", "osbuild"]`.
    ///
    /// An empty command falls back to the default builder.
    pub fn from_command(command: &[String]) -> Self {
        match command.split_first() {
            Some((program, args)) => Self::new(program.clone()).with_leading_args(args.to_vec()),
            None => Self::default(),
        }
    }

    /// Arguments placed before the builder's own arguments
    #[must_use]
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run one build, reporting through `pb`.
    ///
    /// Backends that support live monitoring get the status stream; others
    /// get the builder's raw output.
    pub async fn run(&self, job: &BuildJob, pb: &ProgressBar) -> Result<(), BuildError> {
        if pb.supports_live_monitoring() {
            self.run_monitored(job, pb).await
        } else {
            self.run_direct(job).await
        }
    }

    /// Builder arguments shared by both modes
    fn command(&self, job: &BuildJob) -> Result<Command, BuildError> {
        let program =
            which::which(&self.program).map_err(|e| BuildError::BuilderNotFound {
                program: self.program.clone(),
                error: e.to_string(),
            })?;

        let mut cmd = Command::new(program);
        cmd.args(&self.leading_args)
            .arg("--store")
            .arg(&job.store)
            .arg("--output-directory")
            .arg(&job.output_dir);

        for entry in &job.extra_env {
            match entry.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    cmd.env(key, value);
                }
                _ => tracing::warn!("ignoring malformed environment entry {entry:?}"),
            }
        }

        cmd.stdin(Stdio::piped()).stderr(Stdio::inherit());
        Ok(cmd)
    }

    fn add_exports(cmd: &mut Command, exports: &[String]) {
        for export in exports {
            cmd.arg("--export").arg(export);
        }
    }

    async fn run_direct(&self, job: &BuildJob) -> Result<(), BuildError> {
        let mut cmd = self.command(job)?;
        cmd.arg("-").stdout(Stdio::inherit());
        Self::add_exports(&mut cmd, &job.exports);

        tracing::debug!("starting {} without monitoring", self.program);
        let mut child = cmd.spawn().map_err(|source| self.spawn_error(source))?;
        let feeder = feed_plan(&mut child, &job.plan);

        let status = child.wait().await.map_err(BuildError::Wait)?;
        finish_feeding(feeder).await;
        if !status.success() {
            return Err(BuildError::Exited(status));
        }
        Ok(())
    }

    async fn run_monitored(&self, job: &BuildJob, pb: &ProgressBar) -> Result<(), BuildError> {
        let mut cmd = self.command(job)?;
        cmd.arg(format!("--monitor={MONITOR_FORMAT}"))
            .arg(format!("--monitor-fd={MONITOR_FD}"))
            .arg("-")
            .stdout(Stdio::null());
        Self::add_exports(&mut cmd, &job.exports);

        tracing::debug!("starting {} with status on fd {MONITOR_FD}", self.program);
        let (mut child, monitor) = spawn_with_auxiliary_channel(&mut cmd, MONITOR_FD)
            .map_err(|source| self.spawn_error(source))?;
        let feeder = feed_plan(&mut child, &job.plan);

        let mut scanner = StatusScanner::new(BufReader::new(monitor));
        let mut trace = TraceLog::default();
        while let Some(status) = scanner.next_status().await? {
            for event in status.into_events() {
                dispatch(pb, &mut trace, event);
            }
        }

        let result = child.wait().await;
        finish_feeding(feeder).await;
        let detail = match result {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => status.to_string(),
            Err(err) => err.to_string(),
        };
        Err(BuildError::ProcessFailed {
            detail,
            trace: trace.into_entries(),
        })
    }

    fn spawn_error(&self, source: std::io::Error) -> BuildError {
        BuildError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

/// Forward one event to the display and keep texts for failure reports
fn dispatch(pb: &ProgressBar, trace: &mut TraceLog, event: StatusEvent) {
    match event {
        StatusEvent::Progress {
            level,
            message,
            done,
            total,
        } => {
            if let Err(err) = pb.set_progress(level, &message, done, total) {
                tracing::warn!("cannot set progress: {err}");
            }
        }
        StatusEvent::Message(text) => {
            pb.set_status(&text);
            trace.push(text);
        }
        StatusEvent::Trace(text) => trace.push(text),
    }
}

/// Write the plan to the child's stdin in the background and close it.
///
/// Runs concurrently with status reading so a builder that reports before
/// consuming all of its input cannot deadlock against us.
fn feed_plan(child: &mut Child, plan: &[u8]) -> Option<JoinHandle<()>> {
    let mut stdin = child.stdin.take()?;
    let plan = plan.to_vec();
    Some(tokio::spawn(async move {
        if let Err(err) = stdin.write_all(&plan).await {
            tracing::debug!("builder did not read the whole plan: {err}");
        }
    }))
}

async fn finish_feeding(feeder: Option<JoinHandle<()>>) {
    if let Some(feeder) = feeder {
        if let Err(err) = feeder.await {
            tracing::debug!("plan writer task failed: {err}");
        }
    }
}
