//! Error types for image-builder
//!
//! Domain-specific error types using thiserror.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Progress reporting errors
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Unknown backend name in configuration
    #[error("unknown progress type: {0:?}")]
    UnknownType(String),

    /// Terminal backend requested without an interactive device
    #[error("cannot use terminal progress: standard error is not an interactive terminal")]
    NotATerminal,

    /// Sub-progress level skipped one or more parent levels
    #[error("sub-progress added out of order, have {have} sublevels but want level {want}")]
    OutOfOrder { have: usize, want: usize },
}

/// Status stream errors
#[derive(Error, Debug)]
pub enum StatusError {
    /// Reading from the monitor channel failed
    #[error("cannot read status stream: {0}")]
    Read(#[from] io::Error),

    /// A record was not valid JSON or had the wrong shape
    #[error("cannot decode status record {record:?}: {source}")]
    Decode {
        record: String,
        source: serde_json::Error,
    },
}

/// Build supervision errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Builder executable could not be resolved
    #[error("build program '{program}' not found: {error}")]
    BuilderNotFound { program: String, error: String },

    /// Builder or its monitor pipe could not be started
    #[error("error starting {program}: {source}")]
    Spawn { program: String, source: io::Error },

    /// Status stream failed while the build was running
    #[error("error reading build status: {0}")]
    Status(#[from] StatusError),

    /// Builder failed on the live path; carries the collected trace log
    #[error("build process failed: {detail}\nLog:\n{}", trace.join("\n"))]
    ProcessFailed { detail: String, trace: Vec<String> },

    /// Builder exited unsuccessfully on the direct path
    #[error("build process failed: {0}")]
    Exited(ExitStatus),

    /// Waiting for the builder failed on the direct path
    #[error("error waiting for build process: {0}")]
    Wait(io::Error),
}

impl BuildError {
    /// Diagnostic text collected before the failure, if any
    pub fn trace(&self) -> &[String] {
        match self {
            Self::ProcessFailed { trace, .. } => trace,
            _ => &[],
        }
    }
}

/// Image type request errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageTypeError {
    /// No image types requested
    #[error("cannot use an empty array as a build request")]
    Empty,

    /// Unknown image type name
    #[error("unsupported image type {name:?}, valid types are {valid}")]
    Unsupported { name: String, valid: String },

    /// ISO and disk types mixed in one request
    #[error("cannot mix ISO/disk images in request {requested:?}")]
    MixedKinds { requested: Vec<String> },
}
