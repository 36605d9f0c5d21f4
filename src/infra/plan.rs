//! Build plan input
//!
//! The plan is produced by a separate manifest generator and is opaque to
//! this crate: it is read as bytes and handed to the builder unchanged.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::io::AsyncReadExt;

/// Where to read the serialized plan from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    /// Standard input, written as `-`
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl PlanSource {
    /// Parse a command-line argument; `-` means standard input
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Read the whole plan; an empty plan is an error
    pub async fn read(&self) -> Result<Vec<u8>> {
        let plan = match self {
            Self::Stdin => {
                let mut plan = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut plan)
                    .await
                    .context("Failed to read build plan from standard input")?;
                plan
            }
            Self::File(path) => read_file(path).await?,
        };

        if plan.is_empty() {
            bail!("Build plan from {self} is empty");
        }
        Ok(plan)
    }
}

impl std::fmt::Display for PlanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "standard input"),
            Self::File(path) => write!(f, "'{}'", path.display()),
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read build plan at {}", path.display()))
}
