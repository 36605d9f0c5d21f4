//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::defaults::DEFAULT_IMAGE_TYPE;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build images from a serialized build plan
    Build {
        /// Build plan file, or `-` for standard input
        #[arg(long, value_name = "FILE")]
        plan: String,

        /// Image type to build (repeatable)
        #[arg(long = "type", value_name = "TYPE", default_value = DEFAULT_IMAGE_TYPE)]
        types: Vec<String>,

        /// Progress display: plain, debug or term
        #[arg(long, value_name = "TYPE")]
        progress: Option<String>,

        /// Builder object store directory
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// Directory receiving the built images
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Extra KEY=VALUE environment entry for the builder (repeatable)
        #[arg(long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Builder program to run
        #[arg(long, value_name = "PROGRAM")]
        builder: Option<String>,
    },

    /// List supported image types
    Types,
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Build {
                plan,
                types,
                progress,
                store,
                output,
                env,
                builder,
            } => {
                let options = build::BuildOptions {
                    plan,
                    types,
                    progress,
                    store,
                    output,
                    env,
                    builder,
                };
                build::execute(options).await
            }
            Self::Types => {
                types::execute();
                Ok(())
            }
        }
    }
}
