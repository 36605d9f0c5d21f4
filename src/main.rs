//! image-builder - bootable disk image builds with live progress
//!
//! Entry point for the image-builder command-line application.

use anyhow::Result;
use clap::Parser;

use image_builder::cli::output::{display_error, verbosity_level};
use image_builder::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Standard output belongs to the builder; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(verbosity_level(cli.verbose).into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
