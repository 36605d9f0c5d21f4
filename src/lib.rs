//! image-builder - bootable image builds with live progress
//!
//! This library drives an external image builder on a serialized build plan
//! and reports its progress while it runs.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and commands
//! - [`core`] - Progress model, display backends and status protocol
//! - [`infra`] - Infrastructure layer (builder process, plan input, directories)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
