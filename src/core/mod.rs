//! Core logic module
//!
//! This module contains the progress model, its display backends and the
//! builder status protocol. Process and filesystem access belongs in
//! [`crate::infra`]; the terminal backend is the one exception, as it owns
//! its own redraw task.
//!
//! # Submodules
//!
//! - [`progress`] - Progress backends and the nested progress model
//! - [`status`] - Builder status stream decoding
//! - [`image_types`] - Requested image type validation
//! - [`global_config`] - Global configuration management

pub mod global_config;
pub mod image_types;
pub mod progress;
pub mod status;
