//! Configuration and constants
//!
//! Built-in defaults live in [`defaults`]. User settings are loaded by
//! [`crate::core::global_config`].

pub mod defaults;
