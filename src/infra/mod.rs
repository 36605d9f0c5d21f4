//! Infrastructure layer
//!
//! Handles I/O with the outside world: the external builder process, the
//! build plan source and configuration directories. The builder only runs
//! on Unix, where an extra descriptor can be handed to a child process.

pub mod aux_channel;
pub mod dirs;
pub mod plan;
pub mod supervisor;
