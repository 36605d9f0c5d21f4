//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};

use image_builder::infra::supervisor::BuildSupervisor;
use tempfile::TempDir;

/// Test workspace
///
/// A temporary directory holding fake builder scripts, plans and whatever
/// the fake builder records about how it was called.
pub struct TestWorkspace {
    /// Temporary directory for the test
    pub dir: TempDir,
}

impl TestWorkspace {
    /// Create a new workspace in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the workspace directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the workspace
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Read a file from the workspace
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write a fake builder script.
    ///
    /// The script records its arguments in `args.txt` and its standard
    /// input in `plan.json`, then runs `body`.
    pub fn fake_builder(&self, body: &str) -> BuildSupervisor {
        let dir = self.path();
        let script = format!(
            "printf '%s\\n' \"$@\" > '{dir}/args.txt'\ncat > '{dir}/plan.json'\n{body}\n",
            dir = dir.display()
        );
        let path = self.create_file("builder.sh", &script);

        // run through the shell so the script needs no exec bit
        BuildSupervisor::new("/bin/sh").with_leading_args(vec![path.display().to_string()])
    }

    /// Arguments the fake builder was called with, one per entry
    pub fn builder_args(&self) -> Vec<String> {
        self.read_file("args.txt").lines().map(String::from).collect()
    }

    /// Run the image-builder binary with its config directory inside the
    /// workspace
    pub fn run(&self, args: &[&str]) -> std::process::Output {
        Command::new(env!("CARGO_BIN_EXE_image-builder"))
            .current_dir(self.path())
            .env("IMAGE_BUILDER_CONFIG_DIR", self.path())
            .args(args)
            .output()
            .expect("Failed to execute image-builder")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable in-memory writer for capturing backend output
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A build plan the fake builders accept
pub const SAMPLE_PLAN: &str = r#"{"version": "2", "pipelines": []}"#;
