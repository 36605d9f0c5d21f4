//! Nested sub-progress state
//!
//! A [`ProgressTree`] holds one [`ProgressLevel`] per nesting depth. Levels
//! are appended strictly in order and never removed.

use crate::error::ProgressError;

/// One level of nested progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLevel {
    /// Human readable description of this level
    pub message: String,
    /// Completed units, biased by one
    pub done: u64,
    /// Total units, biased by one
    pub total: u64,
}

impl ProgressLevel {
    /// Build a level from raw counters.
    ///
    /// Both counters get a +1 bias so a fresh `0/0` level renders as in
    /// progress instead of complete.
    pub fn new(message: &str, done: u64, total: u64) -> Self {
        Self {
            message: message.to_string(),
            done: done.saturating_add(1),
            total: total.saturating_add(1),
        }
    }

    /// Fraction complete in `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.done as f64 / self.total as f64;
        ratio.clamp(0.0, 1.0)
    }
}

/// Ordered, dense sequence of progress levels indexed by depth
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTree {
    levels: Vec<ProgressLevel>,
}

impl ProgressTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the counters of `level`, appending it if it is the next depth.
    ///
    /// Fails with [`ProgressError::OutOfOrder`] when `level` would leave a
    /// gap; the tree is left untouched in that case.
    pub fn set(
        &mut self,
        level: usize,
        message: &str,
        done: u64,
        total: u64,
    ) -> Result<(), ProgressError> {
        let entry = ProgressLevel::new(message, done, total);
        match level.cmp(&self.levels.len()) {
            std::cmp::Ordering::Less => self.levels[level] = entry,
            std::cmp::Ordering::Equal => self.levels.push(entry),
            std::cmp::Ordering::Greater => {
                return Err(ProgressError::OutOfOrder {
                    have: self.levels.len(),
                    want: level,
                });
            }
        }
        Ok(())
    }

    /// All levels, outermost first
    pub fn levels(&self) -> &[ProgressLevel] {
        &self.levels
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no level was added yet
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
