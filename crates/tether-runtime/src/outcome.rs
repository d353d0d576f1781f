#![forbid(unsafe_code)]

//! What happened to a write.

use crate::registry::CallbackFailure;

/// Final state of one pass through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// Validators accepted and the graph now holds the new value.
    Committed,
    /// The new value equals the current one; nothing ran.
    Unchanged,
    /// A validator rejected the change; graph and controls were restored.
    Vetoed,
    /// A control reported while the engine was pushing to it.
    Ignored,
}

/// Result of a write that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub status: WriteStatus,
    /// Callbacks that panicked or returned errors during this write.
    pub failures: Vec<CallbackFailure>,
}

impl WriteOutcome {
    #[must_use]
    pub fn new(status: WriteStatus) -> Self {
        Self {
            status,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_failures(mut self, failures: Vec<CallbackFailure>) -> Self {
        self.failures.extend(failures);
        self
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.status == WriteStatus::Committed
    }

    #[must_use]
    pub fn is_vetoed(&self) -> bool {
        self.status == WriteStatus::Vetoed
    }
}
