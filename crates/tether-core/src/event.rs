#![forbid(unsafe_code)]

//! Change events.

use std::fmt;

use serde_json::Value;

use crate::path::Path;

/// Identifier of a discovered control binding within one bind cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub usize);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// Where a write entered the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// Application code writing through a node.
    Model,
    /// A user edit reported by a control.
    Control(ControlId),
}

impl ChangeOrigin {
    /// Originating control, if any.
    #[must_use]
    pub fn control(self) -> Option<ControlId> {
        match self {
            Self::Model => None,
            Self::Control(id) => Some(id),
        }
    }
}

/// Immutable record of one candidate or committed write.
///
/// Built exactly once per intercepted write, before the write is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    mapping: Path,
    old_value: Option<Value>,
    new_value: Value,
    origin: ChangeOrigin,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(
        mapping: Path,
        old_value: Option<Value>,
        new_value: Value,
        origin: ChangeOrigin,
    ) -> Self {
        Self {
            mapping,
            old_value,
            new_value,
            origin,
        }
    }

    /// Path of the written location.
    #[must_use]
    pub fn mapping(&self) -> &Path {
        &self.mapping
    }

    /// Value before the write; `None` when the location did not exist.
    #[must_use]
    pub fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    #[must_use]
    pub fn new_value(&self) -> &Value {
        &self.new_value
    }

    #[must_use]
    pub fn origin(&self) -> ChangeOrigin {
        self.origin
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old_value {
            Some(old) => write!(f, "{}: {} -> {}", self.mapping, old, self.new_value),
            None => write!(f, "{}: <absent> -> {}", self.mapping, self.new_value),
        }
    }
}
