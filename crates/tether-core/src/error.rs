#![forbid(unsafe_code)]

//! Error taxonomy shared by every Tether crate.
//!
//! # Failure Modes
//!
//! | Error | Raised by | Surfaces at |
//! |-------|-----------|-------------|
//! | `MalformedPath` | [`Path::parse`](crate::Path::parse) | `bind` / `listen` / `validate` caller |
//! | `PathConflict` | [`resolve::set`](crate::resolve::set) | the writer (node write or control report) |
//! | `IndexOutOfRange` | [`resolve::set`](crate::resolve::set) | the writer |
//! | `NotBound` | session operations while unbound | caller |
//! | `DoubleBind` | `bind` while bound | caller |
//! | `InvalidPattern` | [`Pattern::regex`](crate::Pattern::regex) | caller |
//! | `RecursionLimit` | re-entrant dispatch | innermost writer |
//! | `InvalidRoot` | `bind` with a scalar model | caller |
//!
//! A validator veto is *not* an error.

use thiserror::Error;

/// Result alias for Tether operations.
pub type BindResult<T> = Result<T, BindError>;

/// Errors produced by the binding engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A path string could not be parsed.
    #[error("malformed path '{raw}': {reason}")]
    MalformedPath {
        /// The offending input.
        raw: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// An intermediate location exists but cannot be descended into.
    #[error("path conflict at '{path}': cannot descend into {found}")]
    PathConflict {
        /// Canonical path of the blocking location.
        path: String,
        /// JSON type name of the value found there.
        found: &'static str,
    },

    /// An array index lies too far past the end of its array.
    #[error("index {index} at '{path}' is too far past the end of an array of length {len}")]
    IndexOutOfRange {
        /// Canonical path of the array.
        path: String,
        /// The requested index.
        index: usize,
        /// Length of the array at the time of the write.
        len: usize,
    },

    /// The session has no bound root.
    #[error("session is not bound")]
    NotBound,

    /// `bind` was called on a session that is already bound.
    #[error("session is already bound; call unbind first")]
    DoubleBind,

    /// A regular expression pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Re-entrant writes nested deeper than the configured limit.
    #[error("dispatch depth {depth} exceeds the configured limit")]
    RecursionLimit {
        /// Depth reached when the write was refused.
        depth: usize,
    },

    /// The model handed to `bind` is not an object or array.
    #[error("bound root must be an object or array, found {found}")]
    InvalidRoot {
        /// JSON type name of the rejected model.
        found: &'static str,
    },
}

impl BindError {
    #[inline]
    pub fn malformed(raw: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedPath {
            raw: raw.into(),
            reason,
        }
    }

    #[inline]
    pub fn conflict(path: impl Into<String>, found: &'static str) -> Self {
        Self::PathConflict {
            path: path.into(),
            found,
        }
    }
}

/// JSON type name used in error messages.
#[must_use]
pub fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
