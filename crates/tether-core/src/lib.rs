#![forbid(unsafe_code)]

//! Core data types for Tether: paths, graph resolution, patterns, coercion
//! and change events.
//!
//! Nothing here holds state; the stateful engine lives in `tether-runtime`.

pub mod error;
pub mod event;
pub mod path;
pub mod pattern;
pub mod resolve;
pub mod value;

pub use error::{BindError, BindResult};
pub use event::{ChangeEvent, ChangeOrigin, ControlId};
pub use path::{Path, Segment};
pub use pattern::{Hit, Matcher, Pattern, PatternMatch};
pub use value::{ControlKind, ControlValue};

/// Re-exported so callers can build models without a direct dependency.
pub use serde_json::{Value, json};
