//! Everything a typical binding needs.

pub use crate::{
    BindError, BindResult, BindingSession, ChangeEvent, ChangeOrigin, Control, ControlKind,
    ControlSet, ControlValue, Node, Pattern, PatternMatch, SessionConfig, Value, WriteOutcome,
    WriteStatus, json,
};
