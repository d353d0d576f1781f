#![forbid(unsafe_code)]

//! Engine equality rule and control value coercion.
//!
//! # Equality
//!
//! [`same_value`] decides whether a write is a no-op. It is strict and
//! non-coercing: `"10"` never equals `10`, and an absent location never equals
//! anything (not even `null`). Numbers compare by value so `10` and `10.0`
//! are the same number.
//!
//! # Coercion
//!
//! | Control kind | Graph → control | Control → graph |
//! |---|---|---|
//! | text / text area / select | stringify, absent → `""` | string, parsed to a number when the current graph value is numeric |
//! | checkbox | truthiness, absent → `false` | boolean |
//! | display | stringify, absent → `""` | one-way unless explicitly enabled |

use std::fmt;

use serde_json::{Number, Value};

/// The kinds of control the engine knows how to coerce for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Single-line text entry.
    Text,
    /// Multi-line text entry.
    TextArea,
    /// Single selection list.
    Select,
    /// Boolean toggle.
    Checkbox,
    /// Read-only display surface.
    Display,
}

impl ControlKind {
    /// Whether users can edit this kind of control.
    #[must_use]
    pub fn is_editable(self) -> bool {
        !matches!(self, Self::Display)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Display => "display",
        };
        f.write_str(name)
    }
}

/// The representation a control displays or reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlValue {
    Text(String),
    Checked(bool),
}

impl ControlValue {
    /// Text content, `None` for a checked state.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Checked(_) => None,
        }
    }

    /// Checked state, `None` for text.
    #[must_use]
    pub fn as_checked(&self) -> Option<bool> {
        match self {
            Self::Checked(on) => Some(*on),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for ControlValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ControlValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for ControlValue {
    fn from(on: bool) -> Self {
        Self::Checked(on)
    }
}

impl From<i64> for ControlValue {
    fn from(n: i64) -> Self {
        Self::Text(n.to_string())
    }
}

impl From<f64> for ControlValue {
    fn from(n: f64) -> Self {
        Self::Text(stringify(&json_number(n)))
    }
}

/// Whether writing `new` over `old` changes anything.
#[must_use]
pub fn same_value(old: Option<&Value>, new: &Value) -> bool {
    let Some(old) = old else {
        return false;
    };
    match (old, new) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => old == new,
    }
}

/// Display string for a graph value. Absent and `null` render empty.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        other => other.to_string(),
    }
}

fn format_number(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// Boolean reading of a graph value for toggles.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Coerce a graph value for display on a control of `kind`.
#[must_use]
pub fn to_control(kind: ControlKind, value: Option<&Value>) -> ControlValue {
    match kind {
        ControlKind::Checkbox => ControlValue::Checked(value.is_some_and(truthy)),
        _ => ControlValue::Text(value.map(stringify).unwrap_or_default()),
    }
}

/// Coerce a control-reported value into a graph value.
///
/// `current` is the graph value at the control's path right now; when it is a
/// number, reported text is parsed as one. Blank text becomes `0` so a
/// cleared field stays numeric; text that does not parse is kept as a string.
#[must_use]
pub fn from_control(reported: ControlValue, current: Option<&Value>) -> Value {
    match reported {
        ControlValue::Checked(on) => Value::Bool(on),
        ControlValue::Text(text) => {
            if current.is_some_and(Value::is_number) {
                parse_number(&text).unwrap_or(Value::String(text))
            } else {
                Value::String(text)
            }
        }
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Value::from(0));
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    let f = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Some(json_number(f))
}

/// JSON number for `f`, integral values stored as integers.
fn json_number(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Value::Number((f as i64).into());
    }
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}
