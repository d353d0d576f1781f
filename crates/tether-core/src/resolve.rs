#![forbid(unsafe_code)]

//! Get/set traversal of a `serde_json::Value` graph by [`Path`].
//!
//! Reads never create anything. Writes create missing intermediate containers:
//! an array when the *next* segment is an index, an object otherwise. A
//! `null` intermediate counts as missing and is replaced by a container.
//!
//! # Failure Modes
//!
//! | Situation | `get` | `set` |
//! |-----------|-------|-------|
//! | Missing intermediate | `None` | container created |
//! | Scalar intermediate | `None` | `PathConflict` |
//! | Field segment on an array | `None` | `PathConflict` |
//! | Index past array end | `None` | array padded with `null` |
//! | Index more than [`MAX_INDEX_GAP`] past the end | `None` | `IndexOutOfRange` |

use serde_json::{Map, Value};

use crate::error::{BindError, BindResult, type_name};
use crate::path::{Path, Segment};

/// How far past the end of an array a write may land. The gap is filled
/// with `null`.
pub const MAX_INDEX_GAP: usize = 1024;

/// Resolve `path` against `root`.
#[must_use]
pub fn get<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = root;
    for seg in path.segments() {
        current = step(current, seg)?;
    }
    Some(current)
}

fn step<'a>(current: &'a Value, seg: &Segment) -> Option<&'a Value> {
    match (current, seg) {
        (Value::Object(map), seg) => map.get(seg.as_key().as_ref()),
        (Value::Array(arr), Segment::Index(idx)) => arr.get(*idx),
        _ => None,
    }
}

/// Write `value` at `path`, returning the value it replaced.
///
/// `Ok(None)` means the location did not exist before the write.
///
/// # Errors
///
/// [`BindError::PathConflict`] when an existing intermediate cannot hold the
/// next segment, [`BindError::IndexOutOfRange`] when an index lies more than
/// [`MAX_INDEX_GAP`] past the end of its array. The graph is left untouched
/// in both cases.
pub fn set(root: &mut Value, path: &Path, value: Value) -> BindResult<Option<Value>> {
    check(root, path)?;
    Ok(set_at(root, path.segments(), value))
}

/// Empty container suited to hold `next`.
fn container_for(next: &Segment) -> Value {
    if next.is_index() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Report whether [`set`] at `path` would conflict, without writing.
///
/// `set` runs this over the whole walk before mutating so a conflict never
/// leaves half-created intermediates behind.
///
/// # Errors
///
/// [`BindError::PathConflict`] or [`BindError::IndexOutOfRange`], naming the
/// blocking prefix.
pub fn check(root: &Value, path: &Path) -> BindResult<()> {
    let segments = path.segments();
    let mut current = Some(root);
    for (consumed, seg) in segments.iter().enumerate() {
        let prefix = || Path::from_segments(segments[..consumed].iter().cloned()).to_string();
        current = match (current, seg) {
            // Missing or null: `set` creates an empty container here.
            (None | Some(Value::Null), Segment::Index(idx)) => {
                check_gap(*idx, 0, prefix)?;
                None
            }
            (None | Some(Value::Null), Segment::Field(_)) => None,
            (Some(Value::Object(map)), seg) => map.get(seg.as_key().as_ref()),
            (Some(Value::Array(arr)), Segment::Index(idx)) => {
                check_gap(*idx, arr.len(), prefix)?;
                arr.get(*idx)
            }
            (Some(other), _) => return Err(BindError::conflict(prefix(), type_name(other))),
        };
    }
    Ok(())
}

fn check_gap(index: usize, len: usize, prefix: impl FnOnce() -> String) -> BindResult<()> {
    if index.saturating_sub(len) > MAX_INDEX_GAP {
        return Err(BindError::IndexOutOfRange {
            path: prefix(),
            index,
            len,
        });
    }
    Ok(())
}

fn set_at(current: &mut Value, segments: &[Segment], value: Value) -> Option<Value> {
    let Some((seg, rest)) = segments.split_first() else {
        return Some(std::mem::replace(current, value));
    };

    if current.is_null() {
        *current = container_for(seg);
    }

    match current {
        Value::Object(map) => {
            let key = seg.as_key().into_owned();
            if rest.is_empty() {
                return map.insert(key, value);
            }
            let child = map.entry(key).or_insert(Value::Null);
            set_at(child, rest, value)
        }
        Value::Array(arr) => {
            // Field-on-array was rejected by check.
            let Segment::Index(idx) = seg else {
                return None;
            };
            let existed = *idx < arr.len();
            if !existed {
                let needed = idx.checked_add(1)?;
                arr.resize(needed, Value::Null);
            }
            if rest.is_empty() {
                let old = std::mem::replace(&mut arr[*idx], value);
                return existed.then_some(old);
            }
            set_at(&mut arr[*idx], rest, value)
        }
        // Scalars were rejected by check.
        _ => None,
    }
}
