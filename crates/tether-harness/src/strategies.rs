#![forbid(unsafe_code)]

//! `proptest` strategies for paths and model values.

use proptest::prelude::*;
use tether_core::{Path, Segment, Value};

/// A field name: starts with a letter, no dots.
pub fn field() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,7}"
}

/// A field or a small index.
pub fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        3 => field().prop_map(Segment::Field),
        1 => (0usize..4).prop_map(Segment::Index),
    ]
}

/// A non-root path of up to `max_len` segments whose first segment is a
/// field, so it can be written into an object root.
pub fn path(max_len: usize) -> impl Strategy<Value = Path> {
    (field(), prop::collection::vec(segment(), 0..max_len.max(1))).prop_map(|(head, tail)| {
        let mut segments = vec![Segment::Field(head)];
        segments.extend(tail);
        Path::from_segments(segments)
    })
}

/// Scalars a control can round-trip: strings, integers and booleans.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z ]{0,12}".prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}
