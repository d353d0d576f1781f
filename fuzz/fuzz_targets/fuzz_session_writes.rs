#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tether_core::{Path, Segment, Value, json};
use tether_runtime::BindingSession;

#[derive(Arbitrary, Debug)]
enum FuzzSegment {
    Field(u8),
    Index(u8),
}

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i32),
    Text(u8),
    Object,
    Array,
}

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Write { path: Vec<FuzzSegment>, value: FuzzValue },
    Veto { field: u8 },
    Listen { field: u8 },
}

fn segment(seg: &FuzzSegment) -> Segment {
    match seg {
        FuzzSegment::Field(n) => Segment::Field(format!("f{}", n % 4)),
        FuzzSegment::Index(n) => Segment::Index(usize::from(n % 4)),
    }
}

fn value(v: &FuzzValue) -> Value {
    match v {
        FuzzValue::Null => Value::Null,
        FuzzValue::Bool(b) => json!(b),
        FuzzValue::Int(n) => json!(n),
        FuzzValue::Text(n) => json!(format!("t{n}")),
        FuzzValue::Object => json!({}),
        FuzzValue::Array => json!([]),
    }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let session = BindingSession::default();
    let Ok(root) = session.bind(json!({})) else {
        return;
    };

    for op in ops.iter().take(64) {
        match op {
            FuzzOp::Write { path, value: v } => {
                let mut segments: Vec<Segment> = path.iter().take(6).map(segment).collect();
                if segments.is_empty() {
                    segments.push(Segment::Field("f0".to_owned()));
                }
                let path = Path::from_segments(segments);
                let _ = root.join(&path).assign(value(v));
            }
            FuzzOp::Veto { field } => {
                let _ = session.validate(format!("f{}", field % 4), |_, _| false);
            }
            FuzzOp::Listen { field } => {
                let r = root.clone();
                let _ = session.listen(format!("f{}", field % 4), move |event, _| {
                    // Nested writes exercise the depth guard.
                    let _ = r.set("f3", event.new_value().clone());
                });
            }
        }
    }

    let model = session.unbind().expect("session stays bound");
    assert!(model.is_object());
});
