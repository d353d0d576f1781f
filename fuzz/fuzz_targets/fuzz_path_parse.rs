#![no_main]

use libfuzzer_sys::fuzz_target;
use tether_core::{Path, Pattern, json, resolve};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if raw.len() > 512 {
        return;
    }

    if let Ok(path) = Path::parse(raw) {
        // Canonical form must reparse to the same path.
        let reparsed = Path::parse(&path.to_string()).expect("canonical path reparses");
        assert_eq!(reparsed, path);

        // Writes either fail without side effects or become readable.
        let mut doc = json!({ "a": 1, "b": [true] });
        let before = doc.clone();
        match resolve::set(&mut doc, &path, json!("x")) {
            Ok(_) => assert_eq!(resolve::get(&doc, &path), Some(&json!("x"))),
            Err(_) => assert_eq!(doc, before),
        }
    }

    let _ = Pattern::regex(raw).and_then(Pattern::compile);
});
