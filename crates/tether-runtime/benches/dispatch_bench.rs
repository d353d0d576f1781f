//! Benchmarks for the write pipeline.
//!
//! Run with: cargo bench -p tether-runtime --bench dispatch_bench
//!
//! Scenarios:
//! - Model write with N listeners and no controls
//! - Model write syncing N controls at overlapping paths
//! - User edit through a text control
//! - Vetoed write (validator rejects, control re-pushed)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tether_core::{Pattern, json};
use tether_harness::{Form, fixtures};

// =============================================================================
// Model writes
// =============================================================================

fn bench_listener_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/listeners");

    for listeners in [0usize, 1, 8, 64] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(listeners),
            &listeners,
            |b, &listeners| {
                let session = Form::new().session();
                let root = session.bind(fixtures::skills()).unwrap();
                for _ in 0..listeners {
                    session
                        .listen(Pattern::regex(r"skills\.(.*)\.day").unwrap(), |e, m| {
                            black_box((e, m));
                        })
                        .unwrap();
                }
                let day = root.at("skills.programming.day").unwrap();
                let mut n = 0i64;
                b.iter(|| {
                    n += 1;
                    black_box(day.assign(n).unwrap());
                })
            },
        );
    }

    group.finish();
}

fn bench_control_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/controls");

    for controls in [1usize, 16, 128] {
        group.bench_with_input(
            BenchmarkId::from_parameter(controls),
            &controls,
            |b, &controls| {
                let form = Form::new();
                for i in 0..controls {
                    form.span(&format!("stats.s{}", i % 4));
                }
                let session = form.session();
                let root = session
                    .bind(json!({ "stats": { "s0": 0, "s1": 0, "s2": 0, "s3": 0 } }))
                    .unwrap();
                let mut n = 0i64;
                b.iter(|| {
                    n += 1;
                    black_box(root.set_path("stats.s0", n).unwrap());
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// Control edits
// =============================================================================

fn bench_user_edit(c: &mut Criterion) {
    c.bench_function("dispatch/user_edit_numeric", |b| {
        let form = Form::new();
        let level = form.text("level");
        let session = form.session();
        session.bind(fixtures::character()).unwrap();
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            black_box(level.type_text(n.to_string()));
        })
    });
}

fn bench_veto(c: &mut Criterion) {
    c.bench_function("dispatch/veto", |b| {
        let form = Form::new();
        let name = form.text("name");
        let session = form.session();
        session.bind(fixtures::character()).unwrap();
        session.validate("name", |_, _| false).unwrap();
        b.iter(|| black_box(name.type_text("Steve")))
    });
}

criterion_group!(
    benches,
    bench_listener_fanout,
    bench_control_sync,
    bench_user_edit,
    bench_veto
);
criterion_main!(benches);
