//! Benchmark for synthetic checkpoint construction
//!
//! Measures layout planning alone and full builds (layout + randn fill).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fluxflow_fixtures::checkpoint::plan_layout;
use fluxflow_fixtures::{CheckpointBuilder, FluxFlowDims};

fn benchmark_plan_layout(c: &mut Criterion) {
    let dims = FluxFlowDims::default();
    c.bench_function("plan_layout_default", |b| {
        b.iter(|| plan_layout(black_box(&dims)).unwrap());
    });
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkpoint_build");

    for blocks in [2usize, 8, 32].iter() {
        let dims = FluxFlowDims {
            flow_transformer_layers: *blocks,
            ..FluxFlowDims::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &dims, |b, dims| {
            let builder = CheckpointBuilder::new(*dims).with_seed(42);
            b.iter(|| {
                let state = builder.build().unwrap();
                black_box(state)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_plan_layout, benchmark_build);
criterion_main!(benches);
