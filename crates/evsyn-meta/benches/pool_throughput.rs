use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evsyn_core::EffectSizeRecord;
use evsyn_meta::{analyze, compare_by_subgroup, eggers_test_records, pool};

fn corpus(n: usize) -> Vec<EffectSizeRecord> {
    (0..n)
        .map(|idx| {
            let x = idx as f64;
            let effect = 0.3 + 0.25 * (x * 0.7).sin();
            let se = 0.05 + 0.02 * (idx % 7) as f64;
            EffectSizeRecord::new(effect, se)
                .expect("record")
                .with_label(format!("Study {idx}"))
                .with_subgroup(if idx % 3 == 0 { "rural" } else { "urban" })
        })
        .collect()
}

fn pool_benchmark(c: &mut Criterion) {
    let records = corpus(200);
    c.bench_function("pool_200", |b| {
        b.iter(|| pool(black_box(&records)).expect("pool"));
    });
    c.bench_function("subgroup_200", |b| {
        b.iter(|| compare_by_subgroup(black_box(&records)).expect("subgroup"));
    });
    c.bench_function("egger_200", |b| {
        b.iter(|| eggers_test_records(black_box(&records)));
    });

    let small = corpus(40);
    c.bench_function("sensitivity_40", |b| {
        b.iter(|| analyze(black_box(&small)).expect("sensitivity"));
    });
}

criterion_group!(benches, pool_benchmark);
criterion_main!(benches);
