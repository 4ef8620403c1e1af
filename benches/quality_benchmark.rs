use criterion::{black_box, criterion_group, criterion_main, Criterion};
use omics_simulator::application::quality::{QualityReport, DEFAULT_ALPHA};
use omics_simulator::application::simulator::MultiOmicsSimulator;
use omics_simulator::domain::stats::{benjamini_hochberg, welch_t_test};
use omics_simulator::domain::SimulationConfig;

fn quality_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quality metrics");
    group.sample_size(10);

    let dataset = MultiOmicsSimulator::new(SimulationConfig::default())
        .unwrap()
        .simulate()
        .unwrap();

    group.bench_function("report for default dataset", |b| {
        b.iter(|| black_box(QualityReport::compute(&dataset, DEFAULT_ALPHA)));
    });

    let a: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin()).collect();
    let bvals: Vec<f64> = (0..100).map(|i| (i as f64 * 0.53).cos() + 0.5).collect();
    group.bench_function("welch t-test 100 vs 100", |b| {
        b.iter(|| black_box(welch_t_test(black_box(&a), black_box(&bvals))));
    });

    let p: Vec<f64> = (1..=5000).map(|i| (i as f64 / 5001.0).powi(2)).collect();
    group.bench_function("benjamini-hochberg 5000", |b| {
        b.iter(|| black_box(benjamini_hochberg(black_box(&p))));
    });

    group.finish();
}

criterion_group!(benches, quality_benchmark);
criterion_main!(benches);
