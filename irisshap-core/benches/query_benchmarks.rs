use criterion::{black_box, criterion_group, criterion_main, Criterion};
use irisshap_core::canvas::{box_plot, gauge_comparison, polar_comparison, render_figure};
use irisshap_core::{
    class_distribution, record_comparison, AttributionRecord, AttributionTable, ClassLabel,
    DashboardSnapshot, NormalizationMode,
};

fn make_snapshot(rows: usize) -> DashboardSnapshot {
    let records = (0..rows)
        .map(|i| {
            let t = i as f64 / rows as f64;
            let attributions = [t - 0.5, 0.25 - t, 2.0 * t - 1.0, 1.5 - 3.0 * t];
            AttributionRecord {
                features: [5.0 + t, 3.0, 1.5 + 4.0 * t, 0.2 + t],
                attributions,
                margin: attributions.iter().sum::<f64>() - 1.0,
                shift: attributions.iter().sum(),
                probability: 0.5,
                target: if i % 3 == 1 {
                    ClassLabel::Versicolor
                } else {
                    ClassLabel::NotVersicolor
                },
            }
        })
        .collect();
    DashboardSnapshot::from_table(&AttributionTable::new(records), NormalizationMode::Shared)
}

fn bench_snapshot(c: &mut Criterion) {
    let table = make_snapshot(38).table().clone();

    c.bench_function("snapshot_from_table_38", |b| {
        b.iter(|| DashboardSnapshot::from_table(black_box(&table), NormalizationMode::Shared))
    });
}

fn bench_queries(c: &mut Criterion) {
    let snapshot = make_snapshot(38);

    c.bench_function("class_distribution", |b| {
        b.iter(|| class_distribution(black_box(&snapshot), ClassLabel::Versicolor))
    });

    c.bench_function("record_comparison", |b| {
        b.iter(|| record_comparison(black_box(&snapshot), black_box(17)))
    });

    let large = make_snapshot(10_000);
    c.bench_function("record_comparison_10k", |b| {
        b.iter(|| record_comparison(black_box(&large), black_box(9_999)))
    });
}

fn bench_charts(c: &mut Criterion) {
    let snapshot = make_snapshot(38);
    let dist = class_distribution(&snapshot, ClassLabel::NotVersicolor);
    let cmp = record_comparison(&snapshot, 5).expect("row 5 exists");

    c.bench_function("box_plot_render", |b| {
        b.iter(|| render_figure(&box_plot(black_box(&dist))))
    });

    c.bench_function("polar_and_gauge_render", |b| {
        b.iter(|| {
            let polar = render_figure(&polar_comparison(black_box(&cmp)));
            let gauge = render_figure(&gauge_comparison(black_box(&cmp)));
            (polar, gauge)
        })
    });
}

criterion_group!(benches, bench_snapshot, bench_queries, bench_charts);
criterion_main!(benches);
