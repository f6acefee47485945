use criterion::{black_box, criterion_group, criterion_main, Criterion};
use report_viewer::data::data_view::DataView;
use report_viewer::data::datatable::{ColumnDescriptor, ColumnKind, DataRow, Dataset};
use std::sync::Arc;

fn create_test_data(rows: usize) -> Dataset {
    let regions = [
        "North Europe",
        "South Europe",
        "North America",
        "South America",
        "Asia Pacific",
        "Middle East",
    ];

    Dataset::new("bench.csv")
        .with_columns([
            ColumnDescriptor::new("region").with_kind(ColumnKind::Text),
            ColumnDescriptor::new("amount").with_kind(ColumnKind::Number),
            ColumnDescriptor::new("status"),
        ])
        .with_rows((0..rows).map(|i| {
            DataRow::new()
                .with("region", regions[i % regions.len()])
                .with("amount", ((i * 7919) % 10_007) as f64 / 3.0)
                .with("status", format!("STATUS_{}", i % 5))
        }))
}

fn benchmark_filter(c: &mut Criterion) {
    let table_10k = Arc::new(create_test_data(10_000));
    let table_100k = Arc::new(create_test_data(100_000));

    let mut group = c.benchmark_group("view_filter");

    group.bench_function("10k_rows", |b| {
        let mut view = DataView::new(table_10k.clone());
        b.iter(|| {
            view.set_filter("region", black_box("north")).unwrap();
            view.set_filter("region", "").unwrap();
        });
    });

    group.bench_function("100k_rows", |b| {
        let mut view = DataView::new(table_100k.clone());
        b.iter(|| {
            view.set_filter("region", black_box("north")).unwrap();
            view.set_filter("region", "").unwrap();
        });
    });

    group.finish();
}

fn benchmark_filter_and_sort(c: &mut Criterion) {
    let table_10k = Arc::new(create_test_data(10_000));
    let table_100k = Arc::new(create_test_data(100_000));

    let mut group = c.benchmark_group("view_filter_sort");

    // Sorting toggles direction on every call, so each iteration re-sorts
    group.bench_function("10k_rows", |b| {
        let mut view = DataView::new(table_10k.clone());
        view.set_filter("status", "status_1").unwrap();
        b.iter(|| {
            view.set_sort(black_box("amount")).unwrap();
            black_box(view.get_view());
        });
    });

    group.bench_function("100k_rows", |b| {
        let mut view = DataView::new(table_100k.clone());
        view.set_filter("status", "status_1").unwrap();
        b.iter(|| {
            view.set_sort(black_box("amount")).unwrap();
            black_box(view.get_view());
        });
    });

    group.bench_function("100k_rows_text_sort", |b| {
        let mut view = DataView::new(table_100k.clone());
        b.iter(|| {
            view.set_sort(black_box("region")).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_filter, benchmark_filter_and_sort);
criterion_main!(benches);
