//! Benchmarks for a full modeling pass.
//!
//! Measures `model_database` over the shop dataset at a few sizes, and the
//! extension step alone, which dominates once child groups get large.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use seedmodel_core::modeler::{Modeler, ModelerOptions};
use seedmodel_core::navigator::DataNavigator;
use seedmodel_testutil::shop_navigator;

fn bench_model_database(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_database");
    group.sample_size(20);

    for customers in [12, 60, 240] {
        let nav = shop_navigator(customers);
        let rows: usize = nav
            .table_names()
            .iter()
            .map(|t| nav.get_data(t).map(|d| d.row_count()).unwrap_or(0))
            .sum();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("shop", customers), &nav, |b, nav| {
            let modeler: Modeler<_> = Modeler::new(nav, ModelerOptions::default());
            b.iter(|| modeler.model_database().unwrap());
        });
    }

    group.finish();
}

fn bench_build_extension(c: &mut Criterion) {
    let nav = shop_navigator(120);
    let modeler: Modeler<_> = Modeler::new(&nav, ModelerOptions::default());
    let result = modeler.model_database().unwrap();
    let children = vec!["order_items".to_string()];

    c.bench_function("build_extension/orders", |b| {
        b.iter(|| {
            modeler
                .build_extension("order_id", &children, "orders", &result)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_model_database, bench_build_extension);
criterion_main!(benches);
