//! Labeling throughput over synthetic forests shaped like a country
//! dump: one root, a layer of regions, a layer of cities under each.

use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use geotree::record::{level, GeoRecord};
use geotree::store::{GeoStore, MemoryStore};
use geotree::{label_forest, rebuild_tree};

fn make_record(id: u32, parent: Option<u32>, lvl: &str) -> GeoRecord {
    GeoRecord {
        id,
        parent_id: parent,
        left: None,
        right: None,
        depth: 0,
        name: format!("place-{}", id),
        alternate_names: vec![],
        country: None,
        a1code: None,
        level: lvl.to_string(),
        population: 0,
        lat: 0.0,
        long: 0.0,
        timezone: None,
    }
}

/// One country, `regions` ADM1 children, `cities` PPLA under each.
fn synthetic_forest(regions: u32, cities: u32) -> Vec<GeoRecord> {
    let mut records = vec![make_record(1, None, level::COUNTRY)];
    let mut next_id = 2;
    for _ in 0..regions {
        let region_id = next_id;
        next_id += 1;
        records.push(make_record(region_id, Some(1), level::ADM1));
        for _ in 0..cities {
            records.push(make_record(next_id, Some(region_id), level::PPLA));
            next_id += 1;
        }
    }
    records
}

fn adjacency(
    records: &[GeoRecord],
) -> (HashMap<u32, usize>, HashMap<u32, Vec<u32>>) {
    let index: HashMap<u32, usize> = records
        .iter()
        .enumerate()
        .map(|(slot, r)| (r.id, slot))
        .collect();
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for r in records {
        if let Some(parent) = r.parent_id {
            children.entry(parent).or_default().push(r.id);
        }
    }
    (index, children)
}

fn bench_label_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_forest");
    for (regions, cities) in [(10, 100), (100, 100), (100, 1000)] {
        let records = synthetic_forest(regions, cities);
        let (index, children) = adjacency(&records);
        group.bench_with_input(
            BenchmarkId::from_parameter(records.len()),
            &records,
            |b, records| {
                b.iter_batched(
                    || records.clone(),
                    |mut records| label_forest(&mut records, &index, &children, 1),
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let records = synthetic_forest(100, 100);
    c.bench_function("rebuild_tree_10k", |b| {
        b.iter_batched(
            || {
                let mut store = MemoryStore::new();
                store.set_reference_checks(false).unwrap();
                store.insert_batch(records.clone()).unwrap();
                store.set_reference_checks(true).unwrap();
                store
            },
            |mut store| rebuild_tree(&mut store),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_label_forest, bench_rebuild);
criterion_main!(benches);
