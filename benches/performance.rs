//! Performance benchmarks for Sunbeam.
//!
//! Run with: cargo bench
//!
//! Target performance:
//! - Filtering 1000 items: < 5ms per keystroke
//! - Schema validation of a list: < 1ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sunbeam::extensions::schema::{decode_list, validate, DocumentKind};
use sunbeam::extensions::{List, ListItem};
use sunbeam::Filter;

fn items(count: usize) -> Vec<ListItem> {
    (0..count)
        .map(|i| ListItem {
            title: format!("Repository {} - sunbeam extension", i),
            subtitle: Some(format!("owner-{}", i % 17)),
            id: Some(format!("repo-{}", i)),
            accessories: vec![format!("{} stars", i * 3)],
            ..ListItem::default()
        })
        .collect()
}

/// Benchmark ranking the full item set against a query.
fn bench_filter_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_query");

    for count in [200, 1000] {
        let queries = ["rep", "ext", "repository 50", "owner-3 stars"];
        for query in queries {
            let id = format!("{}/{}", count, query);
            group.bench_with_input(BenchmarkId::from_parameter(id), &query, |b, query| {
                let mut filter = Filter::new();
                filter.set_items(items(count));
                b.iter(|| {
                    filter.set_query(black_box(query));
                    black_box(filter.len());
                    filter.set_query("");
                })
            });
        }
    }

    group.finish();
}

/// Benchmark typing a query one character at a time.
fn bench_incremental_typing(c: &mut Criterion) {
    let mut filter = Filter::new();
    filter.set_items(items(1000));
    let query = "repository 99";

    c.bench_function("filter_incremental_typing", |b| {
        b.iter(|| {
            for end in 1..=query.len() {
                filter.set_query(&query[..end]);
            }
            black_box(filter.selection().map(|item| item.title.len()));
            filter.set_query("");
        })
    });
}

/// Benchmark replacing the items of a live list.
fn bench_set_items(c: &mut Criterion) {
    let mut filter = Filter::new();
    filter.set_items(items(1000));
    filter.set_query("sunbeam");

    c.bench_function("filter_set_items", |b| {
        b.iter(|| {
            filter.set_items(items(1000));
            black_box(filter.len())
        })
    });
}

/// Benchmark validating and decoding a list document.
fn bench_decode_list(c: &mut Criterion) {
    let list = List {
        items: items(200),
        ..List::default()
    };
    let bytes = serde_json::to_vec(&list).expect("list serializes");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");

    let mut group = c.benchmark_group("schema");
    group.bench_function("validate_list", |b| {
        b.iter(|| black_box(validate(DocumentKind::List, black_box(&value)).is_ok()))
    });
    group.bench_function("decode_list", |b| {
        b.iter(|| black_box(decode_list(black_box(&bytes)).map(|l| l.items.len())))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_filter_query,
    bench_incremental_typing,
    bench_set_items,
    bench_decode_list,
);

criterion_main!(benches);
