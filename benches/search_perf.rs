//! Criterion benchmarks for the search path.
//!
//! Covers index construction, ranked queries with and without filters, and
//! highlighting of result titles.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use homeguide::core::{Category, Difficulty, Guide, fallback_guides};
use homeguide::search::{FilterSet, SearchIndex, highlight};

const WORDS: [&str; 12] = [
    "drain", "faucet", "leak", "pipe", "valve", "filter", "gutter", "outlet", "breaker", "caulk",
    "window", "thermostat",
];

const CATEGORIES: [Category; 4] = [
    Category::Kitchen,
    Category::Bathroom,
    Category::Outdoor,
    Category::Emergency,
];

fn synthetic_guides(count: usize) -> Vec<Guide> {
    (0..count)
        .map(|i| {
            let word = WORDS[i % WORDS.len()];
            let other = WORDS[(i * 7 + 3) % WORDS.len()];
            Guide {
                id: format!("guide-{i}"),
                title: format!("Fix the {word} near the {other}"),
                description: format!("How to repair a broken {word} quickly"),
                content: format!("Inspect the {word}. Replace the {other} if worn. Test again."),
                category: CATEGORIES[i % CATEGORIES.len()].clone(),
                difficulty: Difficulty::Medium,
                time_estimate: "30 minutes".to_string(),
                tools: vec!["wrench".to_string()],
                keywords: vec![word.to_string(), other.to_string()],
            }
        })
        .collect()
}

fn index_build_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    let built_in = fallback_guides();
    group.throughput(Throughput::Elements(built_in.len() as u64));
    group.bench_function("built_in", |b| {
        b.iter(|| SearchIndex::build(black_box(built_in.clone())))
    });

    for size in [100, 1000] {
        let guides = synthetic_guides(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("synthetic", size), &guides, |b, guides| {
            b.iter(|| SearchIndex::build(black_box(guides.clone())))
        });
    }
    group.finish();
}

fn query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let all = FilterSet::all();
    let kitchen = FilterSet::only("kitchen");

    for size in [100, 1000] {
        let index = SearchIndex::build(synthetic_guides(size));
        group.bench_with_input(BenchmarkId::new("single_token", size), &index, |b, index| {
            b.iter(|| index.query(black_box("drain"), &all).len())
        });
        group.bench_with_input(BenchmarkId::new("partial_token", size), &index, |b, index| {
            b.iter(|| index.query(black_box("fau"), &all).len())
        });
        group.bench_with_input(BenchmarkId::new("multi_token_filtered", size), &index, |b, index| {
            b.iter(|| index.query(black_box("leaky pipe valve"), &kitchen).len())
        });
    }
    group.finish();
}

fn highlight_benchmarks(c: &mut Criterion) {
    let titles: Vec<String> = synthetic_guides(100).into_iter().map(|g| g.title).collect();
    c.bench_function("highlight_100_titles", |b| {
        b.iter(|| {
            titles
                .iter()
                .map(|title| highlight(black_box(title), "drain pipe"))
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, index_build_benchmarks, query_benchmarks, highlight_benchmarks);
criterion_main!(benches);
