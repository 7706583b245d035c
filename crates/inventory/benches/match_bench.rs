//! 매칭 엔진 벤치마크
//!
//! fuzzy / substring 검색, 중복 병합 성능을 측정합니다.

use std::collections::BTreeMap;

use appwarden_inventory::matcher::similarity;
use appwarden_inventory::{
    Entry, EntryKind, MatchEngine, MatchMode, Scope, SearchOptions, SourceKey, View, dedup,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const PUBLISHERS: [&str; 5] = [
    "Microsoft Corporation",
    "Google LLC",
    "Mozilla",
    "Adobe Inc.",
    "JetBrains s.r.o.",
];

const PRODUCTS: [&str; 8] = [
    "Visual Studio Code",
    "Chrome",
    "Firefox",
    "Acrobat Reader",
    "IntelliJ IDEA",
    "Teams",
    "OneDrive",
    "Runtime",
];

/// 합성 인벤토리 생성 (count개 항목)
fn generate_corpus(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| {
            let product = PRODUCTS[i % PRODUCTS.len()];
            let publisher = PUBLISHERS[i % PUBLISHERS.len()];
            let scope = match i % 3 {
                0 => Scope::Machine,
                1 => Scope::CurrentUser,
                _ => Scope::OtherUser("S-1-5-21-1-2-3-1001".to_owned()),
            };
            let view = if i % 2 == 0 { View::Bits64 } else { View::Bits32 };
            Entry {
                kind: EntryKind::Native,
                display_name: format!("{product} {}", i / 4),
                version: Some(format!("1.{}", i % 7)),
                publisher: Some(publisher.to_owned()),
                install_location: None,
                uninstall_command: None,
                source: SourceKey::registry(scope, view, format!("HKLM\\bench\\{i}")),
                is_system_component: false,
                extra: BTreeMap::new(),
            }
        })
        .collect()
}

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    group.bench_function("typo_vs_label", |b| {
        b.iter(|| similarity::similarity(black_box("chrme"), black_box("google chrome google llc")))
    });
    group.bench_function("multi_token", |b| {
        b.iter(|| {
            similarity::similarity(
                black_box("visual studio"),
                black_box("visual studio code microsoft corporation"),
            )
        })
    });

    group.finish();
}

fn bench_search_scaling(c: &mut Criterion) {
    let patterns = ["chrome", "firefx", "acrobat", "intellij"];
    let mut group = c.benchmark_group("search_scaling");

    for size in [100, 500, 2000].iter() {
        let corpus = generate_corpus(*size);
        group.throughput(Throughput::Elements(*size as u64));

        let fuzzy = MatchEngine::new(SearchOptions::default());
        group.bench_with_input(BenchmarkId::new("fuzzy", size), size, |b, _| {
            b.iter(|| fuzzy.search(black_box(&patterns), black_box(&corpus)))
        });

        let substring = MatchEngine::new(SearchOptions::default().with_mode(MatchMode::Substring));
        group.bench_with_input(BenchmarkId::new("substring", size), size, |b, _| {
            b.iter(|| substring.search(black_box(&patterns), black_box(&corpus)))
        });
    }

    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let corpus = generate_corpus(2000);
    let mut group = c.benchmark_group("dedup");
    group.throughput(Throughput::Elements(2000));

    group.bench_function("dedup_2000", |b| b.iter(|| dedup(black_box(corpus.clone()))));

    group.finish();
}

criterion_group!(benches, bench_similarity, bench_search_scaling, bench_dedup);
criterion_main!(benches);
