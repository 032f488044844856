//! Range translation and manifest normalization benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use indexmap::IndexMap;
use nodelift_benchmarks::criterion_config;
use nodelift_build::normalize_manifest;
use nodelift_config::json::parse_manifest;
use nodelift_semver::{normalize_dependencies, translate};

const RANGES: &[&str] = &[
    "^1.2.3",
    ">=1.2.3 <2.0.0",
    ">=1.2.0 <1.3.0",
    "~0.4.1",
    "1.x",
    "<2.0.0",
    "1.2.3 - 1.2.3",
    "*",
    "latest",
    ">=0.10.0 <0.11.0",
];

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    group.throughput(Throughput::Elements(RANGES.len() as u64));

    group.bench_function("mixed_ranges", |b| {
        b.iter(|| {
            for range in RANGES {
                let _ = black_box(translate(black_box(range)));
            }
        });
    });

    group.finish();
}

fn dependency_map(count: usize) -> IndexMap<String, String> {
    (0..count)
        .map(|i| {
            let specifier = match i % 4 {
                0 => RANGES[i % RANGES.len()].to_string(),
                1 => format!("owner/repo{}#v1.{}.0", i, i),
                2 => format!("git+https://github.com/owner/repo{}.git", i),
                _ => format!("{}.x", i % 5),
            };
            (format!("dep-{}", i), specifier)
        })
        .collect()
}

fn bench_normalize_dependencies(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_dependencies");

    for count in [10, 100, 500] {
        let deps = dependency_map(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("entries", count), &deps, |b, deps| {
            b.iter(|| black_box(normalize_dependencies(deps)));
        });
    }

    group.finish();
}

fn bench_normalize_manifest(c: &mut Criterion) {
    let dependencies: Vec<String> = dependency_map(50)
        .into_iter()
        .map(|(name, specifier)| format!("\"{}\": \"{}\"", name, specifier))
        .collect();
    let content = format!(
        r#"{{
  "name": "bench-package",
  "version": "1.0.0",
  "main": "./lib/index.js",
  "dependencies": {{ {} }},
  "browser": {{ "./lib/node.js": "./lib/browser.js", "fs": false, "ws": "./lib/ws-shim.js" }},
  "files": ["lib"]
}}"#,
        dependencies.join(", ")
    );

    c.bench_function("normalize_manifest", |b| {
        b.iter(|| {
            let manifest = parse_manifest(black_box(&content)).unwrap();
            black_box(normalize_manifest(manifest).unwrap())
        });
    });
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_translate, bench_normalize_dependencies, bench_normalize_manifest
}
criterion_main!(benches);
