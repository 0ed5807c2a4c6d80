//! Pattern matcher benchmarks.
//!
//! Matching runs once per descriptor per page load, so per-call cost is what
//! matters; compilation happens once per pattern at manifest load.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use url::Url;

use viewbridge::MatchPattern;

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_glob_pattern", |b| {
        b.iter(|| MatchPattern::new(black_box("https://*.example.com/app/*")))
    });
}

fn bench_match(c: &mut Criterion) {
    let all_urls = MatchPattern::new("<all_urls>");
    let glob = MatchPattern::new("https://*.example.com/app/*");
    let url = Url::parse("https://sub.example.com/app/dashboard").unwrap();

    c.bench_function("match_all_urls", |b| {
        b.iter(|| black_box(&all_urls).matches(black_box(&url)))
    });

    c.bench_function("match_glob", |b| {
        b.iter(|| black_box(&glob).matches(black_box(&url)))
    });

    let patterns: Vec<MatchPattern> = (0..50)
        .map(|i| MatchPattern::new(format!("https://site{i}.example.com/*")))
        .chain(std::iter::once(MatchPattern::new(
            "https://sub.example.com/*",
        )))
        .collect();

    c.bench_function("match_descriptor_list", |b| {
        b.iter(|| MatchPattern::any_matches(black_box(&patterns), black_box(&url)))
    });
}

criterion_group!(benches, bench_compile, bench_match);
criterion_main!(benches);
