//! 쿼리 엔진 벤치마크
//!
//! 쿼리 컴파일, 텀 수별 평가, 와일드카드 매칭, 부분 문자열 검색을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logsift_core::types::AccessRecord;
use logsift_pipeline::query::{substring_match, wildcard_match, Query};

fn sample_record() -> AccessRecord {
    AccessRecord::new(
        "2024-01-15T12:00:00",
        "10.0.0.42",
        "POST",
        "/api/v1/users/login?next=/dashboard",
        503,
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)",
    )
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_compile");

    group.bench_function("single_term", |b| {
        b.iter(|| Query::compile(black_box("status>=500"), false).unwrap())
    });

    group.bench_function("five_terms", |b| {
        b.iter(|| {
            Query::compile(
                black_box(r#"status>=500 method:POST url:*login* ip:10.* userAgent:"*X11*""#),
                false,
            )
            .unwrap()
        })
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let record = sample_record();

    let mut group = c.benchmark_group("query_evaluate");
    group.throughput(Throughput::Elements(1));

    let queries = [
        ("numeric", "status>=500"),
        ("substring", "url:login"),
        ("wildcard", "url:*users*login*"),
        ("timestamp", "timestamp>=2024-01-01T00:00:00"),
        (
            "five_terms",
            "status>=500 method:POST url:*login* ip:10.* userAgent:*X11*",
        ),
        ("case_insensitive", "method:post url:*LOGIN*"),
    ];

    for (name, expr) in queries {
        let query = Query::compile(expr, name == "case_insensitive").unwrap();
        group.bench_with_input(BenchmarkId::new("query", name), &query, |b, query| {
            b.iter(|| query.evaluate(black_box(&record)))
        });
    }

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let record = sample_record();

    let mut group = c.benchmark_group("matching");

    group.bench_function("wildcard_backtracking", |b| {
        b.iter(|| {
            wildcard_match(
                black_box("*a*a*a*b"),
                black_box("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaab"),
                false,
            )
        })
    });

    group.bench_function("substring_miss", |b| {
        b.iter(|| substring_match(black_box(&record), black_box("not-present"), true))
    });

    group.bench_function("substring_hit", |b| {
        b.iter(|| substring_match(black_box(&record), black_box("gecko"), true))
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_evaluate, bench_matching);
criterion_main!(benches);
