// packages/responsemock/benches/parse_bench.rs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use responsemock::interception::RoutingTable;
use responsemock::rules::{parse_bytes, parse_text, split_rules};

const ONELINE: &str = "GET http://yandex.ru -> 200 :Nice";

const HEADER_BLOCK: &str = "
    GET http://yandex.ru

    Content-Type: image/png
    Cache-Control: no-cache,no-store,max-age=0,must-revalidate
    Set-Cookie: key1=val1

    -> 200 :Nicer
";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("oneline_text", |b| {
        b.iter(|| parse_text(black_box(ONELINE)))
    });
    group.bench_function("oneline_bytes", |b| {
        b.iter(|| parse_bytes(black_box(ONELINE.as_bytes())))
    });
    group.bench_function("header_block", |b| {
        b.iter(|| parse_text(black_box(HEADER_BLOCK)))
    });

    group.finish();
}

fn bench_rule_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_file");

    for count in [10usize, 100, 1000] {
        let contents: Vec<String> = (0..count)
            .map(|i| format!("GET http://a.b/items/{} -> 200 :item {}", i, i))
            .collect();
        let contents = contents.join("\n---\n");

        group.bench_with_input(BenchmarkId::from_parameter(count), &contents, |b, contents| {
            b.iter(|| split_rules(black_box(contents)).directives())
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [10usize, 100, 1000] {
        let directives = (0..count)
            .map(|i| format!("GET http://a.b/items/{} -> 200 :item", i))
            .filter_map(|rule| parse_text(&rule).ok().flatten())
            .collect::<Vec<_>>();

        group.bench_with_input(BenchmarkId::from_parameter(count), &directives, |b, directives| {
            b.iter_batched(
                || {
                    let mut table = RoutingTable::new(false);
                    for directive in directives {
                        table.add_route(directive.clone());
                    }
                    table
                },
                |mut table| table.lookup("GET", black_box("http://a.b/items/0")),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_rule_file, bench_lookup);
criterion_main!(benches);
