use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use streamld::jsonld::{quads_from_slice, tokenize_all, ParserOptions};

/// A root array of `size` people, each knowing the previous one
fn people(size: usize) -> Vec<u8> {
    let mut doc = String::from("[");
    for i in 0..size {
        if i > 0 {
            doc.push(',');
        }
        doc.push_str(&format!(
            r#"{{"@context": {{"@vocab": "http://schema.org/", "knows": {{"@type": "@id"}}}},
               "@id": "http://example.org/person/{i}", "@type": "Person",
               "name": "Person {i}", "age": {age}, "knows": "http://example.org/person/{prev}",
               "address": {{"streetAddress": "{i} Main St", "postalCode": "{i:05}"}}}}"#,
            i = i,
            age = i % 100,
            prev = i.saturating_sub(1),
        ));
    }
    doc.push(']');
    doc.into_bytes()
}

/// Benchmark raw tokenizer throughput
fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    for size in [100, 1000, 10_000].iter() {
        let input = people(*size);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| tokenize_all(input).unwrap().len());
        });
    }
    group.finish();
}

/// Benchmark full expansion with and without the streaming profile
fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");
    for size in [100, 1000, 10_000].iter() {
        let input = people(*size);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("tolerant", size), &input, |b, input| {
            b.iter(|| quads_from_slice(input, ParserOptions::default()).unwrap().len());
        });
        group.bench_with_input(BenchmarkId::new("streaming", size), &input, |b, input| {
            let options = ParserOptions::default().with_streaming_profile(true);
            b.iter(|| quads_from_slice(input, options.clone()).unwrap().len());
        });
    }
    group.finish();
}

/// Benchmark long lists
fn bench_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("lists");
    for size in [1000, 100_000].iter() {
        let items: Vec<String> = (0..*size).map(|i| i.to_string()).collect();
        let input = format!(
            r#"{{"@id": "http://example.org/l", "http://example.org/items": {{"@list": [{}]}}}}"#,
            items.join(",")
        )
        .into_bytes();
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            let options = ParserOptions::default().with_streaming_profile(true);
            b.iter(|| quads_from_slice(input, options.clone()).unwrap().len());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenizer, bench_expansion, bench_lists);
criterion_main!(benches);
