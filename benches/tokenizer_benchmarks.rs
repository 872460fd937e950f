use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde::Deserialize;
use std::collections::HashMap;
use tabu_csv::{ByteSlice, CsvDocument, Dialect, from_document, split_lines, tokenize_line};

/// Generate item table CSV content of various sizes
fn generate_csv_content(size_category: &str) -> String {
    let rows = match size_category {
        // ~1KB
        "small" => 12,
        // ~100KB
        "medium" => 1_200,
        // ~1MB
        "large" => 12_000,
        _ => 1,
    };
    let mut content = String::from("\u{feff}Id,Name,Price,Stackable,Tags,Stats\r\n");
    for i in 0..rows {
        content.push_str(&format!(
            "{},\"Item {}, grade {}\",{}.{:02},{},common|tier{}|set{},hp={}|mp={}\r\n",
            i,
            i,
            i % 5,
            i % 1000,
            i % 100,
            if i % 2 == 0 { "Y" } else { "N" },
            i % 10,
            i % 7,
            i * 3,
            i % 50
        ));
    }
    content
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(dead_code)]
struct ItemRow<'a> {
    id: u32,
    name: &'a str,
    price: f64,
    stackable: bool,
    #[serde(borrow)]
    tags: Vec<&'a str>,
    #[serde(borrow)]
    stats: HashMap<&'a str, u32>,
}

/// Benchmark splitting and tokenizing whole documents
fn bench_document_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_parse");

    for size in ["small", "medium", "large"] {
        let content = generate_csv_content(size);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("lines", size), &content, |b, content| {
            b.iter(|| split_lines(black_box(content.as_bytes())).count());
        });

        group.bench_with_input(
            BenchmarkId::new("tokenize", size),
            &content,
            |b, content| {
                let dialect = Dialect::default();
                b.iter(|| {
                    split_lines(black_box(content.as_bytes()))
                        .map(|line| tokenize_line(line, &dialect).len())
                        .sum::<usize>()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("document", size),
            &content,
            |b, content| {
                b.iter(|| {
                    let document = CsvDocument::from_bytes(black_box(content.as_bytes()), Dialect::default());
                    document.len()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark deserializing rows into borrowed records
fn bench_deserialize_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_rows");

    for size in ["small", "medium", "large"] {
        let content = generate_csv_content(size);
        let document = CsvDocument::from_bytes(content.as_bytes(), Dialect::default());
        let config = tabu_csv::CsvConfig::default();
        group.throughput(Throughput::Elements(document.len() as u64));

        group.bench_with_input(BenchmarkId::new("items", size), &document, |b, document| {
            b.iter(|| {
                let rows: Vec<ItemRow<'_>> = from_document(black_box(document), &config).unwrap();
                rows.len()
            });
        });
    }

    group.finish();
}

/// Benchmark quoted versus plain field scanning
fn bench_field_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_styles");
    let dialect = Dialect::default();

    let plain = vec!["plain_field_value"; 32].join(",");
    let quoted = vec!["\"quoted, field \"\"value\""; 32].join(",");

    for (name, line) in [("plain", &plain), ("quoted", &quoted)] {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| tokenize_line(ByteSlice::from(black_box(line.as_str())), &dialect).len());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_document_parse,
    bench_deserialize_rows,
    bench_field_styles
);
criterion_main!(benches);
