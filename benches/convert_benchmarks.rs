use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tabu_csv::ByteSlice;
use tabu_csv::convert::{self, append_float, append_unsigned};
use tabu_csv::escape::{UriEscapeMode, c_escape, c_unescape, hexlify, uri_escape};

/// Generate decimal integer fields of various digit counts
fn generate_integer_fields(size_category: &str) -> Vec<String> {
    let (count, digits) = match size_category {
        "short" => (1_000, 3),
        "medium" => (1_000, 10),
        "long" => (1_000, 19),
        _ => (1, 1),
    };
    (0..count)
        .map(|i: u64| {
            let value = (i * 7_919 + 1) % 10u64.pow(digits);
            format!("{:0width$}", value, width = digits as usize)
        })
        .collect()
}

/// Benchmark integer conversion with leading zeros and overflow checks
fn bench_integer_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer_parsing");

    for size in ["short", "medium", "long"] {
        let fields = generate_integer_fields(size);
        group.throughput(Throughput::Elements(fields.len() as u64));

        group.bench_with_input(BenchmarkId::new("to_unsigned_u64", size), &fields, |b, fields| {
            b.iter(|| {
                fields
                    .iter()
                    .filter_map(|f| convert::to_unsigned::<u64>(ByteSlice::from(black_box(f.as_str()))).ok())
                    .fold(0u64, u64::wrapping_add)
            });
        });

        group.bench_with_input(BenchmarkId::new("to_signed_i64", size), &fields, |b, fields| {
            b.iter(|| {
                fields
                    .iter()
                    .filter_map(|f| convert::to_signed::<i64>(ByteSlice::from(black_box(f.as_str()))).ok())
                    .fold(0i64, i64::wrapping_add)
            });
        });

        group.bench_with_input(BenchmarkId::new("std_parse_u64", size), &fields, |b, fields| {
            b.iter(|| {
                fields
                    .iter()
                    .filter_map(|f| black_box(f.as_str()).parse::<u64>().ok())
                    .fold(0u64, u64::wrapping_add)
            });
        });
    }

    group.finish();
}

/// Benchmark float conversion and formatting
fn bench_floats(c: &mut Criterion) {
    let mut group = c.benchmark_group("floats");
    let fields: Vec<String> = (0..1_000).map(|i| format!("{}.{:03}", i * 13, i % 1000)).collect();
    group.throughput(Throughput::Elements(fields.len() as u64));

    group.bench_function("to_float_f64", |b| {
        b.iter(|| {
            fields
                .iter()
                .filter_map(|f| convert::to_float::<f64>(ByteSlice::from(black_box(f.as_str()))).ok())
                .sum::<f64>()
        });
    });

    group.bench_function("append_float", |b| {
        let mut out = Vec::with_capacity(32 * 1_000);
        b.iter(|| {
            out.clear();
            for i in 0..1_000 {
                append_float(&mut out, black_box(f64::from(i) * 1.25));
            }
            out.len()
        });
    });

    group.bench_function("append_unsigned", |b| {
        let mut out = Vec::with_capacity(20 * 1_000);
        b.iter(|| {
            out.clear();
            for i in 0..1_000u64 {
                append_unsigned(&mut out, black_box(i * 1_000_003));
            }
            out.len()
        });
    });

    group.finish();
}

/// Benchmark delimited array and map fields
fn bench_delimited_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("delimited_fields");

    for count in [4usize, 32, 256] {
        let array = (0..count).map(|i| i.to_string()).collect::<Vec<_>>().join("|");
        let map = (0..count)
            .map(|i| format!("key{}={}", i, i))
            .collect::<Vec<_>>()
            .join("|");

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("array_u32", count), &array, |b, array| {
            b.iter(|| convert::parse_array::<u32>(ByteSlice::from(black_box(array.as_str())), b'|').map(|v| v.len()));
        });
        group.bench_with_input(BenchmarkId::new("map_string_u32", count), &map, |b, map| {
            b.iter(|| {
                convert::parse_map::<String, u32>(ByteSlice::from(black_box(map.as_str())), b'|', b'=')
                    .map(|m| m.len())
            });
        });
    }

    group.finish();
}

/// Benchmark the escape codecs
fn bench_escapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("escapes");
    let input: Vec<u8> = (0..4_096u32).map(|i| (i * 31 % 256) as u8).collect();
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("c_escape", |b| b.iter(|| c_escape(black_box(&input)).len()));

    let escaped = c_escape(&input);
    group.bench_function("c_unescape", |b| {
        b.iter(|| c_unescape(black_box(escaped.as_bytes()), true).map(|v| v.len()))
    });

    group.bench_function("uri_escape", |b| {
        b.iter(|| uri_escape(black_box(&input), UriEscapeMode::Query).len())
    });

    group.bench_function("hexlify", |b| b.iter(|| hexlify(black_box(&input)).len()));

    group.finish();
}

criterion_group!(
    benches,
    bench_integer_parsing,
    bench_floats,
    bench_delimited_fields,
    bench_escapes
);
criterion_main!(benches);
