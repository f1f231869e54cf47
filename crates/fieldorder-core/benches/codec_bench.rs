//! Criterion benchmarks for the default field codec.
//!
//! Measures parse, serialize and document splice latency for lists of
//! realistic size (a handful of fields) up to unusually large ones.
//!
//! Run with:
//! ```bash
//! cargo bench --package fieldorder-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldorder_core::{parse, serialize, ConfigDocument, EntryList, FieldEntry, FlagSet};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn make_list(n: usize) -> EntryList {
    let entries = (0..n)
        .map(|i| FieldEntry::new(format!("FIELD_{i}"), FlagSet::new(i % 2 == 0, i % 3 == 0)))
        .collect();
    EntryList::from_entries(entries).expect("generated names are unique")
}

fn make_document(n: usize) -> String {
    let fragment = serialize(&make_list(n));
    let literal = serde_json::to_string(&fragment).expect("encode literal");
    format!(
        "{{\n  \"drawing\": {{\n    \"default_line_thickness\": 6.0,\n    \"field_names\": {literal},\n    \"text_offset_ratio\": 0.15\n  }}\n}}\n"
    )
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for n in [8usize, 64, 512] {
        let text = serialize(&make_list(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| parse(black_box(text)).unwrap())
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    for n in [8usize, 64, 512] {
        let list = make_list(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &list, |b, list| {
            b.iter(|| serialize(black_box(list)))
        });
    }
    group.finish();
}

fn bench_document_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");
    let content = make_document(16);
    group.bench_function("locate_parse_splice_16", |b| {
        b.iter(|| {
            let doc = ConfigDocument::from_content(black_box(content.clone())).unwrap();
            let list = doc.entries().unwrap();
            doc.with_entries(&list).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_serialize, bench_document_round_trip);
criterion_main!(benches);
