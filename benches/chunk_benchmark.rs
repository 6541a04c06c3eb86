//! Benchmarks for rendering and chunking.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use untext::writer::render_text;
use untext::{chunk_text, DocumentModel, ParagraphBlock, TableBlock, WriteOptions};

/// A synthetic document with `paragraphs` paragraphs and a table every ten.
fn create_test_document(paragraphs: usize) -> DocumentModel {
    let mut doc = DocumentModel::new();
    for i in 0..paragraphs {
        doc.push(ParagraphBlock::new(format!(
            "Paragraph {} - benchmark content for text rendering and chunking.",
            i + 1
        )));
        if i % 10 == 9 {
            doc.push(TableBlock::from_strings(vec![
                vec!["Name", "Value", "Note"],
                vec!["alpha", "1", ""],
                vec!["beta", "2", "second"],
            ]));
        }
    }
    doc
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_text");
    let options = WriteOptions::default();

    for size in [100, 1_000, 10_000].iter() {
        let doc = create_test_document(*size);
        group.bench_function(format!("{}_paragraphs", size), |b| {
            b.iter(|| render_text(black_box(&doc), &options));
        });
    }

    group.finish();
}

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_text");
    let ascii = render_text(&create_test_document(10_000), &WriteOptions::default());
    let cjk = "文書変換のベンチマーク用テキスト。".repeat(20_000);

    group.bench_function("ascii_default", |b| {
        b.iter(|| chunk_text(black_box(&ascii), 12_000, 300).len());
    });
    group.bench_function("ascii_small_windows", |b| {
        b.iter(|| chunk_text(black_box(&ascii), 500, 50).len());
    });
    group.bench_function("cjk_default", |b| {
        b.iter(|| chunk_text(black_box(&cjk), 12_000, 300).len());
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_chunking);
criterion_main!(benches);
