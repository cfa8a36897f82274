use criterion::{criterion_group, criterion_main, Criterion};
use wikisearch_core::tokenizer::{extract_tokens, strip_tags};

fn bench_tokenize(c: &mut Criterion) {
    let page = format!(
        "<html><head><title>Bench</title></head><body>{}</body></html>",
        "<p>The quick brown Fox jumps over the lazy dog 42 times.</p>".repeat(500)
    );
    c.bench_function("strip_and_tokenize_page", |b| {
        b.iter(|| extract_tokens(&strip_tags(&page)))
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
