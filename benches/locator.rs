use criterion::{black_box, criterion_group, criterion_main, Criterion};
use livespell::editor::locator;
use livespell::editor::{on_document_change, Document, Selection, Session};
use livespell::DictionaryStore;

fn bench_locate(c: &mut Criterion) {
    let text = "The quick brown fox jumps over the lazy dog, again and again. ".repeat(40);
    let middle = text.chars().count() / 2;

    c.bench_function("locate_middle_of_long_block", |b| {
        b.iter(|| locator::locate(black_box(&text), black_box(middle)))
    });

    c.bench_function("current_word_with_punctuation", |b| {
        b.iter(|| locator::current_word(black_box("Hello, world! again?"), black_box(3)))
    });
}

fn bench_sync_plan(c: &mut Criterion) {
    let mut store = DictionaryStore::new();
    store
        .load_wordlist("en", "the\nquick\nbrown\nfox\njumps\nover\nlazy\ndog")
        .unwrap();
    let mut session = Session::new();
    session.dictionaries_loaded(&store, "en");
    let doc = Document::from_text(&"The quick brown fox jumps over the lazy dgo ".repeat(20));

    c.bench_function("plan_update_cycle", |b| {
        b.iter(|| on_document_change(&session, &store, black_box(&doc), Selection::cursor(42)))
    });
}

criterion_group!(benches, bench_locate, bench_sync_plan);
criterion_main!(benches);
