use std::collections::BTreeMap;
use std::io;

use tempfile::tempdir;
use wikisearch_core::{search, CorpusDoc, IndexBuilder, IndexStore, SledStore};

fn corpus(entries: &[(&str, &str)]) -> Vec<io::Result<CorpusDoc>> {
    entries
        .iter()
        .map(|(url, html)| {
            Ok(CorpusDoc {
                url: url.to_string(),
                html: html.to_string(),
            })
        })
        .collect()
}

fn ranked_urls(store: &SledStore, query: &str) -> Vec<String> {
    search(store, query)
        .unwrap()
        .docs
        .into_iter()
        .map(|d| d.url)
        .collect()
}

// word → sorted (url, frequency) pairs, the id-independent content of the
// index.
fn index_content(store: &SledStore, words: &[&str]) -> BTreeMap<String, Vec<(String, u32)>> {
    let mut content = BTreeMap::new();
    for word in words {
        if let Some(term) = store.lookup_term(word).unwrap() {
            let mut postings = store.postings_for_term(term).unwrap();
            postings.sort();
            content.insert(word.to_string(), postings);
        }
    }
    content
}

#[test]
fn end_to_end_build_and_search() {
    let mut store = SledStore::open_temporary().unwrap();
    let report = IndexBuilder::new()
        .build(
            &mut store,
            corpus(&[
                ("/wiki/a.html", "<p>cat dog cat</p>"),
                ("/wiki/b.html", "<p>dog dog</p>"),
            ]),
        )
        .unwrap();
    assert_eq!(report.indexed, 2);

    // A scores 2(cat) + 1(dog) = 3, B scores 0(cat) + 2(dog) = 2.
    let outcome = search(&store, "cat dog").unwrap();
    let scored: Vec<_> = outcome
        .docs
        .iter()
        .map(|d| (d.url.as_str(), d.score))
        .collect();
    assert_eq!(scored, vec![("/wiki/a.html", 3), ("/wiki/b.html", 2)]);
}

#[test]
fn rebuild_after_clear_produces_identical_content() {
    let entries = [
        ("/wiki/a.html", "<p>cat dog cat</p>"),
        ("/wiki/b.html", "<p>dog bird</p>"),
    ];
    let words = ["cat", "dog", "bird"];

    let mut store = SledStore::open_temporary().unwrap();
    IndexBuilder::new()
        .build(&mut store, corpus(&entries))
        .unwrap();
    let first = index_content(&store, &words);

    store.clear_all().unwrap();
    IndexBuilder::new()
        .build(&mut store, corpus(&entries))
        .unwrap();
    let second = index_content(&store, &words);

    // Ids may differ between builds; the (word, url, frequency) content must
    // not.
    assert_eq!(first, second);
}

#[test]
fn rebuild_without_clear_replaces_postings_in_place() {
    let mut store = SledStore::open_temporary().unwrap();
    IndexBuilder::new()
        .build(&mut store, corpus(&[("/wiki/a.html", "cat cat cat")]))
        .unwrap();
    IndexBuilder::new()
        .build(&mut store, corpus(&[("/wiki/a.html", "cat")]))
        .unwrap();

    assert_eq!(store.document_count(), 1);
    let cat = store.lookup_term("cat").unwrap().unwrap();
    assert_eq!(
        store.postings_for_term(cat).unwrap(),
        vec![("/wiki/a.html".to_string(), 1)]
    );
}

#[test]
fn index_survives_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut store = SledStore::open(dir.path()).unwrap();
        IndexBuilder::new()
            .build(
                &mut store,
                corpus(&[
                    ("/wiki/a.html", "rust systems"),
                    ("/wiki/b.html", "rust rust"),
                ]),
            )
            .unwrap();
        store.flush().unwrap();
    }

    let store = SledStore::open(dir.path()).unwrap();
    assert_eq!(ranked_urls(&store, "rust"), vec!["/wiki/b.html", "/wiki/a.html"]);
    assert_eq!(ranked_urls(&store, "systems"), vec!["/wiki/a.html"]);
}
