use std::collections::HashMap;
use std::io;

use crate::index::TermId;
use crate::store::{IndexStore, StoreError};
use crate::tokenizer::{extract_tokens, strip_tags};

/// One corpus entry: the URL the document is served under and its raw HTML.
#[derive(Debug, Clone)]
pub struct CorpusDoc {
    pub url: String,
    pub html: String,
}

/// Outcome of one build pass: how many documents made it into the index and
/// which corpus entries had to be skipped.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub indexed: u64,
    pub skipped: Vec<String>,
}

/// Builds the inverted index from a corpus of (url, html) entries.
///
/// The builder carries a word → term-id cache so each distinct word hits the
/// store's vocabulary exactly once per build run. The cache is owned by the
/// instance and dies with it, never shared between runs.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    term_ids: HashMap<String, TermId>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every corpus entry into `store`.
    ///
    /// An `Err` entry (unreadable file, for example) is logged, recorded in
    /// the report, and skipped; the rest of the build continues. A store
    /// failure aborts the build and propagates, since it may indicate index
    /// corruption. Consumes the builder: the term-id cache is scoped to a
    /// single run.
    ///
    /// The build is correct whether or not prior index data exists
    /// (insert-or-fetch documents and terms, replace postings), but stale
    /// entries from earlier builds are not pruned; callers wanting a clean
    /// index run [`IndexStore::clear_all`] first.
    pub fn build<S, I>(mut self, store: &mut S, corpus: I) -> Result<BuildReport, StoreError>
    where
        S: IndexStore + ?Sized,
        I: IntoIterator<Item = io::Result<CorpusDoc>>,
    {
        let mut report = BuildReport::default();
        for entry in corpus {
            let doc = match entry {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable corpus entry");
                    report.skipped.push(err.to_string());
                    continue;
                }
            };
            self.index_document(store, &doc)?;
            report.indexed += 1;
        }
        tracing::info!(
            indexed = report.indexed,
            skipped = report.skipped.len(),
            distinct_terms = self.term_ids.len(),
            "build finished"
        );
        Ok(report)
    }

    fn index_document<S>(&mut self, store: &mut S, doc: &CorpusDoc) -> Result<(), StoreError>
    where
        S: IndexStore + ?Sized,
    {
        let text = strip_tags(&doc.html);
        let mut frequencies: HashMap<String, u32> = HashMap::new();
        for token in extract_tokens(&text) {
            *frequencies.entry(token).or_insert(0) += 1;
        }

        let doc_id = store.upsert_document(&doc.url)?;
        tracing::debug!(url = %doc.url, doc_id, distinct_terms = frequencies.len(), "indexing document");

        for (word, frequency) in frequencies {
            let term_id = match self.term_ids.get(&word) {
                Some(&id) => id,
                None => {
                    let id = store.upsert_term(&word)?;
                    self.term_ids.insert(word, id);
                    id
                }
            };
            store.put_posting(term_id, doc_id, frequency)?;
        }
        Ok(())
    }
}
