use std::collections::HashMap;

use thiserror::Error;

use crate::index::{DocId, TermId};

/// Errors surfaced by index storage. Persistence failures are kept
/// distinguishable from ordinary misses: a vocabulary miss is `Ok(None)`,
/// never an error, while any of these may indicate index corruption and must
/// reach the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Sled(#[from] sled::Error),

    #[error("value encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("corrupt index entry: {0}")]
    Corrupt(String),

    #[error("posting references missing document {0}")]
    MissingDocument(DocId),
}

/// The persistent index: three logical relations — documents (id, unique
/// url), terms (id, unique word), postings (term, document, frequency) with
/// at most one posting per (term, document) pair.
///
/// Write operations take `&mut self`: the index has a single writer during a
/// build, while reads are safe under any number of concurrent readers.
pub trait IndexStore {
    /// Insert-or-fetch a document by URL. Inserting the same URL twice is a
    /// no-op that returns the existing id.
    fn upsert_document(&mut self, url: &str) -> Result<DocId, StoreError>;

    /// Insert-or-fetch a term by its normalized word. Callers normalize
    /// before insertion; the store compares exactly.
    fn upsert_term(&mut self, word: &str) -> Result<TermId, StoreError>;

    /// Record that `term` occurs `frequency` times in `doc`, replacing any
    /// prior posting for the pair. `frequency` is ≥ 1; zero-frequency
    /// postings are never stored.
    fn put_posting(&mut self, term: TermId, doc: DocId, frequency: u32) -> Result<(), StoreError>;

    /// Exact-match term lookup. A miss is `Ok(None)`, not an error.
    fn lookup_term(&self, word: &str) -> Result<Option<TermId>, StoreError>;

    /// All (document URL, frequency) pairs for `term`. A posting whose
    /// document no longer resolves is a broken invariant and surfaces as
    /// [`StoreError::MissingDocument`].
    fn postings_for_term(&self, term: TermId) -> Result<Vec<(String, u32)>, StoreError>;

    /// Remove every document, term, and posting (used before a rebuild).
    fn clear_all(&mut self) -> Result<(), StoreError>;
}

/// HashMap-backed store for tests and ephemeral indexes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs_by_url: HashMap<String, DocId>,
    urls_by_id: HashMap<DocId, String>,
    terms: HashMap<String, TermId>,
    postings: HashMap<(TermId, DocId), u32>,
    next_doc_id: DocId,
    next_term_id: TermId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.docs_by_url.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

impl IndexStore for MemoryStore {
    fn upsert_document(&mut self, url: &str) -> Result<DocId, StoreError> {
        if let Some(&id) = self.docs_by_url.get(url) {
            return Ok(id);
        }
        let id = self.next_doc_id;
        self.next_doc_id += 1;
        self.docs_by_url.insert(url.to_string(), id);
        self.urls_by_id.insert(id, url.to_string());
        Ok(id)
    }

    fn upsert_term(&mut self, word: &str) -> Result<TermId, StoreError> {
        if let Some(&id) = self.terms.get(word) {
            return Ok(id);
        }
        let id = self.next_term_id;
        self.next_term_id += 1;
        self.terms.insert(word.to_string(), id);
        Ok(id)
    }

    fn put_posting(&mut self, term: TermId, doc: DocId, frequency: u32) -> Result<(), StoreError> {
        self.postings.insert((term, doc), frequency);
        Ok(())
    }

    fn lookup_term(&self, word: &str) -> Result<Option<TermId>, StoreError> {
        Ok(self.terms.get(word).copied())
    }

    fn postings_for_term(&self, term: TermId) -> Result<Vec<(String, u32)>, StoreError> {
        let mut out = Vec::new();
        for (&(term_id, doc_id), &frequency) in &self.postings {
            if term_id != term {
                continue;
            }
            let url = self
                .urls_by_id
                .get(&doc_id)
                .ok_or(StoreError::MissingDocument(doc_id))?;
            out.push((url.clone(), frequency));
        }
        Ok(out)
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        self.docs_by_url.clear();
        self.urls_by_id.clear();
        self.terms.clear();
        self.postings.clear();
        self.next_doc_id = 0;
        self.next_term_id = 0;
        Ok(())
    }
}
