use std::path::Path;

use sled::Tree;

use crate::index::{DocId, Document, IndexMeta, TermId};
use crate::store::{IndexStore, StoreError};

const META_KEY: &[u8] = b"index_meta";
const NEXT_DOC_ID: &[u8] = b"next_doc_id";
const NEXT_TERM_ID: &[u8] = b"next_term_id";

/// sled-backed [`IndexStore`], one tree per logical relation:
///
/// - `docs_by_url`: url → doc id (big-endian u32), the uniqueness constraint
/// - `docs_by_id`: doc id → bincode [`Document`], resolves postings to URLs
/// - `terms`: word → term id (big-endian u32)
/// - `postings`: term id ++ doc id (both big-endian) → frequency, so all
///   postings of one term form a contiguous prefix range
/// - `meta`: id counters and the [`IndexMeta`] record
///
/// All lookups are typed key accesses; query input never reaches the storage
/// layer as anything but an exact key. Reads are lock-free in sled, so any
/// number of queries may run concurrently; writes follow the single-writer
/// build policy via `&mut self`.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    docs_by_url: Tree,
    docs_by_id: Tree,
    terms: Tree,
    postings: Tree,
    meta: Tree,
}

impl SledStore {
    /// Open or create an index database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    /// Open a throwaway in-memory database. Data is lost on drop.
    pub fn open_temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            docs_by_url: db.open_tree("docs_by_url")?,
            docs_by_id: db.open_tree("docs_by_id")?,
            terms: db.open_tree("terms")?,
            postings: db.open_tree("postings")?,
            meta: db.open_tree("meta")?,
            db,
        })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn meta(&self) -> Result<Option<IndexMeta>, StoreError> {
        match self.meta.get(META_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_meta(&mut self, meta: &IndexMeta) -> Result<(), StoreError> {
        self.meta.insert(META_KEY, bincode::serialize(meta)?)?;
        Ok(())
    }

    pub fn document_count(&self) -> u64 {
        self.docs_by_url.len() as u64
    }

    // Fetch-and-increment an id counter. Not atomic across writers; the
    // single-writer build policy is what keeps ids unique.
    fn next_id(&self, counter: &[u8]) -> Result<u32, StoreError> {
        let current = match self.meta.get(counter)? {
            Some(bytes) => decode_u32(&bytes)?,
            None => 0,
        };
        self.meta.insert(counter, &(current + 1).to_be_bytes()[..])?;
        Ok(current)
    }
}

fn decode_u32(bytes: &[u8]) -> Result<u32, StoreError> {
    let array: [u8; 4] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("expected 4-byte value, got {}", bytes.len())))?;
    Ok(u32::from_be_bytes(array))
}

fn posting_key(term: TermId, doc: DocId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&term.to_be_bytes());
    key[4..].copy_from_slice(&doc.to_be_bytes());
    key
}

impl IndexStore for SledStore {
    fn upsert_document(&mut self, url: &str) -> Result<DocId, StoreError> {
        if let Some(bytes) = self.docs_by_url.get(url.as_bytes())? {
            return decode_u32(&bytes);
        }
        let id = self.next_id(NEXT_DOC_ID)?;
        let record = Document {
            id,
            url: url.to_string(),
        };
        self.docs_by_id
            .insert(id.to_be_bytes(), bincode::serialize(&record)?)?;
        self.docs_by_url
            .insert(url.as_bytes(), &id.to_be_bytes()[..])?;
        Ok(id)
    }

    fn upsert_term(&mut self, word: &str) -> Result<TermId, StoreError> {
        if let Some(bytes) = self.terms.get(word.as_bytes())? {
            return decode_u32(&bytes);
        }
        let id = self.next_id(NEXT_TERM_ID)?;
        self.terms.insert(word.as_bytes(), &id.to_be_bytes()[..])?;
        Ok(id)
    }

    fn put_posting(&mut self, term: TermId, doc: DocId, frequency: u32) -> Result<(), StoreError> {
        self.postings
            .insert(posting_key(term, doc), &frequency.to_be_bytes()[..])?;
        Ok(())
    }

    fn lookup_term(&self, word: &str) -> Result<Option<TermId>, StoreError> {
        match self.terms.get(word.as_bytes())? {
            Some(bytes) => Ok(Some(decode_u32(&bytes)?)),
            None => Ok(None),
        }
    }

    fn postings_for_term(&self, term: TermId) -> Result<Vec<(String, u32)>, StoreError> {
        let mut out = Vec::new();
        for entry in self.postings.scan_prefix(term.to_be_bytes()) {
            let (key, value) = entry?;
            if key.len() != 8 {
                return Err(StoreError::Corrupt(format!(
                    "posting key has {} bytes, expected 8",
                    key.len()
                )));
            }
            let doc_id = decode_u32(&key[4..])?;
            let frequency = decode_u32(&value)?;
            let doc_bytes = self
                .docs_by_id
                .get(doc_id.to_be_bytes())?
                .ok_or(StoreError::MissingDocument(doc_id))?;
            let record: Document = bincode::deserialize(&doc_bytes)?;
            out.push((record.url, frequency));
        }
        Ok(out)
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        for tree in [
            &self.docs_by_url,
            &self.docs_by_id,
            &self.terms,
            &self.postings,
            &self.meta,
        ] {
            tree.clear()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upserts_are_idempotent() {
        let mut store = SledStore::open_temporary().unwrap();
        let doc = store.upsert_document("/wiki/a.html").unwrap();
        assert_eq!(store.upsert_document("/wiki/a.html").unwrap(), doc);
        let term = store.upsert_term("cat").unwrap();
        assert_eq!(store.upsert_term("cat").unwrap(), term);
        assert_eq!(store.lookup_term("cat").unwrap(), Some(term));
        assert_eq!(store.document_count(), 1);
    }

    #[test]
    fn postings_resolve_to_urls_and_overwrite() {
        let mut store = SledStore::open_temporary().unwrap();
        let a = store.upsert_document("/wiki/a.html").unwrap();
        let b = store.upsert_document("/wiki/b.html").unwrap();
        let term = store.upsert_term("dog").unwrap();
        store.put_posting(term, a, 2).unwrap();
        store.put_posting(term, b, 5).unwrap();
        store.put_posting(term, a, 4).unwrap();

        let mut postings = store.postings_for_term(term).unwrap();
        postings.sort();
        assert_eq!(
            postings,
            vec![
                ("/wiki/a.html".to_string(), 4),
                ("/wiki/b.html".to_string(), 5),
            ]
        );
    }

    #[test]
    fn prefix_scan_does_not_leak_other_terms() {
        let mut store = SledStore::open_temporary().unwrap();
        let doc = store.upsert_document("/wiki/a.html").unwrap();
        let cat = store.upsert_term("cat").unwrap();
        let dog = store.upsert_term("dog").unwrap();
        store.put_posting(cat, doc, 1).unwrap();
        store.put_posting(dog, doc, 9).unwrap();

        assert_eq!(
            store.postings_for_term(cat).unwrap(),
            vec![("/wiki/a.html".to_string(), 1)]
        );
    }

    #[test]
    fn clear_all_resets_ids() {
        let mut store = SledStore::open_temporary().unwrap();
        store.upsert_document("/wiki/a.html").unwrap();
        store.upsert_document("/wiki/b.html").unwrap();
        store.clear_all().unwrap();

        assert_eq!(store.document_count(), 0);
        assert_eq!(store.upsert_document("/wiki/c.html").unwrap(), 0);
    }

    #[test]
    fn meta_round_trips() {
        let mut store = SledStore::open_temporary().unwrap();
        assert!(store.meta().unwrap().is_none());
        let meta = IndexMeta {
            num_docs: 3,
            created_at: "2024-01-01T00:00:00Z".into(),
            version: crate::index::INDEX_VERSION,
        };
        store.set_meta(&meta).unwrap();
        assert_eq!(store.meta().unwrap(), Some(meta));
    }
}
