use serde::{Deserialize, Serialize};

pub type TermId = u32;
pub type DocId = u32;

/// Format version stamped into [`IndexMeta`] so an incompatible on-disk
/// layout can be detected instead of misread.
pub const INDEX_VERSION: u32 = 1;

/// One indexed document. Identity is the URL (case-sensitive, unique); the
/// id is assigned at first insertion and is stable for the life of the
/// index, but NOT across rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub url: String,
}

/// Informational metadata written alongside a finished index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub num_docs: u64,
    pub created_at: String,
    pub version: u32,
}
