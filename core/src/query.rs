use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::store::{IndexStore, StoreError};
use crate::tokenizer::extract_tokens;

/// One ranked document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredDoc {
    pub url: String,
    pub score: u64,
}

/// Ranked result of one query, plus how long resolving it took.
#[derive(Debug)]
pub struct SearchOutcome {
    pub docs: Vec<ScoredDoc>,
    pub elapsed: Duration,
}

/// Answer one query: tokenize it exactly the way documents were tokenized at
/// build time, look up each distinct term once, and sum posting frequencies
/// per document.
///
/// Terms missing from the vocabulary contribute nothing; an empty query (or
/// one with no alphanumeric characters) yields an empty result. Only
/// documents with a score above zero appear, ordered by score descending
/// then URL ascending, so equal-score results never depend on hash-map
/// iteration order.
///
/// Store failures propagate; a broken index must never look like an empty
/// result set.
pub fn search<S>(store: &S, raw_query: &str) -> Result<SearchOutcome, StoreError>
where
    S: IndexStore + ?Sized,
{
    let start = Instant::now();

    // Distinct terms only; a repeated query word would just re-read the same
    // postings without changing any score.
    let terms: BTreeSet<String> = extract_tokens(raw_query).into_iter().collect();

    let mut scores: HashMap<String, u64> = HashMap::new();
    for word in &terms {
        let term_id = match store.lookup_term(word)? {
            Some(id) => id,
            None => continue,
        };
        for (url, frequency) in store.postings_for_term(term_id)? {
            *scores.entry(url).or_insert(0) += u64::from(frequency);
        }
    }

    let mut docs: Vec<ScoredDoc> = scores
        .into_iter()
        .map(|(url, score)| ScoredDoc { url, score })
        .collect();
    docs.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.url.cmp(&b.url)));

    Ok(SearchOutcome {
        docs,
        elapsed: start.elapsed(),
    })
}
