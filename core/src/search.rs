//! Query-time reading of a built index, the way the client widget scores it.

use crate::index::{DocRef, Index};
use crate::tokenizer::Analyzer;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub reference: DocRef,
    pub score: f32,
    /// Index terms of the query that matched this document, sorted.
    pub matched_terms: Vec<String>,
}

impl Index {
    /// Analyze `query` with the index's own pipeline and rank matching documents.
    ///
    /// Each distinct query term adds the posting weights of every field it
    /// occurs in. Results are ordered by score, ties broken by reference, and
    /// truncated to `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let analyzer = Analyzer::new(self.pipeline);
        let terms: BTreeSet<String> = analyzer.analyze(query).iter().map(|(t, _)| t).collect();

        let mut scores: BTreeMap<&str, (f32, BTreeSet<&str>)> = BTreeMap::new();
        for term in &terms {
            let Some(entry) = self.term(term) else { continue };
            for postings in entry.postings.values() {
                for (reference, posting) in postings {
                    let slot = scores.entry(reference.as_str()).or_default();
                    slot.0 += posting.weight;
                    slot.1.insert(term.as_str());
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .map(|(reference, (score, matched))| SearchHit {
                reference: reference.to_string(),
                score,
                matched_terms: matched.into_iter().map(str::to_string).collect(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.reference.cmp(&b.reference))
        });
        hits.truncate(limit);
        hits
    }
}
