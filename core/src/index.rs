use crate::config::{AnalyzerConfig, Bm25Params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bumped whenever the serialized layout changes; readers reject other versions.
pub const FORMAT_VERSION: u32 = 1;

/// Document reference, the value of the configured reference field.
pub type DocRef = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub id: String,
    pub boost: f32,
    /// Mean token count of this field across all indexed documents.
    pub average_length: f32,
}

/// Occurrences of one term in one field of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub tf: u32,
    pub positions: Vec<u32>,
    /// BM25 contribution with the field boost applied.
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    /// Number of documents containing the term in any field.
    pub df: u32,
    pub idf: f32,
    /// field id -> document reference -> posting
    pub postings: BTreeMap<String, BTreeMap<DocRef, Posting>>,
}

/// The built, immutable search index. Ordered maps keep serialization byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub version: u32,
    pub reference_field: String,
    pub fields: Vec<FieldEntry>,
    pub pipeline: AnalyzerConfig,
    pub bm25: Bm25Params,
    /// Every indexed document reference, sorted.
    pub documents: Vec<DocRef>,
    pub inverted_index: BTreeMap<String, TermEntry>,
}

impl Index {
    pub fn num_docs(&self) -> usize { self.documents.len() }

    pub fn num_terms(&self) -> usize { self.inverted_index.len() }

    pub fn term(&self, term: &str) -> Option<&TermEntry> { self.inverted_index.get(term) }

    pub fn field(&self, id: &str) -> Option<&FieldEntry> { self.fields.iter().find(|f| f.id == id) }

    pub fn contains_document(&self, reference: &str) -> bool {
        self.documents.binary_search_by(|r| r.as_str().cmp(reference)).is_ok()
    }

    /// Number of (term, document) postings recorded under `field`.
    pub fn field_posting_count(&self, field: &str) -> usize {
        self.inverted_index
            .values()
            .filter_map(|t| t.postings.get(field))
            .map(|p| p.len())
            .sum()
    }
}
