//! Explicit index construction.
//!
//! Fields are registered, documents are added one at a time and analyzed on
//! arrival, and [`IndexBuilder::build`] finalizes corpus statistics (document
//! frequencies, average field lengths) into an immutable [`Index`]. Corpus
//! statistics are only known once every document is in, so scoring happens
//! entirely in `build`.

use crate::config::{AnalyzerConfig, Bm25Params, FieldSpec, IndexConfig, MissingReference};
use crate::document::{field_texts, reference_of, Document, ReferenceProblem};
use crate::error::{IndexError, Result};
use crate::index::{DocRef, FieldEntry, Index, Posting, TermEntry, FORMAT_VERSION};
use crate::tokenizer::Analyzer;
use std::collections::{BTreeMap, BTreeSet};

/// Result of handing one document to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The reference was already present; the earlier document was dropped.
    Replaced,
    /// No usable reference and the policy is [`MissingReference::Skip`].
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddCounts {
    pub added: usize,
    pub replaced: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct FieldStats {
    length: u32,
    /// term -> positions within the field
    terms: BTreeMap<String, Vec<u32>>,
}

pub struct IndexBuilder {
    reference_field: String,
    fields: Vec<FieldSpec>,
    analyzer: Analyzer,
    bm25: Bm25Params,
    on_missing_reference: MissingReference,
    /// reference -> field id -> stats
    docs: BTreeMap<DocRef, BTreeMap<String, FieldStats>>,
    seen: usize,
}

impl IndexBuilder {
    pub fn new(reference_field: impl Into<String>) -> Self {
        Self {
            reference_field: reference_field.into(),
            fields: Vec::new(),
            analyzer: Analyzer::default(),
            bm25: Bm25Params::default(),
            on_missing_reference: MissingReference::default(),
            docs: BTreeMap::new(),
            seen: 0,
        }
    }

    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        let mut builder = Self::new(config.reference_field.clone())
            .with_analyzer(config.analyzer)
            .with_bm25(config.bm25)?
            .on_missing_reference(config.on_missing_reference);
        for field in &config.fields {
            builder.register_field(field.clone())?;
        }
        Ok(builder)
    }

    pub fn with_analyzer(mut self, config: AnalyzerConfig) -> Self {
        self.analyzer = Analyzer::new(config);
        self
    }

    pub fn with_bm25(mut self, params: Bm25Params) -> Result<Self> {
        params.check().map_err(IndexError::InvalidParameter)?;
        self.bm25 = params;
        Ok(self)
    }

    pub fn on_missing_reference(mut self, policy: MissingReference) -> Self {
        self.on_missing_reference = policy;
        self
    }

    /// Register an indexed field. Re-registering an id replaces its boost but keeps its position.
    pub fn register_field(&mut self, spec: FieldSpec) -> Result<()> {
        spec.check().map_err(IndexError::InvalidParameter)?;
        if !self.docs.is_empty() {
            tracing::warn!(field = %spec.id, docs = self.docs.len(), "field registered after documents were added; they contribute no terms to it");
        }
        match self.fields.iter_mut().find(|f| f.id == spec.id) {
            Some(existing) => existing.boost = spec.boost,
            None => self.fields.push(spec),
        }
        Ok(())
    }

    pub fn add_document(&mut self, doc: &Document) -> Result<AddOutcome> {
        let position = self.seen;
        self.seen += 1;

        let reference = match reference_of(doc, &self.reference_field) {
            Ok(r) => r,
            Err(problem) => {
                let field = self.reference_field.clone();
                let err = match problem {
                    ReferenceProblem::Missing => IndexError::MissingReference { field, position },
                    ReferenceProblem::NotScalar => IndexError::InvalidReference { field, position },
                };
                return match self.on_missing_reference {
                    MissingReference::Fail => Err(err),
                    MissingReference::Skip => {
                        tracing::warn!(error = %err, "skipping document");
                        Ok(AddOutcome::Skipped)
                    }
                };
            }
        };

        let mut fields = BTreeMap::new();
        for spec in &self.fields {
            let mut stats = FieldStats::default();
            // Array elements continue the position count of the previous element.
            for text in field_texts(doc, &spec.id) {
                let tokens = self.analyzer.analyze(&text);
                let mut words = 0;
                for (pos, term) in tokens.words() {
                    words = pos + 1;
                    if let Some(term) = term {
                        stats.terms.entry(term).or_default().push(stats.length + pos as u32);
                    }
                }
                stats.length += words as u32;
            }
            fields.insert(spec.id.clone(), stats);
        }

        match self.docs.insert(reference.clone(), fields) {
            Some(_) => {
                tracing::debug!(%reference, "duplicate reference; keeping the later document");
                Ok(AddOutcome::Replaced)
            }
            None => Ok(AddOutcome::Added),
        }
    }

    pub fn add_documents<'a, I>(&mut self, docs: I) -> Result<AddCounts>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut counts = AddCounts::default();
        for doc in docs {
            match self.add_document(doc)? {
                AddOutcome::Added => counts.added += 1,
                AddOutcome::Replaced => counts.replaced += 1,
                AddOutcome::Skipped => counts.skipped += 1,
            }
        }
        Ok(counts)
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Compute corpus statistics and BM25 weights, consuming the builder.
    pub fn build(self) -> Index {
        let n = self.docs.len() as f32;

        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for fields in self.docs.values() {
            let distinct: BTreeSet<&str> = fields.values().flat_map(|s| s.terms.keys().map(String::as_str)).collect();
            for term in distinct {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let field_entries: Vec<FieldEntry> = self
            .fields
            .iter()
            .map(|spec| {
                let total: u64 = self
                    .docs
                    .values()
                    .filter_map(|fields| fields.get(&spec.id))
                    .map(|s| s.length as u64)
                    .sum();
                let average_length = if n > 0.0 { total as f32 / n } else { 0.0 };
                FieldEntry { id: spec.id.clone(), boost: spec.weight(), average_length }
            })
            .collect();

        let mut inverted_index: BTreeMap<String, TermEntry> = BTreeMap::new();
        for (reference, fields) in &self.docs {
            for field in &field_entries {
                let Some(stats) = fields.get(&field.id) else { continue };
                for (term, positions) in &stats.terms {
                    let entry = inverted_index.entry(term.clone()).or_insert_with(|| {
                        let df_t = df.get(term.as_str()).copied().unwrap_or(1);
                        TermEntry { df: df_t, idf: idf(n, df_t as f32), postings: BTreeMap::new() }
                    });
                    let tf = positions.len() as u32;
                    let weight = field.boost
                        * entry.idf
                        * bm25_tf(tf as f32, stats.length as f32, field.average_length, self.bm25);
                    entry
                        .postings
                        .entry(field.id.clone())
                        .or_default()
                        .insert(reference.clone(), Posting { tf, positions: positions.clone(), weight });
                }
            }
        }

        let index = Index {
            version: FORMAT_VERSION,
            reference_field: self.reference_field,
            fields: field_entries,
            pipeline: self.analyzer.config(),
            bm25: self.bm25,
            documents: self.docs.into_keys().collect(),
            inverted_index,
        };
        tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "index built");
        index
    }
}

/// Probabilistic IDF, always positive: ln(1 + (N - df + 0.5) / (df + 0.5)).
pub fn idf(n: f32, df: f32) -> f32 {
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// BM25 term frequency component with field length normalization.
pub fn bm25_tf(tf: f32, len: f32, avg_len: f32, params: Bm25Params) -> f32 {
    let ratio = if avg_len > 0.0 { len / avg_len } else { 1.0 };
    let norm = 1.0 - params.b + params.b * ratio;
    tf * (params.k1 + 1.0) / (tf + params.k1 * norm)
}

/// Build an index from a descriptor and a document collection in one go.
pub fn build_index(config: &IndexConfig, docs: &[Document]) -> Result<Index> {
    let mut builder = IndexBuilder::from_config(config)?;
    let counts = builder.add_documents(docs)?;
    tracing::info!(added = counts.added, replaced = counts.replaced, skipped = counts.skipped, "documents ingested");
    Ok(builder.build())
}
