//! Index descriptor and tuning parameters.
//!
//! The descriptor is a small JSON file naming the reference field, the
//! indexed fields and the artifact path. Everything else has defaults.

use crate::error::{IndexError, Result};
use rust_stemmers::Algorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the indexer looks for documents when no path is given.
pub const DEFAULT_DOCUMENTS_PATH: &str = "./documents.json";

/// BM25 term frequency saturation.
pub const BM25_K1: f32 = 1.2;
/// BM25 field length normalization.
pub const BM25_B: f32 = 0.75;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), boost: None }
    }

    pub fn boosted(id: impl Into<String>, boost: f32) -> Self {
        Self { id: id.into(), boost: Some(boost) }
    }

    /// Boost applied to matches in this field; 1 when unspecified.
    pub fn weight(&self) -> f32 {
        self.boost.unwrap_or(1.0)
    }

    /// Field ids must be non-empty and boosts finite and positive.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.id.is_empty() {
            return Err("field ids must not be empty".into());
        }
        match self.boost {
            Some(boost) if !boost.is_finite() || boost <= 0.0 => {
                Err(format!("field `{}` has non-positive boost {boost}", self.id))
            }
            _ => Ok(()),
        }
    }
}

/// What the builder does with a document whose reference is missing or not a scalar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingReference {
    #[default]
    Skip,
    Fail,
}

/// How a run reacts to an unreadable config or document collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    #[default]
    Abort,
    /// Report the error and carry on with empty inputs.
    Continue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Italian,
    Portuguese,
    Spanish,
    Dutch,
}

impl Language {
    pub fn algorithm(self) -> Algorithm {
        match self {
            Language::English => Algorithm::English,
            Language::French => Algorithm::French,
            Language::German => Algorithm::German,
            Language::Italian => Algorithm::Italian,
            Language::Portuguese => Algorithm::Portuguese,
            Language::Spanish => Algorithm::Spanish,
            Language::Dutch => Algorithm::Dutch,
        }
    }
}

/// Text analysis settings. Stored in the artifact so queries are analyzed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Drop common words. The list is English and only applies to `Language::English`.
    pub stopwords: bool,
    pub stem: bool,
    pub language: Language,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { stopwords: true, stem: true, language: Language::English }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Bm25Params {
    /// `k1` must be finite and non-negative, `b` within `[0, 1]`.
    pub fn check(&self) -> std::result::Result<(), String> {
        if !self.k1.is_finite() || self.k1 < 0.0 || !(0.0..=1.0).contains(&self.b) {
            return Err(format!("bm25 parameters out of range: k1={} b={}", self.k1, self.b));
        }
        Ok(())
    }
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: BM25_K1, b: BM25_B }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(rename = "ref")]
    pub reference_field: String,
    pub fields: Vec<FieldSpec>,
    pub index_output: PathBuf,
    #[serde(default)]
    pub on_missing_reference: MissingReference,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub bm25: Bm25Params,
}

impl IndexConfig {
    /// Read and validate a descriptor file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
        Self::parse(&raw).map_err(|reason| IndexError::Config { path: path.to_path_buf(), reason })
    }

    /// Parse and validate descriptor JSON, returning a human readable reason on failure.
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        let config: IndexConfig = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.reference_field.trim().is_empty() {
            return Err("`ref` must name a document field".into());
        }
        for field in &self.fields {
            field.check()?;
        }
        self.bm25.check()?;
        if self.fields.is_empty() {
            tracing::warn!("index config lists no fields; the index will have no postings");
        }
        Ok(())
    }
}
