//! Static full-text index building: documents in, a versioned JSON index out.

pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod persist;
pub mod search;
pub mod tokenizer;

mod index;

pub use builder::{build_index, AddCounts, AddOutcome, IndexBuilder};
pub use config::{FieldSpec, IndexConfig, LoadPolicy, MissingReference};
pub use document::Document;
pub use error::{IndexError, Result};
pub use index::*;
pub use search::SearchHit;
