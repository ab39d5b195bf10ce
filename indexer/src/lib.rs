use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sitesearch_core::config::DEFAULT_DOCUMENTS_PATH;
use sitesearch_core::document::load_documents;
use sitesearch_core::persist::{load_index, save_index};
use sitesearch_core::{build_index, Document, IndexConfig, LoadPolicy, SearchHit};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "indexer")]
#[command(about = "Build a static search index from a JSON document collection", long_about = None)]
pub struct Cli {
    /// Index descriptor: {"ref": ..., "fields": [{"id": ..., "boost": ...}], "index_output": ...}
    pub config: PathBuf,
    /// Document collection, a JSON array of flat objects
    #[arg(long, default_value = DEFAULT_DOCUMENTS_PATH)]
    pub documents: PathBuf,
    /// Abort, or report and continue with empty inputs, when the config or documents fail to load
    #[arg(long, value_enum, default_value_t = OnLoadError::Abort)]
    pub on_load_error: OnLoadError,
    /// Pretty-print the index JSON
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
    /// Query the written index and print the top hits
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnLoadError {
    Abort,
    Continue,
}

impl From<OnLoadError> for LoadPolicy {
    fn from(v: OnLoadError) -> Self {
        match v {
            OnLoadError::Abort => LoadPolicy::Abort,
            OnLoadError::Continue => LoadPolicy::Continue,
        }
    }
}

#[derive(Debug)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub num_docs: usize,
    pub num_terms: usize,
    pub bytes: u64,
}

/// Load config, load documents, build, write. Linear, no retries.
pub fn run(cli: &Cli) -> Result<BuildSummary> {
    let policy = LoadPolicy::from(cli.on_load_error);
    let config = load_config(&cli.config, policy)?;
    let docs = load_docs(&cli.documents, policy)?;
    tracing::info!(documents = docs.len(), fields = config.fields.len(), reference = %config.reference_field, "inputs loaded");

    let index = build_index(&config, &docs).context("building index")?;
    let bytes = save_index(&config.index_output, &index, cli.pretty)
        .with_context(|| format!("writing index to {:?}", config.index_output))?;

    Ok(BuildSummary {
        output: config.index_output,
        num_docs: index.num_docs(),
        num_terms: index.num_terms(),
        bytes,
    })
}

/// Read a written artifact back and run `query` against it.
pub fn query_index(path: &Path, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let index = load_index(path).with_context(|| format!("reading index {}", path.display()))?;
    Ok(index.search(query, limit))
}

fn load_config(path: &Path, policy: LoadPolicy) -> Result<IndexConfig> {
    match IndexConfig::load(path) {
        Ok(config) => Ok(config),
        Err(e) if policy == LoadPolicy::Continue => {
            tracing::error!(error = %e, "config failed to load; continuing with an empty config");
            Ok(IndexConfig::default())
        }
        Err(e) => Err(e).context("loading index config"),
    }
}

fn load_docs(path: &Path, policy: LoadPolicy) -> Result<Vec<Document>> {
    match load_documents(path) {
        Ok(docs) => Ok(docs),
        Err(e) if policy == LoadPolicy::Continue => {
            tracing::error!(error = %e, "documents failed to load; continuing with none");
            Ok(Vec::new())
        }
        Err(e) => Err(e).context("loading documents"),
    }
}
