//! Extraction of search documents and page metadata from a generated static site.

pub mod extract;
pub mod site;

use anyhow::{Context, Result};
use extract::{page_title, page_to_document, KeyTags};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use site::{root_relative_url, valid_paths};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct DocumentsArgs {
    pub site_root: PathBuf,
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    #[serde(default)]
    pub key_tags: KeyTags,
}

#[derive(Debug, Deserialize)]
pub struct MetadataArgs {
    pub site_root: PathBuf,
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    pub meta_data_output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: Option<String>,
}

pub fn read_args<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// One document per page, in path order.
pub fn generate_documents(args: &DocumentsArgs) -> Result<Vec<Map<String, Value>>> {
    let paths = valid_paths(&args.site_root, &args.exclude_paths)?;
    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let source = read_page(&path)?;
        let url = root_relative_url(&args.site_root, &path);
        docs.push(page_to_document(&source, &url, &args.key_tags).with_context(|| format!("extracting {url}"))?);
    }
    tracing::info!(pages = docs.len(), site_root = %args.site_root.display(), "documents extracted");
    Ok(docs)
}

/// Page titles keyed by root-relative url.
pub fn generate_metadata(args: &MetadataArgs) -> Result<BTreeMap<String, PageMeta>> {
    let mut meta = BTreeMap::new();
    for path in valid_paths(&args.site_root, &args.exclude_paths)? {
        let url = root_relative_url(&args.site_root, &path);
        let title = page_title(&read_page(&path)?);
        if title.is_none() {
            tracing::warn!(%url, "cannot find a title on page");
        }
        meta.insert(url, PageMeta { title });
    }
    tracing::info!(pages = meta.len(), "metadata extracted");
    Ok(meta)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    serde_json::to_writer(&mut out, value)?;
    out.flush()?;
    tracing::info!(path = %path.display(), "written");
    Ok(())
}

// Invalid UTF-8 is replaced, not rejected.
fn read_page(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
