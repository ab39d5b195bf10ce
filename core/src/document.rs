use crate::error::{IndexError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A flat record to index: field name to scalar value.
pub type Document = Map<String, Value>;

/// Why a document's reference could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceProblem {
    Missing,
    NotScalar,
}

/// Load a JSON array of documents.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| IndexError::io(path, e))?;
    let json: Value = serde_json::from_reader(BufReader::new(f)).map_err(|e| IndexError::Documents {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    documents_from_value(json).map_err(|reason| IndexError::Documents { path: path.to_path_buf(), reason })
}

pub fn documents_from_value(json: Value) -> std::result::Result<Vec<Document>, String> {
    let Value::Array(arr) = json else {
        return Err("expected a JSON array of objects".into());
    };
    arr.into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(doc) => Ok(doc),
            other => Err(format!("entry #{i} is not an object: {}", kind(&other))),
        })
        .collect()
}

/// Read the document's identity from `field`. Strings are used as-is, numbers and
/// booleans through their JSON rendering.
pub fn reference_of(doc: &Document, field: &str) -> std::result::Result<String, ReferenceProblem> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(ReferenceProblem::Missing),
        Some(v) => scalar_text(v).ok_or(ReferenceProblem::NotScalar),
    }
}

/// Text fragments carried by a field value. Arrays contribute each scalar element.
pub fn field_texts(doc: &Document, field: &str) -> Vec<String> {
    match doc.get(field) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(v) => scalar_text(v).into_iter().collect(),
        None => Vec::new(),
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
