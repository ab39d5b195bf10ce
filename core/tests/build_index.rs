use serde_json::{json, Value};
use sitesearch_core::persist::{load_index, save_index};
use sitesearch_core::{build_index, Document, FieldSpec, IndexConfig, IndexBuilder};
use tempfile::tempdir;

fn docs(v: Value) -> Vec<Document> {
    v.as_array().unwrap().iter().map(|d| d.as_object().cloned().unwrap()).collect()
}

fn config(fields: Vec<FieldSpec>) -> IndexConfig {
    IndexConfig {
        reference_field: "id".into(),
        fields,
        index_output: "idx.json".into(),
        ..IndexConfig::default()
    }
}

fn refs(index: &sitesearch_core::Index, q: &str) -> Vec<String> {
    let mut r: Vec<String> = index.search(q, usize::MAX).into_iter().map(|h| h.reference).collect();
    r.sort();
    r
}

#[test]
fn red_fox_blue_fox() {
    let cfg = config(vec![FieldSpec::new("title")]);
    let index = build_index(&cfg, &docs(json!([{"id": "1", "title": "red fox"}, {"id": "2", "title": "blue fox"}]))).unwrap();
    assert_eq!(refs(&index, "fox"), vec!["1", "2"]);
    assert_eq!(refs(&index, "red"), vec!["1"]);
}

#[test]
fn empty_collection_gives_empty_index() {
    let cfg = config(vec![FieldSpec::new("title")]);
    let index = build_index(&cfg, &[]).unwrap();
    assert_eq!(index.num_docs(), 0);
    assert_eq!(index.num_terms(), 0);
    assert_eq!(index.field("title").unwrap().average_length, 0.0);
    assert!(index.search("anything", 10).is_empty());
}

#[test]
fn builds_are_byte_identical() {
    let cfg = config(vec![FieldSpec::boosted("title", 5.0), FieldSpec::new("body")]);
    let input = docs(json!([
        {"id": "b", "title": "Indexing static sites", "body": "Prebuilt indexes are loaded by the browser."},
        {"id": "a", "title": "Search widget", "body": "The widget scores documents with BM25."},
        {"id": 3, "title": "Numbers", "body": 42}
    ]));
    let first = serde_json::to_vec(&build_index(&cfg, &input).unwrap()).unwrap();
    let second = serde_json::to_vec(&build_index(&cfg, &input).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_unique_reference_appears_once() {
    let cfg = config(vec![FieldSpec::new("title")]);
    let index = build_index(&cfg, &docs(json!([
        {"id": "x", "title": "one"},
        {"id": "y", "title": "two"},
        {"id": "z", "title": "three"}
    ])))
    .unwrap();
    assert_eq!(index.documents, vec!["x", "y", "z"]);
    assert!(index.contains_document("y"));
    assert!(!index.contains_document("w"));
}

#[test]
fn duplicate_reference_keeps_last_content() {
    let cfg = config(vec![FieldSpec::new("title")]);
    let index = build_index(&cfg, &docs(json!([
        {"id": "1", "title": "first version"},
        {"id": "2", "title": "other page"},
        {"id": "1", "title": "second edition"}
    ])))
    .unwrap();
    assert_eq!(index.num_docs(), 2);
    assert!(refs(&index, "first").is_empty());
    assert_eq!(refs(&index, "edition"), vec!["1"]);
}

#[test]
fn absent_field_has_no_postings() {
    let cfg = config(vec![FieldSpec::new("title"), FieldSpec::new("summary")]);
    let index = build_index(&cfg, &docs(json!([{"id": "1", "title": "red fox"}]))).unwrap();
    assert!(index.field("summary").is_some());
    assert_eq!(index.field_posting_count("summary"), 0);
    assert_eq!(index.field_posting_count("title"), 2);
}

#[test]
fn boost_raises_score() {
    let cfg = config(vec![FieldSpec::boosted("title", 3.0), FieldSpec::new("body")]);
    let index = build_index(&cfg, &docs(json!([
        {"id": "in-title", "title": "red fox", "body": "green tree"},
        {"id": "in-body", "title": "green tree", "body": "red fox"}
    ])))
    .unwrap();
    let hits = index.search("fox", 10);
    assert_eq!(hits[0].reference, "in-title");
    assert_eq!(hits[1].reference, "in-body");
    assert!((hits[0].score - 3.0 * hits[1].score).abs() < 1e-4);
}

#[test]
fn unboosted_fields_score_alike() {
    let cfg = config(vec![FieldSpec::new("title"), FieldSpec::new("body")]);
    let index = build_index(&cfg, &docs(json!([
        {"id": "a", "title": "red fox", "body": "green tree"},
        {"id": "b", "title": "green tree", "body": "red fox"}
    ])))
    .unwrap();
    let hits = index.search("fox", 10);
    assert!((hits[0].score - hits[1].score).abs() < 1e-6);
}

#[test]
fn saved_artifact_answers_the_same() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.json");
    let mut builder = IndexBuilder::new("id");
    builder.register_field(FieldSpec::new("title")).unwrap();
    builder.add_documents(&docs(json!([{"id": "1", "title": "red fox"}, {"id": "2", "title": "blue fox"}]))).unwrap();
    let index = builder.build();
    save_index(&path, &index, false).unwrap();

    let loaded = load_index(&path).unwrap();
    assert_eq!(loaded.search("fox", 10), index.search("fox", 10));

    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], json!(1));
    assert_eq!(raw["reference_field"], json!("id"));
    assert_eq!(raw["fields"][0]["boost"], json!(1.0));
    assert_eq!(raw["inverted_index"]["fox"]["df"], json!(2));
}
