use clap::Parser;
use indexer::{query_index, run, Cli, OnLoadError};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_json(path: &Path, value: serde_json::Value) {
    fs::write(path, value.to_string()).unwrap();
}

fn cli(dir: &Path, on_load_error: OnLoadError) -> Cli {
    Cli {
        config: dir.join("args.json"),
        documents: dir.join("documents.json"),
        on_load_error,
        pretty: false,
        query: None,
    }
}

#[test]
fn builds_red_fox_index() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("site/idx.json");
    write_json(&dir.path().join("args.json"), json!({"ref": "id", "fields": [{"id": "title"}], "index_output": out}));
    write_json(
        &dir.path().join("documents.json"),
        json!([{"id": "1", "title": "red fox"}, {"id": "2", "title": "blue fox"}]),
    );

    let summary = run(&cli(dir.path(), OnLoadError::Abort)).unwrap();
    assert_eq!(summary.output, out);
    assert_eq!(summary.num_docs, 2);
    assert_eq!(summary.bytes, fs::metadata(&out).unwrap().len());

    let red: Vec<String> = query_index(&out, "red", 10).unwrap().into_iter().map(|h| h.reference).collect();
    assert_eq!(red, vec!["1"]);
    assert_eq!(query_index(&out, "fox", 10).unwrap().len(), 2);
}

#[test]
fn empty_documents_still_write_an_index() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("idx.json");
    write_json(&dir.path().join("args.json"), json!({"ref": "id", "fields": [{"id": "title", "boost": 10}], "index_output": out}));
    write_json(&dir.path().join("documents.json"), json!([]));

    let summary = run(&cli(dir.path(), OnLoadError::Abort)).unwrap();
    assert_eq!(summary.num_docs, 0);
    assert_eq!(summary.num_terms, 0);
    assert!(out.exists());
}

#[test]
fn broken_config_aborts_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("args.json"), "{ not json").unwrap();
    write_json(&dir.path().join("documents.json"), json!([{"id": "1", "title": "red fox"}]));

    let err = run(&cli(dir.path(), OnLoadError::Abort)).unwrap_err();
    assert!(format!("{err:#}").contains("loading index config"));
}

#[test]
fn broken_config_with_continue_fails_at_write() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("args.json"), "{ not json").unwrap();
    write_json(&dir.path().join("documents.json"), json!([{"id": "1", "title": "red fox"}]));

    let err = run(&cli(dir.path(), OnLoadError::Continue)).unwrap_err();
    assert!(format!("{err:#}").contains("no index output path configured"));
}

#[test]
fn missing_documents_with_continue_builds_empty_index() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("idx.json");
    write_json(&dir.path().join("args.json"), json!({"ref": "id", "fields": [{"id": "title"}], "index_output": out}));

    let err = run(&cli(dir.path(), OnLoadError::Abort)).unwrap_err();
    assert!(format!("{err:#}").contains("loading documents"));

    let summary = run(&cli(dir.path(), OnLoadError::Continue)).unwrap();
    assert_eq!(summary.num_docs, 0);
    assert!(out.exists());
}

#[test]
fn strict_reference_policy_rejects_orphans() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("idx.json");
    write_json(
        &dir.path().join("args.json"),
        json!({"ref": "id", "fields": [{"id": "title"}], "index_output": out, "on_missing_reference": "fail"}),
    );
    write_json(&dir.path().join("documents.json"), json!([{"id": "1", "title": "red fox"}, {"title": "orphan"}]));

    let err = run(&cli(dir.path(), OnLoadError::Abort)).unwrap_err();
    assert!(format!("{err:#}").contains("document #1 has no `id` reference field"));
    assert!(!out.exists());
}

#[test]
fn parses_positional_config_and_flags() {
    let cli = Cli::try_parse_from(["indexer", "args.json", "--on-load-error", "continue", "--pretty"]).unwrap();
    assert_eq!(cli.config, Path::new("args.json"));
    assert_eq!(cli.documents, Path::new("./documents.json"));
    assert_eq!(cli.on_load_error, OnLoadError::Continue);
    assert!(cli.pretty);
    assert!(Cli::try_parse_from(["indexer"]).is_err());
}

#[test]
fn unwritable_output_fails_without_leftovers() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "not a directory").unwrap();
    let out = dir.path().join("file.txt/idx.json");
    write_json(&dir.path().join("args.json"), json!({"ref": "id", "fields": [{"id": "title"}], "index_output": out}));
    write_json(&dir.path().join("documents.json"), json!([{"id": "1", "title": "red fox"}]));

    let err = run(&cli(dir.path(), OnLoadError::Abort)).unwrap_err();
    assert!(format!("{err:#}").contains("writing index to"));
    assert!(!dir.path().join("file.txt/.idx.json.tmp").exists());
    assert!(!dir.path().join(".idx.json.tmp").exists());

    // An existing directory at the output path makes the final rename fail.
    let out = dir.path().join("taken");
    fs::create_dir(&out).unwrap();
    write_json(&dir.path().join("args.json"), json!({"ref": "id", "fields": [{"id": "title"}], "index_output": out}));
    assert!(run(&cli(dir.path(), OnLoadError::Abort)).is_err());
    assert!(!dir.path().join(".taken.tmp").exists());
}
