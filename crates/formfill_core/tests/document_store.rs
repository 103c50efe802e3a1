use formfill_core::{Document, DocumentStore, JsonFileStore, StoreConfig, StoreError};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(StoreConfig::new(
        dir.path().join("nested").join("personal_data.json"),
        dir.path().join("template.json"),
    ))
}

#[test]
fn load_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(!store.data_exists());
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::FileNotFound(path) if path.ends_with("personal_data.json")));
}

#[test]
fn load_invalid_json_is_malformed() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(store.data_path(), "{ \"members\": [").unwrap();

    assert!(matches!(store.load().unwrap_err(), StoreError::Malformed { .. }));
}

#[test]
fn load_wrong_shape_is_malformed() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(store.data_path(), "{ \"members\": \"nobody\" }").unwrap();

    assert!(matches!(store.load().unwrap_err(), StoreError::Malformed { .. }));
}

#[test]
fn save_creates_parent_dirs_and_roundtrips() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let document: Document = serde_json::from_value(json!({
        "_comment": "kept",
        "members": [
            { "id": "m1", "role": "parent", "last_name": "Dvořák", "health": { "allergies": null } }
        ]
    }))
    .unwrap();

    store.save(&document).unwrap();
    assert!(store.data_exists());

    let text = fs::read_to_string(store.data_path()).unwrap();
    assert!(text.contains("Dvořák"));
    assert!(text.ends_with("}\n"));

    let loaded = store.load().unwrap();
    assert_eq!(loaded, document);
}

#[test]
fn save_fully_overwrites_previous_content() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(store.data_path(), "x".repeat(4096)).unwrap();

    store.save(&Document::default()).unwrap();
    let loaded = store.load().unwrap();
    assert!(loaded.members.is_empty());
}

#[test]
fn template_missing_lists_searched_paths() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(StoreConfig {
        data_file: dir.path().join("data.json"),
        template_candidates: vec![dir.path().join("a.json"), dir.path().join("b.json")],
    });

    match store.load_template().unwrap_err() {
        StoreError::TemplateMissing(searched) => assert_eq!(searched.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn template_uses_first_existing_candidate() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("b.json"),
        json!({ "members": [{ "id": "tmpl-b", "role": "other" }] }).to_string(),
    )
    .unwrap();
    fs::write(
        dir.path().join("c.json"),
        json!({ "members": [{ "id": "tmpl-c", "role": "other" }] }).to_string(),
    )
    .unwrap();
    let store = JsonFileStore::new(StoreConfig {
        data_file: dir.path().join("data.json"),
        template_candidates: vec![
            dir.path().join("a.json"),
            dir.path().join("b.json"),
            dir.path().join("c.json"),
        ],
    });

    let template = store.load_template().unwrap();
    assert_eq!(template.member_ids(), vec!["tmpl-b"]);
}

#[test]
fn bundled_template_is_a_valid_document() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../references/personal_data_template.json");
    let store = JsonFileStore::new(StoreConfig::new("/nonexistent/data.json", path));

    let template = store.load_template().unwrap();
    assert!(template.find_by_role("parent").is_some());
    assert!(template.find_by_role("child").is_some());
}
