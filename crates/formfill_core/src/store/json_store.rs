//! JSON file backed document store.
//!
//! # Invariants
//! - Output is two-space indented, keeps key insertion order, writes
//!   non-ASCII characters literally and ends with a newline.
//! - Missing parent directories are created before writing.

use super::{DocumentStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::model::household::Document;
use log::{error, info};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Document store reading and writing plain JSON files.
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl DocumentStore for JsonFileStore {
    fn data_path(&self) -> &Path {
        &self.config.data_file
    }

    fn data_exists(&self) -> bool {
        self.config.data_file.exists()
    }

    fn load(&self) -> StoreResult<Document> {
        let started_at = Instant::now();
        let path = &self.config.data_file;

        match read_document(path) {
            Ok(document) => {
                info!(
                    "event=document_load module=store status=ok duration_ms={} members={}",
                    started_at.elapsed().as_millis(),
                    document.members.len()
                );
                Ok(document)
            }
            Err(err) => {
                error!(
                    "event=document_load module=store status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        let started_at = Instant::now();
        let path = &self.config.data_file;

        match write_document(path, document) {
            Ok(()) => {
                info!(
                    "event=document_save module=store status=ok duration_ms={} members={}",
                    started_at.elapsed().as_millis(),
                    document.members.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=document_save module=store status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    fn load_template(&self) -> StoreResult<Document> {
        let Some(path) = self
            .config
            .template_candidates
            .iter()
            .find(|candidate| candidate.is_file())
        else {
            info!(
                "event=template_load module=store status=missing candidates={}",
                self.config.template_candidates.len()
            );
            return Err(StoreError::TemplateMissing(
                self.config.template_candidates.clone(),
            ));
        };

        let template = read_document(path)?;
        info!(
            "event=template_load module=store status=ok members={}",
            template.members.len()
        );
        Ok(template)
    }
}

/// Serializes a value in the document's on-disk format.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn read_document(path: &Path) -> StoreResult<Document> {
    let raw = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => StoreError::FileNotFound(path.to_path_buf()),
        _ => io_error(path, err),
    })?;

    serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(path: &Path, document: &Document) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }

    let mut body = to_pretty_json(document).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    body.push('\n');

    std::fs::write(path, body).map_err(|err| io_error(path, err))
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: PathBuf::from(path),
        source,
    }
}

fn error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::FileNotFound(_) => "file_not_found",
        StoreError::Malformed { .. } => "malformed",
        StoreError::TemplateMissing(_) => "template_missing",
        StoreError::Io { .. } => "io",
    }
}

#[cfg(test)]
mod tests {
    use super::to_pretty_json;
    use crate::model::household::Document;
    use serde_json::json;

    #[test]
    fn pretty_json_keeps_non_ascii_and_key_order() {
        let document: Document = serde_json::from_value(json!({
            "members": [{ "id": "m1", "last_name": "Novák", "a": 1 }]
        }))
        .expect("fixture should deserialize");
        let text = to_pretty_json(&document).expect("document should serialize");
        assert!(text.contains("\"Novák\""));
        assert!(text.contains("\n  \"members\""));
        let id_at = text.find("\"id\"").expect("id key present");
        let name_at = text.find("\"last_name\"").expect("last_name key present");
        let a_at = text.find("\"a\"").expect("a key present");
        assert!(id_at < name_at && name_at < a_at);
    }
}
