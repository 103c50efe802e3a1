//! Document persistence contracts and JSON file implementation.
//!
//! # Responsibility
//! - Define the load/save/template contract used by the service layer.
//! - Isolate filesystem and serialization details from command handling.
//!
//! # Invariants
//! - Store APIs return semantic errors (`FileNotFound`, `Malformed`,
//!   `TemplateMissing`) in addition to transport I/O errors.
//! - Saves fully overwrite the target; they are not atomic.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::model::household::Document;

mod json_store;

pub use json_store::{to_pretty_json, JsonFileStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for document and template access.
#[derive(Debug)]
pub enum StoreError {
    /// Data file does not exist.
    FileNotFound(PathBuf),
    /// File exists but is not a valid document.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// No template candidate exists.
    TemplateMissing(Vec<PathBuf>),
    /// Any other filesystem failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "data file not found: {}", path.display()),
            Self::Malformed { path, source } => {
                write!(f, "malformed document `{}`: {source}", path.display())
            }
            Self::TemplateMissing(searched) => {
                let searched = searched
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "template file not found (searched: {searched})")
            }
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::FileNotFound(_) | Self::TemplateMissing(_) => None,
        }
    }
}

/// Storage interface for the household document.
pub trait DocumentStore {
    /// Location of the data document, for user-facing messages.
    fn data_path(&self) -> &Path;
    fn data_exists(&self) -> bool;
    fn load(&self) -> StoreResult<Document>;
    fn save(&self, document: &Document) -> StoreResult<()>;
    fn load_template(&self) -> StoreResult<Document>;
}
