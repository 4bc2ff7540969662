//! Persistence gateway contract for committed annotation sets.
//!
//! # Responsibility
//! - Define the full-overwrite write contract used by the commit step.
//! - Provide the JSON dataset-file implementation.
//!
//! # Invariants
//! - A write replaces all three tag sets of one dataset; it never merges.
//! - Gateways do not retry; failures surface to the caller unchanged.

pub mod json_file;

use crate::db::DbError;
use crate::model::annotation::{Annotation, TagList};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use json_file::JsonFileGateway;

/// Result type for gateway writes.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Persistence failures surfaced as a failed commit.
#[derive(Debug)]
pub enum GatewayError {
    /// Backing file could not be read or written.
    Io(std::io::Error),
    /// Backing file content is not valid JSON of the expected shape.
    Json(serde_json::Error),
    /// SQLite store failure.
    Db(DbError),
    /// Backing store has no dataset with this id.
    DatasetNotFound(String),
    /// Backing store content is structurally invalid.
    InvalidData(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "annotation store io failure: {err}"),
            Self::Json(err) => write!(f, "annotation store json failure: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DatasetNotFound(id) => write!(f, "dataset not found in store: {id}"),
            Self::InvalidData(message) => write!(f, "invalid annotation store data: {message}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DatasetNotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Full-field overwrite request for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationUpdate {
    pub dataset_id: String,
    pub keywords: Vec<Annotation>,
    pub inclusion_terms: Vec<Annotation>,
    pub exclusion_terms: Vec<Annotation>,
}

impl AnnotationUpdate {
    pub fn tags(&self, list: TagList) -> &[Annotation] {
        match list {
            TagList::Keyword => &self.keywords,
            TagList::Inclusion => &self.inclusion_terms,
            TagList::Exclusion => &self.exclusion_terms,
        }
    }
}

/// Writes committed tag sets to a backing store.
pub trait PersistenceGateway {
    /// Overwrites the three tag sets of `update.dataset_id`.
    fn write_annotations(&mut self, update: &AnnotationUpdate) -> GatewayResult<()>;
}

impl<T: PersistenceGateway + ?Sized> PersistenceGateway for Box<T> {
    fn write_annotations(&mut self, update: &AnnotationUpdate) -> GatewayResult<()> {
        (**self).write_annotations(update)
    }
}

/// Gateway that records writes in memory, for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    writes: Vec<AnnotationUpdate>,
    fail_next: Option<String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write fail with `InvalidData(message)`.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Writes accepted so far, oldest first.
    pub fn writes(&self) -> &[AnnotationUpdate] {
        &self.writes
    }
}

impl PersistenceGateway for MemoryGateway {
    fn write_annotations(&mut self, update: &AnnotationUpdate) -> GatewayResult<()> {
        if let Some(message) = self.fail_next.take() {
            return Err(GatewayError::InvalidData(message));
        }
        self.writes.push(update.clone());
        Ok(())
    }
}
