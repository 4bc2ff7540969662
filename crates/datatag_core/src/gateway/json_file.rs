//! JSON dataset-file gateway.
//!
//! # Responsibility
//! - Rewrite the dataset catalog file with one dataset's new tag sets.
//!
//! # Invariants
//! - Fields other than the three tag sets are preserved as stored, including
//!   fields this crate does not model.
//! - The file is replaced via a sibling temp file and rename, so readers see
//!   either the old or the new catalog.

use super::{AnnotationUpdate, GatewayError, GatewayResult, PersistenceGateway};
use log::{error, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Writes commits back into a JSON array of dataset objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rewrite(&self, update: &AnnotationUpdate) -> GatewayResult<()> {
        let raw = fs::read_to_string(&self.path)?;
        let mut catalog: Value = serde_json::from_str(&raw)?;
        let entries = catalog.as_array_mut().ok_or_else(|| {
            GatewayError::InvalidData("dataset catalog must be a JSON array".to_string())
        })?;

        let entry = entries
            .iter_mut()
            .find(|entry| {
                entry.get("id").and_then(Value::as_str) == Some(update.dataset_id.as_str())
            })
            .and_then(Value::as_object_mut)
            .ok_or_else(|| GatewayError::DatasetNotFound(update.dataset_id.clone()))?;

        entry.insert("keywords".to_string(), serde_json::to_value(&update.keywords)?);
        entry.insert(
            "inclusionTerms".to_string(),
            serde_json::to_value(&update.inclusion_terms)?,
        );
        entry.insert(
            "exclusionTerms".to_string(),
            serde_json::to_value(&update.exclusion_terms)?,
        );

        let rendered = serde_json::to_string_pretty(&catalog)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, rendered)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn write_annotations(&mut self, update: &AnnotationUpdate) -> GatewayResult<()> {
        let started_at = Instant::now();
        match self.rewrite(update) {
            Ok(()) => {
                info!(
                    "event=commit module=gateway status=ok backend=json dataset_id={} keywords={} inclusions={} exclusions={} duration_ms={}",
                    update.dataset_id,
                    update.keywords.len(),
                    update.inclusion_terms.len(),
                    update.exclusion_terms.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=commit module=gateway status=error backend=json dataset_id={} duration_ms={} error={}",
                    update.dataset_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}
