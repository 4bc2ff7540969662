//! Static catalog loading: taxonomy tree and dataset collection.
//!
//! # Responsibility
//! - Decode the taxonomy and dataset JSON documents into domain types.
//! - Enforce load-time invariants (unique node ids, unique dataset ids,
//!   no duplicate tag ids within a dataset list).
//!
//! # Invariants
//! - Loading never mutates its sources.
//! - Duplicate tag ids inside one stored list are collapsed (first wins) and
//!   reported in the log rather than rejected.

use crate::model::dataset::Dataset;
use crate::model::taxonomy::{Taxonomy, TaxonomyError, TaxonomyNode};
use crate::reconcile::merge::dedup_by_id;
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for catalog loading.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog load failures.
#[derive(Debug)]
pub enum CatalogError {
    /// Source file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Source content is not valid JSON of the expected shape.
    Json(serde_json::Error),
    /// Taxonomy structure is invalid.
    Taxonomy(TaxonomyError),
    /// Two datasets share one id.
    DuplicateDatasetId(String),
    /// A dataset carries a blank id.
    EmptyDatasetId,
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read catalog `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid catalog json: {err}"),
            Self::Taxonomy(err) => write!(f, "{err}"),
            Self::DuplicateDatasetId(id) => write!(f, "duplicate dataset id: {id}"),
            Self::EmptyDatasetId => write!(f, "dataset id must not be blank"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Taxonomy(err) => Some(err),
            Self::DuplicateDatasetId(_) => None,
            Self::EmptyDatasetId => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<TaxonomyError> for CatalogError {
    fn from(value: TaxonomyError) -> Self {
        Self::Taxonomy(value)
    }
}

/// Parses a taxonomy document: a JSON array of root nodes.
pub fn parse_taxonomy(raw: &str) -> CatalogResult<Taxonomy> {
    let roots: Vec<TaxonomyNode> = serde_json::from_str(raw)?;
    Ok(Taxonomy::try_new(roots)?)
}

/// Parses a dataset document: a JSON array of dataset objects.
pub fn parse_datasets(raw: &str) -> CatalogResult<Vec<Dataset>> {
    let mut datasets: Vec<Dataset> = serde_json::from_str(raw)?;
    let mut seen = HashSet::new();
    for dataset in &mut datasets {
        if dataset.id.trim().is_empty() {
            return Err(CatalogError::EmptyDatasetId);
        }
        if !seen.insert(dataset.id.clone()) {
            return Err(CatalogError::DuplicateDatasetId(dataset.id.clone()));
        }
        collapse_duplicate_tags(dataset);
    }
    Ok(datasets)
}

/// Loads the taxonomy file.
pub fn load_taxonomy(path: impl AsRef<Path>) -> CatalogResult<Taxonomy> {
    let path = path.as_ref();
    let taxonomy = read_source(path).and_then(|raw| parse_taxonomy(&raw));
    match &taxonomy {
        Ok(taxonomy) => info!(
            "event=catalog_load module=catalog status=ok kind=taxonomy nodes={}",
            taxonomy.len()
        ),
        Err(err) => error!(
            "event=catalog_load module=catalog status=error kind=taxonomy error={}",
            err
        ),
    }
    taxonomy
}

/// Loads the dataset catalog file.
pub fn load_datasets(path: impl AsRef<Path>) -> CatalogResult<Vec<Dataset>> {
    let path = path.as_ref();
    let datasets = read_source(path).and_then(|raw| parse_datasets(&raw));
    match &datasets {
        Ok(datasets) => info!(
            "event=catalog_load module=catalog status=ok kind=datasets count={}",
            datasets.len()
        ),
        Err(err) => error!(
            "event=catalog_load module=catalog status=error kind=datasets error={}",
            err
        ),
    }
    datasets
}

fn read_source(path: &Path) -> CatalogResult<String> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn collapse_duplicate_tags(dataset: &mut Dataset) {
    let before = dataset.keywords.len()
        + dataset.inclusion_terms.len()
        + dataset.exclusion_terms.len();
    dataset.keywords = dedup_by_id(std::mem::take(&mut dataset.keywords));
    dataset.inclusion_terms = dedup_by_id(std::mem::take(&mut dataset.inclusion_terms));
    dataset.exclusion_terms = dedup_by_id(std::mem::take(&mut dataset.exclusion_terms));
    let after = dataset.keywords.len()
        + dataset.inclusion_terms.len()
        + dataset.exclusion_terms.len();
    if after != before {
        warn!(
            "event=catalog_load module=catalog status=degraded kind=datasets dataset_id={} dropped_duplicate_tags={}",
            dataset.id,
            before - after
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_datasets, parse_taxonomy, CatalogError};

    #[test]
    fn taxonomy_children_default_to_empty() {
        let taxonomy = parse_taxonomy(r#"[{ "id": "mri", "label": "MRI" }]"#).unwrap();
        assert_eq!(taxonomy.len(), 1);
        assert!(taxonomy.roots()[0].children.is_empty());
    }

    #[test]
    fn duplicate_taxonomy_ids_fail_load() {
        let err = parse_taxonomy(
            r#"[{ "id": "a", "label": "A", "children": [{ "id": "a", "label": "B" }] }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Taxonomy(_)));
    }

    #[test]
    fn duplicate_dataset_ids_fail_load() {
        let err = parse_datasets(r#"[{ "id": "ds" }, { "id": "ds" }]"#).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateDatasetId(id) if id == "ds"));
    }

    #[test]
    fn duplicate_tags_within_a_list_are_collapsed() {
        let datasets = parse_datasets(
            r#"[{
                "id": "ds",
                "keywords": [
                    { "id": "k", "label": "K", "text": "first" },
                    { "id": "k", "label": "K", "text": "second" }
                ]
            }]"#,
        )
        .unwrap();
        assert_eq!(datasets[0].keywords.len(), 1);
        assert_eq!(datasets[0].keywords[0].text, "first");
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            parse_datasets("{ not json").unwrap_err(),
            CatalogError::Json(_)
        ));
    }
}
