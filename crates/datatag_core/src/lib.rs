//! Core domain logic for taxonomy-based dataset tagging.
//! This crate is the single source of truth for reconciliation and filter
//! invariants; CLI and UI layers only orchestrate it.

pub mod catalog;
pub mod config;
pub mod db;
pub mod extract;
pub mod filter;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use catalog::{
    load_datasets, load_taxonomy, parse_datasets, parse_taxonomy, CatalogError, CatalogResult,
};
pub use config::{load_config, parse_config, AppConfig, ConfigError, ExtractorConfig, StoreConfig};
pub use extract::{
    AnnotationExtractor, CandidateRouting, ExtractError, ExtractResult, LabelMatchExtractor,
    StaticExtractor, SubprocessExtractor,
};
pub use filter::{filter_by_state, filter_datasets};
pub use gateway::{
    AnnotationUpdate, GatewayError, GatewayResult, JsonFileGateway, MemoryGateway,
    PersistenceGateway,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::annotation::{Annotation, TagList};
pub use model::candidate::{coerce_candidates, ExtractionCandidate};
pub use model::dataset::Dataset;
pub use model::filter_state::ActiveFilterState;
pub use model::taxonomy::{Taxonomy, TaxonomyEntry, TaxonomyError, TaxonomyNode};
pub use reconcile::{
    apply_extraction, dedup_by_id, merge_annotations, resolve_label, MergeSummary,
    ResolvedLabel, RoutedAnnotations,
};
pub use repo::annotation_repo::SqliteAnnotationRepository;
pub use service::session::{AnnotationSession, AppState, SessionError, SessionResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
