//! Domain model for taxonomy-tagged datasets.
//!
//! # Responsibility
//! - Define the canonical records shared by reconciliation, filtering and
//!   persistence.
//! - Keep wire naming (`inclusionTerms`, `accessionNumber`, ...) at the serde
//!   boundary only.
//!
//! # Invariants
//! - Tag identity is the taxonomy node id carried by `Annotation::id`.
//! - Taxonomy trees are immutable once wrapped in `Taxonomy`.

pub mod annotation;
pub mod candidate;
pub mod dataset;
pub mod filter_state;
pub mod taxonomy;
