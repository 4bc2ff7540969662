//! Reconciliation engine: extractor candidates -> canonical annotations.
//!
//! # Responsibility
//! - Resolve candidate labels to taxonomy node ids.
//! - Route annotations into the keyword/inclusion/exclusion outputs.
//! - Merge routed outputs into the Active Filter State without duplicates.
//!
//! # Invariants
//! - Resolution never fails; unmapped labels become pseudo-tags.
//! - The three routing flags are independent.
//! - Each output is deduplicated by id, first occurrence wins.
//! - Candidates with blank labels and blank text produce no annotation;
//!   they are counted as unmapped.

pub mod merge;
pub mod resolve;

use crate::model::annotation::{Annotation, TagList};
use crate::model::candidate::ExtractionCandidate;
use crate::model::filter_state::ActiveFilterState;
use crate::model::taxonomy::Taxonomy;
use log::debug;

pub use merge::{dedup_by_id, merge_annotations};
pub use resolve::{resolve_label, ResolvedLabel};

/// Annotations routed from one extraction, per list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedAnnotations {
    pub keywords: Vec<Annotation>,
    pub inclusions: Vec<Annotation>,
    pub exclusions: Vec<Annotation>,
    /// Candidates whose label did not map onto a taxonomy node.
    pub unmapped: usize,
}

impl RoutedAnnotations {
    pub fn list(&self, list: TagList) -> &[Annotation] {
        match list {
            TagList::Keyword => &self.keywords,
            TagList::Inclusion => &self.inclusions,
            TagList::Exclusion => &self.exclusions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.inclusions.is_empty() && self.exclusions.is_empty()
    }

    /// Merges every routed list into the working state.
    pub fn merge_into(&self, state: &mut ActiveFilterState) -> MergeSummary {
        MergeSummary {
            keywords_added: state.merge(TagList::Keyword, self.keywords.iter().cloned()),
            inclusions_added: state.merge(TagList::Inclusion, self.inclusions.iter().cloned()),
            exclusions_added: state.merge(TagList::Exclusion, self.exclusions.iter().cloned()),
        }
    }
}

/// Counts of annotations actually appended by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub keywords_added: usize,
    pub inclusions_added: usize,
    pub exclusions_added: usize,
}

impl MergeSummary {
    pub fn total(&self) -> usize {
        self.keywords_added + self.inclusions_added + self.exclusions_added
    }
}

/// Turns candidates into routed, per-list deduplicated annotations.
pub fn apply_extraction(
    candidates: &[ExtractionCandidate],
    taxonomy: &Taxonomy,
) -> RoutedAnnotations {
    let mut keywords = Vec::new();
    let mut inclusions = Vec::new();
    let mut exclusions = Vec::new();
    let mut unmapped = 0;

    for candidate in candidates {
        let resolved = resolve_label(candidate, taxonomy);
        if !resolved.mapped {
            unmapped += 1;
        }
        // Nothing to key a tag on: every label and the text are blank.
        if resolved.id.trim().is_empty() {
            continue;
        }
        let annotation = Annotation::new(resolved.id, resolved.label, candidate.text.clone());
        if candidate.keyword {
            keywords.push(annotation.clone());
        }
        if candidate.inclusion {
            inclusions.push(annotation.clone());
        }
        if candidate.exclusion {
            exclusions.push(annotation);
        }
    }

    let routed = RoutedAnnotations {
        keywords: dedup_by_id(keywords),
        inclusions: dedup_by_id(inclusions),
        exclusions: dedup_by_id(exclusions),
        unmapped,
    };
    debug!(
        "event=reconcile module=reconcile status=ok candidates={} keywords={} inclusions={} exclusions={} unmapped={}",
        candidates.len(),
        routed.keywords.len(),
        routed.inclusions.len(),
        routed.exclusions.len(),
        routed.unmapped
    );
    routed
}
