//! Candidate label resolution against the taxonomy label index.
//!
//! # Invariants
//! - Level precedence is term, then subcategory, then category.
//! - The first non-empty level is the only one inspected.
//! - Unmapped labels degrade to a pseudo-tag keyed by the raw label.

use crate::model::candidate::ExtractionCandidate;
use crate::model::taxonomy::Taxonomy;

/// Canonical tag identity resolved for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabel {
    pub id: String,
    pub label: String,
    /// `false` when the id is a pseudo-tag not present in the taxonomy.
    pub mapped: bool,
}

/// Resolves the candidate's most specific non-empty label to a node.
///
/// When every label is empty, the candidate `text` is used as the raw label.
pub fn resolve_label(candidate: &ExtractionCandidate, taxonomy: &Taxonomy) -> ResolvedLabel {
    let raw = binding_label(candidate);
    match taxonomy.id_for_label(raw) {
        Some(id) => ResolvedLabel {
            id: id.to_string(),
            label: raw.to_string(),
            mapped: true,
        },
        None => ResolvedLabel {
            id: raw.to_string(),
            label: raw.to_string(),
            mapped: false,
        },
    }
}

fn binding_label(candidate: &ExtractionCandidate) -> &str {
    [
        candidate.term.as_str(),
        candidate.subcategory.as_str(),
        candidate.category.as_str(),
    ]
    .into_iter()
    .find(|label| !label.is_empty())
    .unwrap_or(candidate.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::resolve_label;
    use crate::model::candidate::ExtractionCandidate;
    use crate::model::taxonomy::{Taxonomy, TaxonomyNode};

    fn taxonomy() -> Taxonomy {
        Taxonomy::try_new(vec![TaxonomyNode::branch(
            "mri",
            "MRI",
            vec![TaxonomyNode::branch(
                "structural-mri",
                "Structural MRI",
                vec![TaxonomyNode::leaf("t1-weighted", "T1-weighted")],
            )],
        )])
        .unwrap()
    }

    fn candidate(category: &str, subcategory: &str, term: &str) -> ExtractionCandidate {
        ExtractionCandidate {
            text: "span".to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            term: term.to_string(),
            ..ExtractionCandidate::default()
        }
    }

    #[test]
    fn term_takes_precedence() {
        let resolved = resolve_label(&candidate("MRI", "Structural MRI", "T1-weighted"), &taxonomy());
        assert_eq!(resolved.id, "t1-weighted");
        assert_eq!(resolved.label, "T1-weighted");
        assert!(resolved.mapped);
    }

    #[test]
    fn unknown_term_never_falls_back_to_subcategory() {
        let resolved = resolve_label(&candidate("MRI", "Structural MRI", "FLAIR"), &taxonomy());
        assert_eq!(resolved.id, "FLAIR");
        assert_eq!(resolved.label, "FLAIR");
        assert!(!resolved.mapped);
    }

    #[test]
    fn empty_levels_fall_through_in_order() {
        let taxonomy = taxonomy();
        assert_eq!(
            resolve_label(&candidate("MRI", "Structural MRI", ""), &taxonomy).id,
            "structural-mri"
        );
        assert_eq!(resolve_label(&candidate("MRI", "", ""), &taxonomy).id, "mri");
    }

    #[test]
    fn fully_empty_candidate_uses_text_as_pseudo_tag() {
        let resolved = resolve_label(&candidate("", "", ""), &taxonomy());
        assert_eq!(resolved.id, "span");
        assert!(!resolved.mapped);
    }
}
