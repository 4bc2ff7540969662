//! Order-preserving annotation merge.
//!
//! # Invariants
//! - Every existing element is kept, in its original order.
//! - A candidate is appended only when its id is not yet in the result.
//! - Output depends only on input order, never on hash iteration order.

use crate::model::annotation::Annotation;
use std::collections::HashSet;

/// Merges `candidates` into `existing`, skipping ids already present.
///
/// Among candidates sharing an id, the first one wins.
pub fn merge_annotations<I>(existing: &[Annotation], candidates: I) -> Vec<Annotation>
where
    I: IntoIterator<Item = Annotation>,
{
    let mut merged = existing.to_vec();
    let mut seen: HashSet<String> = existing.iter().map(|tag| tag.id.clone()).collect();
    for candidate in candidates {
        if seen.insert(candidate.id.clone()) {
            merged.push(candidate);
        }
    }
    merged
}

/// Drops later annotations whose id was already seen.
pub fn dedup_by_id(annotations: Vec<Annotation>) -> Vec<Annotation> {
    merge_annotations(&[], annotations)
}

#[cfg(test)]
mod tests {
    use super::{dedup_by_id, merge_annotations};
    use crate::model::annotation::Annotation;

    fn tag(id: &str, text: &str) -> Annotation {
        Annotation::new(id, id.to_uppercase(), text)
    }

    #[test]
    fn appends_new_ids_after_existing() {
        let existing = vec![tag("b", ""), tag("a", "")];
        let merged = merge_annotations(&existing, vec![tag("c", "x"), tag("a", "y")]);
        let ids: Vec<&str> = merged.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(merged[1].text, "");
    }

    #[test]
    fn first_candidate_wins_on_collision() {
        let merged = merge_annotations(&[], vec![tag("a", "first"), tag("a", "second")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "first");
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let deduped = dedup_by_id(vec![tag("x", "1"), tag("y", "2"), tag("x", "3")]);
        assert_eq!(deduped, vec![tag("x", "1"), tag("y", "2")]);
    }
}
