//! Active Filter State: the three working tag lists.
//!
//! # Responsibility
//! - Hold the keyword/inclusion/exclusion lists being edited for a dataset,
//!   or constraining the dataset list when not editing.
//!
//! # Invariants
//! - No list contains two annotations with the same id.
//! - Merges never drop existing entries.

use crate::model::annotation::{Annotation, TagList};
use crate::model::dataset::Dataset;
use crate::reconcile::merge::{dedup_by_id, merge_annotations};

/// Working tag lists for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilterState {
    keywords: Vec<Annotation>,
    inclusions: Vec<Annotation>,
    exclusions: Vec<Annotation>,
}

impl ActiveFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the working lists from a dataset's stored sets.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            keywords: dedup_by_id(dataset.keywords.clone()),
            inclusions: dedup_by_id(dataset.inclusion_terms.clone()),
            exclusions: dedup_by_id(dataset.exclusion_terms.clone()),
        }
    }

    pub fn list(&self, list: TagList) -> &[Annotation] {
        match list {
            TagList::Keyword => &self.keywords,
            TagList::Inclusion => &self.inclusions,
            TagList::Exclusion => &self.exclusions,
        }
    }

    pub fn keywords(&self) -> &[Annotation] {
        &self.keywords
    }

    pub fn inclusions(&self) -> &[Annotation] {
        &self.inclusions
    }

    pub fn exclusions(&self) -> &[Annotation] {
        &self.exclusions
    }

    /// Merges candidates into one list and returns how many were appended.
    pub fn merge<I>(&mut self, list: TagList, candidates: I) -> usize
    where
        I: IntoIterator<Item = Annotation>,
    {
        let slot = self.slot_mut(list);
        let before = slot.len();
        *slot = merge_annotations(slot, candidates);
        slot.len() - before
    }

    /// Removes the tag with `tag_id`; returns whether anything was removed.
    pub fn remove(&mut self, list: TagList, tag_id: &str) -> bool {
        let slot = self.slot_mut(list);
        let before = slot.len();
        slot.retain(|tag| tag.id != tag_id);
        slot.len() != before
    }

    pub fn clear(&mut self) {
        self.keywords.clear();
        self.inclusions.clear();
        self.exclusions.clear();
    }

    /// Returns whether all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.inclusions.is_empty() && self.exclusions.is_empty()
    }

    fn slot_mut(&mut self, list: TagList) -> &mut Vec<Annotation> {
        match list {
            TagList::Keyword => &mut self.keywords,
            TagList::Inclusion => &mut self.inclusions,
            TagList::Exclusion => &mut self.exclusions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActiveFilterState;
    use crate::model::annotation::{Annotation, TagList};
    use crate::model::dataset::Dataset;

    #[test]
    fn seeding_from_dataset_copies_each_list() {
        let mut dataset = Dataset::new("ds", "Dataset");
        dataset.keywords = vec![Annotation::manual("k", "K"), Annotation::manual("k", "K")];
        dataset.exclusion_terms = vec![Annotation::manual("e", "E")];

        let state = ActiveFilterState::from_dataset(&dataset);
        assert_eq!(state.keywords().len(), 1);
        assert!(state.inclusions().is_empty());
        assert_eq!(state.exclusions()[0].id, "e");
    }

    #[test]
    fn merge_reports_appended_count_and_remove_drops_by_id() {
        let mut state = ActiveFilterState::new();
        let added = state.merge(
            TagList::Inclusion,
            vec![Annotation::manual("a", "A"), Annotation::manual("a", "A2")],
        );
        assert_eq!(added, 1);
        assert_eq!(state.merge(TagList::Inclusion, vec![Annotation::manual("a", "A")]), 0);

        assert!(state.remove(TagList::Inclusion, "a"));
        assert!(!state.remove(TagList::Inclusion, "a"));
        assert!(state.is_empty());
    }
}
