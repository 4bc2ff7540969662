//! Filter engine over the dataset collection.
//!
//! # Responsibility
//! - Compute which datasets remain visible for the active tag lists.
//!
//! # Invariants
//! - All three lists empty -> every dataset, in input order.
//! - Otherwise a dataset must carry every active tag of every list in the
//!   matching dataset set. Exclusion-list tags are required, not forbidden.
//! - Result order follows input order; there is no ranking.

use crate::model::annotation::{Annotation, TagList};
use crate::model::dataset::Dataset;
use crate::model::filter_state::ActiveFilterState;
use log::debug;

/// Returns datasets whose tag sets contain every active tag.
pub fn filter_datasets<'a>(
    datasets: &'a [Dataset],
    keyword_list: &[Annotation],
    inclusion_list: &[Annotation],
    exclusion_list: &[Annotation],
) -> Vec<&'a Dataset> {
    if keyword_list.is_empty() && inclusion_list.is_empty() && exclusion_list.is_empty() {
        return datasets.iter().collect();
    }

    let visible: Vec<&Dataset> = datasets
        .iter()
        .filter(|dataset| {
            contains_all(dataset, TagList::Keyword, keyword_list)
                && contains_all(dataset, TagList::Inclusion, inclusion_list)
                && contains_all(dataset, TagList::Exclusion, exclusion_list)
        })
        .collect();
    debug!(
        "event=filter module=filter status=ok total={} visible={} keywords={} inclusions={} exclusions={}",
        datasets.len(),
        visible.len(),
        keyword_list.len(),
        inclusion_list.len(),
        exclusion_list.len()
    );
    visible
}

/// Applies `filter_datasets` with the lists of an Active Filter State.
pub fn filter_by_state<'a>(datasets: &'a [Dataset], state: &ActiveFilterState) -> Vec<&'a Dataset> {
    filter_datasets(
        datasets,
        state.keywords(),
        state.inclusions(),
        state.exclusions(),
    )
}

fn contains_all(dataset: &Dataset, list: TagList, required: &[Annotation]) -> bool {
    required.iter().all(|tag| dataset.has_tag(list, &tag.id))
}

#[cfg(test)]
mod tests {
    use super::filter_datasets;
    use crate::model::annotation::Annotation;
    use crate::model::dataset::Dataset;

    fn dataset(id: &str, keywords: &[&str], exclusions: &[&str]) -> Dataset {
        let mut dataset = Dataset::new(id, id);
        dataset.keywords = keywords.iter().map(|k| Annotation::manual(*k, *k)).collect();
        dataset.exclusion_terms = exclusions
            .iter()
            .map(|e| Annotation::manual(*e, *e))
            .collect();
        dataset
    }

    #[test]
    fn and_within_list() {
        let datasets = vec![dataset("a", &["x", "y"], &[]), dataset("b", &["x"], &[])];
        let visible = filter_datasets(
            &datasets,
            &[Annotation::manual("x", "X"), Annotation::manual("y", "Y")],
            &[],
            &[],
        );
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "a");
    }

    #[test]
    fn exclusion_list_requires_presence() {
        let datasets = vec![dataset("a", &[], &["smokers"]), dataset("b", &[], &[])];
        let visible = filter_datasets(&datasets, &[], &[], &[Annotation::manual("smokers", "S")]);
        let ids: Vec<&str> = visible.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn lists_are_matched_against_their_own_set() {
        let datasets = vec![dataset("a", &["x"], &[])];
        let visible = filter_datasets(&datasets, &[], &[Annotation::manual("x", "X")], &[]);
        assert!(visible.is_empty());
    }
}
