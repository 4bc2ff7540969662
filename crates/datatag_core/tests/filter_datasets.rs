use datatag_core::{filter_datasets, parse_datasets, Annotation, Dataset};

fn fixture_datasets() -> Vec<Dataset> {
    parse_datasets(include_str!("fixtures/datasets.json")).unwrap()
}

fn ids<'a>(datasets: &[&'a Dataset]) -> Vec<&'a str> {
    datasets.iter().map(|dataset| dataset.id.as_str()).collect()
}

#[test]
fn fixture_has_seven_datasets() {
    assert_eq!(fixture_datasets().len(), 7);
}

#[test]
fn empty_lists_return_every_dataset_in_order() {
    let datasets = fixture_datasets();
    let visible = filter_datasets(&datasets, &[], &[], &[]);
    assert_eq!(visible.len(), datasets.len());
    for (shown, original) in visible.iter().zip(datasets.iter()) {
        assert_eq!(*shown, original);
    }
}

#[test]
fn t1_weighted_keyword_selects_both_t1_datasets_in_order() {
    let datasets = fixture_datasets();
    let visible = filter_datasets(
        &datasets,
        &[Annotation::manual("t1-weighted", "T1-weighted")],
        &[],
        &[],
    );
    assert_eq!(ids(&visible), vec!["ds-mri-t1-1", "ds-mri-t1-2"]);
}

#[test]
fn lists_combine_conjunctively() {
    let datasets = fixture_datasets();
    let visible = filter_datasets(
        &datasets,
        &[Annotation::manual("t1-weighted", "T1-weighted")],
        &[Annotation::manual("adult", "Adult")],
        &[],
    );
    assert_eq!(ids(&visible), vec!["ds-mri-t1-1"]);
}

#[test]
fn exclusion_tags_must_be_present() {
    let datasets = fixture_datasets();
    let visible = filter_datasets(&datasets, &[], &[], &[Annotation::manual("smoker", "Smoker")]);
    assert_eq!(ids(&visible), vec!["ds-mri-t1-1", "ds-fmri-rest-1"]);
}

#[test]
fn every_tag_within_one_list_is_required() {
    let datasets = fixture_datasets();
    let visible = filter_datasets(
        &datasets,
        &[],
        &[
            Annotation::manual("adult", "Adult"),
            Annotation::manual("older-adult", "Older adult"),
        ],
        &[],
    );
    assert_eq!(ids(&visible), vec!["ds-dti-1"]);
}

#[test]
fn unknown_tag_hides_everything() {
    let datasets = fixture_datasets();
    let visible = filter_datasets(&datasets, &[Annotation::manual("pet", "PET")], &[], &[]);
    assert!(visible.is_empty());
}
