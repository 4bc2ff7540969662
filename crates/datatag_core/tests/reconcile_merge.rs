use datatag_core::{
    apply_extraction, merge_annotations, parse_taxonomy, resolve_label, ActiveFilterState,
    Annotation, ExtractionCandidate, Taxonomy, TaxonomyNode,
};

fn fixture_taxonomy() -> Taxonomy {
    parse_taxonomy(include_str!("fixtures/taxonomy.json")).unwrap()
}

fn mri_taxonomy() -> Taxonomy {
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

fn tag(id: &str, text: &str) -> Annotation {
    Annotation::new(id, id, text)
}

fn term_candidate(text: &str, term: &str) -> ExtractionCandidate {
    ExtractionCandidate {
        text: text.to_string(),
        term: term.to_string(),
        ..ExtractionCandidate::default()
    }
}

#[test]
fn merge_is_idempotent() {
    let existing = vec![tag("a", ""), tag("b", "")];
    let candidates = vec![tag("c", "1"), tag("a", "2"), tag("d", "3"), tag("c", "4")];

    let once = merge_annotations(&existing, candidates.clone());
    let twice = merge_annotations(&once, candidates);
    assert_eq!(once, twice);
}

#[test]
fn merge_never_drops_existing_elements() {
    let existing = vec![tag("x", "kept"), tag("y", "kept"), tag("z", "kept")];
    let merged = merge_annotations(
        &existing,
        vec![tag("y", "replacement?"), tag("x", "replacement?")],
    );
    assert_eq!(&merged[..3], existing.as_slice());
    assert_eq!(merged.len(), 3);
}

#[test]
fn merge_is_deterministic_across_calls() {
    let existing = vec![tag("m", "")];
    let candidates: Vec<Annotation> = (0..50).map(|i| tag(&format!("t{i}"), "")).collect();
    let first = merge_annotations(&existing, candidates.clone());
    for _ in 0..5 {
        assert_eq!(merge_annotations(&existing, candidates.clone()), first);
    }
    assert_eq!(first[1].id, "t0");
    assert_eq!(first[50].id, "t49");
}

#[test]
fn non_empty_term_never_consults_subcategory_or_category() {
    let taxonomy = fixture_taxonomy();
    let candidate = ExtractionCandidate {
        text: "scan".to_string(),
        category: "MRI".to_string(),
        subcategory: "Structural MRI".to_string(),
        term: "Not a real term".to_string(),
        ..ExtractionCandidate::default()
    };
    let resolved = resolve_label(&candidate, &taxonomy);
    assert_eq!(resolved.id, "Not a real term");
    assert!(!resolved.mapped);
}

#[test]
fn resolution_does_not_mutate_taxonomy() {
    let taxonomy = fixture_taxonomy();
    let before = taxonomy.roots().to_vec();
    let _ = resolve_label(&term_candidate("x", "unknown"), &taxonomy);
    let _ = apply_extraction(&[term_candidate("T1", "T1-weighted")], &taxonomy);
    assert_eq!(taxonomy.roots(), before.as_slice());
}

#[test]
fn t1_candidate_lands_only_in_keywords() {
    let taxonomy = mri_taxonomy();
    let candidate = ExtractionCandidate {
        keyword: true,
        ..term_candidate("T1", "T1-weighted")
    };

    let routed = apply_extraction(&[candidate], &taxonomy);
    assert_eq!(
        routed.keywords,
        vec![Annotation {
            id: "t1-weighted".to_string(),
            label: "T1-weighted".to_string(),
            comment: String::new(),
            text: "T1".to_string(),
        }]
    );
    assert!(routed.inclusions.is_empty());
    assert!(routed.exclusions.is_empty());
}

#[test]
fn two_candidates_for_one_term_yield_one_entry_per_list() {
    let taxonomy = mri_taxonomy();
    let candidates = vec![
        ExtractionCandidate {
            keyword: true,
            ..term_candidate("T1", "T1-weighted")
        },
        ExtractionCandidate {
            inclusion: true,
            ..term_candidate("T1w", "T1-weighted")
        },
    ];

    let mut state = ActiveFilterState::new();
    apply_extraction(&candidates, &taxonomy).merge_into(&mut state);

    assert_eq!(state.keywords().len(), 1);
    assert_eq!(state.inclusions().len(), 1);
    assert_eq!(state.keywords()[0].id, "t1-weighted");
    assert_eq!(state.inclusions()[0].id, "t1-weighted");
    assert!(state.exclusions().is_empty());
}

#[test]
fn duplicate_candidates_in_one_list_keep_first_text() {
    let taxonomy = mri_taxonomy();
    let candidates = vec![
        ExtractionCandidate {
            keyword: true,
            ..term_candidate("first", "T1-weighted")
        },
        ExtractionCandidate {
            keyword: true,
            ..term_candidate("second", "T1-weighted")
        },
    ];
    let routed = apply_extraction(&candidates, &taxonomy);
    assert_eq!(routed.keywords.len(), 1);
    assert_eq!(routed.keywords[0].text, "first");
}

#[test]
fn merge_into_existing_state_skips_already_applied_tags() {
    let taxonomy = mri_taxonomy();
    let mut state = ActiveFilterState::new();
    state.merge(
        datatag_core::TagList::Keyword,
        vec![Annotation::manual("t1-weighted", "T1-weighted")],
    );

    let routed = apply_extraction(
        &[ExtractionCandidate {
            keyword: true,
            ..term_candidate("T1", "T1-weighted")
        }],
        &taxonomy,
    );
    let summary = routed.merge_into(&mut state);
    assert_eq!(summary.total(), 0);
    assert_eq!(state.keywords().len(), 1);
    assert!(state.keywords()[0].is_manual());
}

#[test]
fn unmappable_candidate_becomes_pseudo_tag_in_state() {
    let taxonomy = fixture_taxonomy();
    let routed = apply_extraction(
        &[ExtractionCandidate {
            exclusion: true,
            subcategory: "Claustrophobia".to_string(),
            text: "claustrophobic".to_string(),
            ..ExtractionCandidate::default()
        }],
        &taxonomy,
    );
    assert_eq!(routed.unmapped, 1);
    assert_eq!(routed.exclusions[0].id, "Claustrophobia");
    assert_eq!(routed.exclusions[0].label, "Claustrophobia");
}
