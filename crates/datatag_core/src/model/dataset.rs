//! Dataset domain model.
//!
//! # Responsibility
//! - Define the dataset record and its three annotation sets.
//! - Provide wholesale replacement of tag sets for the commit path.
//!
//! # Invariants
//! - Within one tag set, no two annotations share an `id`.
//! - Tag sets are only replaced wholesale, never merged in place here.

use crate::model::annotation::{Annotation, TagList};
use serde::{Deserialize, Serialize};

/// Dataset record as stored in the dataset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<Annotation>,
    #[serde(default)]
    pub inclusion_terms: Vec<Annotation>,
    #[serde(default)]
    pub exclusion_terms: Vec<Annotation>,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub accession_number: String,
    #[serde(default)]
    pub doi: String,
    #[serde(default)]
    pub license: String,
}

impl Dataset {
    /// Creates an untagged dataset with empty metadata.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            keywords: Vec::new(),
            inclusion_terms: Vec::new(),
            exclusion_terms: Vec::new(),
            authors: String::new(),
            accession_number: String::new(),
            doi: String::new(),
            license: String::new(),
        }
    }

    /// Returns the tag set for one list.
    pub fn tags(&self, list: TagList) -> &[Annotation] {
        match list {
            TagList::Keyword => &self.keywords,
            TagList::Inclusion => &self.inclusion_terms,
            TagList::Exclusion => &self.exclusion_terms,
        }
    }

    /// Replaces the tag set for one list.
    pub fn replace_tags(&mut self, list: TagList, tags: Vec<Annotation>) {
        match list {
            TagList::Keyword => self.keywords = tags,
            TagList::Inclusion => self.inclusion_terms = tags,
            TagList::Exclusion => self.exclusion_terms = tags,
        }
    }

    /// Returns whether the given list carries a tag with `tag_id`.
    pub fn has_tag(&self, list: TagList, tag_id: &str) -> bool {
        self.tags(list).iter().any(|tag| tag.id == tag_id)
    }
}

#[cfg(test)]
mod tests {
    use super::Dataset;
    use crate::model::annotation::{Annotation, TagList};

    #[test]
    fn deserializes_wire_names_with_defaults() {
        let dataset: Dataset = serde_json::from_str(
            r#"{
                "id": "ds-1",
                "label": "Dataset",
                "inclusionTerms": [{ "id": "adult", "label": "Adult" }],
                "accessionNumber": "ACC-1"
            }"#,
        )
        .unwrap();
        assert_eq!(dataset.accession_number, "ACC-1");
        assert!(dataset.keywords.is_empty());
        assert!(dataset.has_tag(TagList::Inclusion, "adult"));
        assert_eq!(dataset.inclusion_terms[0].text, "");
    }

    #[test]
    fn replace_tags_targets_one_list_only() {
        let mut dataset = Dataset::new("ds-1", "Dataset");
        dataset.replace_tags(TagList::Exclusion, vec![Annotation::manual("x", "X")]);
        assert!(dataset.has_tag(TagList::Exclusion, "x"));
        assert!(!dataset.has_tag(TagList::Keyword, "x"));
    }
}
