//! Annotation domain model.
//!
//! # Responsibility
//! - Define the canonical tag record applied to datasets.
//! - Name the three independent tag lists a dataset carries.
//!
//! # Invariants
//! - Two annotations are the same tag iff their `id`s match; `text` and
//!   `label` never participate in identity.
//! - Empty `text` marks a manual pick from the taxonomy browser.

use serde::{Deserialize, Serialize};

/// Canonical tag applied to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Taxonomy node id, or the raw label for an unmapped pseudo-tag.
    pub id: String,
    /// Node label copied at assignment time.
    pub label: String,
    /// Free-form curator comment.
    #[serde(default)]
    pub comment: String,
    /// Source span that produced this tag. Empty for manual picks.
    #[serde(default)]
    pub text: String,
}

impl Annotation {
    /// Creates an annotation with empty comment.
    pub fn new(id: impl Into<String>, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            comment: String::new(),
            text: text.into(),
        }
    }

    /// Creates a manual pick (no source span).
    pub fn manual(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, "")
    }

    /// Returns whether both annotations refer to the same tag.
    pub fn same_tag(&self, other: &Annotation) -> bool {
        self.id == other.id
    }

    /// Returns whether this annotation came from manual browsing.
    pub fn is_manual(&self) -> bool {
        self.text.is_empty()
    }
}

/// One of the three tag lists carried by a dataset and by the working state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagList {
    /// Dataset keywords.
    Keyword,
    /// Inclusion criteria terms.
    Inclusion,
    /// Exclusion criteria terms.
    Exclusion,
}

impl TagList {
    /// All lists in canonical order.
    pub const ALL: [TagList; 3] = [TagList::Keyword, TagList::Inclusion, TagList::Exclusion];

    /// Stable storage/CLI name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Inclusion => "inclusion",
            Self::Exclusion => "exclusion",
        }
    }

    /// Parses a storage/CLI name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keyword" | "keywords" => Some(Self::Keyword),
            "inclusion" | "inclusions" => Some(Self::Inclusion),
            "exclusion" | "exclusions" => Some(Self::Exclusion),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Annotation, TagList};

    #[test]
    fn same_tag_ignores_text_and_label() {
        let left = Annotation::new("t1-weighted", "T1-weighted", "T1");
        let right = Annotation::manual("t1-weighted", "renamed");
        assert!(left.same_tag(&right));
        assert!(right.is_manual());
        assert!(!left.is_manual());
    }

    #[test]
    fn tag_list_names_roundtrip() {
        for kind in TagList::ALL {
            assert_eq!(TagList::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TagList::parse(" Keywords "), Some(TagList::Keyword));
        assert_eq!(TagList::parse("tags"), None);
    }
}
