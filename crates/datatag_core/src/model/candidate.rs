//! Extraction candidate model and extractor-boundary coercion.
//!
//! # Responsibility
//! - Define the ephemeral suggestion shape produced by extractors.
//! - Coerce loosely typed extractor JSON into that shape.
//!
//! # Invariants
//! - Coercion never fails: missing or mistyped fields become `""`/`false`.
//! - A response without a `result` array yields zero candidates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unconfirmed tag suggestion derived from free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    /// Literal source span.
    pub text: String,
    /// Category label, may be empty.
    pub category: String,
    /// Subcategory label, may be empty.
    pub subcategory: String,
    /// Term label, may be empty.
    pub term: String,
    /// Route into the keyword list.
    pub keyword: bool,
    /// Route into the inclusion list.
    pub inclusion: bool,
    /// Route into the exclusion list.
    pub exclusion: bool,
}

impl ExtractionCandidate {
    /// Coerces one JSON value into a candidate.
    ///
    /// Returns `None` only when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text_field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let flag_field = |name: &str| object.get(name).and_then(Value::as_bool).unwrap_or(false);

        Some(Self {
            text: text_field("text"),
            category: text_field("category"),
            subcategory: text_field("subcategory"),
            term: text_field("term"),
            keyword: flag_field("keyword"),
            inclusion: flag_field("inclusion"),
            exclusion: flag_field("exclusion"),
        })
    }

    /// Returns whether this candidate is routed into no list at all.
    pub fn is_unrouted(&self) -> bool {
        !self.keyword && !self.inclusion && !self.exclusion
    }
}

/// Coerces an extractor response envelope (`{"result": [...]}`).
///
/// Non-object entries are skipped; a non-conforming envelope yields an empty
/// list.
pub fn coerce_candidates(response: &Value) -> Vec<ExtractionCandidate> {
    response
        .get("result")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(ExtractionCandidate::from_value)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{coerce_candidates, ExtractionCandidate};
    use serde_json::json;

    #[test]
    fn missing_fields_take_neutral_defaults() {
        let candidate =
            ExtractionCandidate::from_value(&json!({ "text": "T1", "keyword": true })).unwrap();
        assert_eq!(candidate.text, "T1");
        assert!(candidate.subcategory.is_empty());
        assert!(candidate.keyword);
        assert!(!candidate.inclusion);
    }

    #[test]
    fn mistyped_fields_are_coerced_not_rejected() {
        let candidate = ExtractionCandidate::from_value(&json!({
            "text": 12,
            "term": "T1-weighted",
            "inclusion": "yes",
            "exclusion": true,
        }))
        .unwrap();
        assert_eq!(candidate.text, "");
        assert_eq!(candidate.term, "T1-weighted");
        assert!(!candidate.inclusion);
        assert!(candidate.exclusion);
    }

    #[test]
    fn non_conforming_envelopes_yield_nothing() {
        assert!(coerce_candidates(&json!({ "error": "boom" })).is_empty());
        assert!(coerce_candidates(&json!({ "result": "nope" })).is_empty());
        assert!(coerce_candidates(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let candidates = coerce_candidates(&json!({
            "result": [ "stray", { "text": "MRI", "category": "MRI" }, null ]
        }));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].category, "MRI");
        assert!(candidates[0].is_unrouted());
    }
}
