//! Deterministic label-matching extractor.
//!
//! Stands in for the external extraction script: text is split into word
//! tokens (`\b\w+\b`) and every run of tokens that spells a taxonomy label
//! (case-insensitive, punctuation-insensitive) becomes one candidate.
//!
//! # Invariants
//! - Longest match wins at each token position; matched tokens are consumed.
//! - Candidate `text` is the literal span from the input.
//! - Routing flags are the configured defaults, identical for every match.

use super::{AnnotationExtractor, ExtractResult};
use crate::model::candidate::ExtractionCandidate;
use crate::model::taxonomy::Taxonomy;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

const MAX_LABEL_TOKENS: usize = 6;

/// Default list routing applied to every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRouting {
    pub keyword: bool,
    pub inclusion: bool,
    pub exclusion: bool,
}

impl Default for CandidateRouting {
    fn default() -> Self {
        Self {
            keyword: true,
            inclusion: false,
            exclusion: false,
        }
    }
}

#[derive(Debug, Clone)]
struct LabelSlots {
    category: String,
    subcategory: String,
    term: String,
}

/// Matches token runs against taxonomy labels.
#[derive(Debug, Clone)]
pub struct LabelMatchExtractor {
    labels: HashMap<String, LabelSlots>,
    window: usize,
    routing: CandidateRouting,
}

impl LabelMatchExtractor {
    /// Builds the normalized label table from a taxonomy.
    ///
    /// Nodes at depth 0/1/2 fill `category`/`subcategory`/`term`; deeper
    /// nodes are treated as terms. Later nodes overwrite earlier ones on
    /// normalized-label collision, like the taxonomy label index.
    pub fn from_taxonomy(taxonomy: &Taxonomy, routing: CandidateRouting) -> Self {
        let mut labels = HashMap::new();
        let mut window = 1;
        for entry in taxonomy.entries() {
            let tokens = tokenize(&entry.node.label);
            if tokens.is_empty() || tokens.len() > MAX_LABEL_TOKENS {
                continue;
            }
            window = window.max(tokens.len());

            let label = entry.node.label.clone();
            let ancestor_label =
                |depth: usize| entry.ancestors.get(depth).map(|node| node.label.clone());
            let slots = match entry.depth() {
                0 => LabelSlots {
                    category: label,
                    subcategory: String::new(),
                    term: String::new(),
                },
                1 => LabelSlots {
                    category: ancestor_label(0).unwrap_or_default(),
                    subcategory: label,
                    term: String::new(),
                },
                _ => LabelSlots {
                    category: ancestor_label(0).unwrap_or_default(),
                    subcategory: entry
                        .parent()
                        .map(|node| node.label.clone())
                        .unwrap_or_default(),
                    term: label,
                },
            };
            labels.insert(tokens.join(" "), slots);
        }

        Self {
            labels,
            window,
            routing,
        }
    }

    /// Number of distinct normalized labels known.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    fn match_text(&self, text: &str) -> Vec<ExtractionCandidate> {
        let words: Vec<regex::Match<'_>> = WORD_RE.find_iter(text).collect();
        let mut candidates = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let longest = self.window.min(words.len() - start);
            let found = (1..=longest).rev().find_map(|len| {
                let key = words[start..start + len]
                    .iter()
                    .map(|word| word.as_str().to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.labels.get(&key).map(|slots| (len, slots))
            });

            match found {
                Some((len, slots)) => {
                    let span = &text[words[start].start()..words[start + len - 1].end()];
                    candidates.push(ExtractionCandidate {
                        text: span.to_string(),
                        category: slots.category.clone(),
                        subcategory: slots.subcategory.clone(),
                        term: slots.term.clone(),
                        keyword: self.routing.keyword,
                        inclusion: self.routing.inclusion,
                        exclusion: self.routing.exclusion,
                    });
                    start += len;
                }
                None => start += 1,
            }
        }
        candidates
    }
}

impl AnnotationExtractor for LabelMatchExtractor {
    fn extract(&self, text: &str) -> ExtractResult<Vec<ExtractionCandidate>> {
        let candidates = self.match_text(text);
        info!(
            "event=extract module=extract status=ok backend=label_match text_chars={} candidates={}",
            text.chars().count(),
            candidates.len()
        );
        Ok(candidates)
    }
}

fn tokenize(value: &str) -> Vec<String> {
    WORD_RE
        .find_iter(value)
        .map(|word| word.as_str().to_lowercase())
        .collect()
}
