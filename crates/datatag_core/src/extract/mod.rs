//! Annotation extractor boundary.
//!
//! # Responsibility
//! - Define the contract for turning free text into extraction candidates.
//! - Provide a subprocess-backed extractor and a label-matching mock.
//!
//! # Invariants
//! - Extractors report transport failures as `ExtractError`; the session
//!   layer degrades every error to zero candidates.
//! - Candidate shapes are coerced at the boundary, never trusted.

pub mod label_match;
pub mod subprocess;

use crate::model::candidate::ExtractionCandidate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use label_match::{CandidateRouting, LabelMatchExtractor};
pub use subprocess::SubprocessExtractor;

/// Result type for extractor calls.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Extractor transport and protocol failures.
#[derive(Debug)]
pub enum ExtractError {
    /// Extractor process could not be started or talked to.
    Io(std::io::Error),
    /// Extractor exited unsuccessfully.
    ExitStatus { code: Option<i32> },
    /// Extractor output is not JSON.
    MalformedResponse(serde_json::Error),
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "extractor io failure: {err}"),
            Self::ExitStatus { code: Some(code) } => {
                write!(f, "extractor exited with status {code}")
            }
            Self::ExitStatus { code: None } => write!(f, "extractor terminated by signal"),
            Self::MalformedResponse(err) => write!(f, "malformed extractor response: {err}"),
        }
    }
}

impl Error for ExtractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::ExitStatus { .. } => None,
            Self::MalformedResponse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedResponse(value)
    }
}

/// Free text -> candidate suggestions.
pub trait AnnotationExtractor {
    /// Extracts candidates from `text`.
    fn extract(&self, text: &str) -> ExtractResult<Vec<ExtractionCandidate>>;
}

impl<T: AnnotationExtractor + ?Sized> AnnotationExtractor for Box<T> {
    fn extract(&self, text: &str) -> ExtractResult<Vec<ExtractionCandidate>> {
        (**self).extract(text)
    }
}

/// Extractor returning a fixed candidate list, for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    candidates: Vec<ExtractionCandidate>,
}

impl StaticExtractor {
    pub fn new(candidates: Vec<ExtractionCandidate>) -> Self {
        Self { candidates }
    }
}

impl AnnotationExtractor for StaticExtractor {
    fn extract(&self, _text: &str) -> ExtractResult<Vec<ExtractionCandidate>> {
        Ok(self.candidates.clone())
    }
}
