//! Annotation session: explicit state plus the add/submit workflow.
//!
//! # Responsibility
//! - Own the session state (taxonomy, datasets, Active Filter State, edit
//!   target) and pass it explicitly to the reconciliation/filter engines.
//! - Drive extraction, reconciliation and commit through the collaborator
//!   traits.
//!
//! # Invariants
//! - Entering edit mode seeds the working lists from the dataset's stored
//!   sets.
//! - Commit replaces the dataset's three sets wholesale, and only after the
//!   gateway accepted the write.
//! - A failed commit leaves both the working lists and edit mode untouched.
//! - Extraction failures degrade to zero candidates.
//! - `&mut self` on every mutating call keeps at most one extraction in
//!   flight against the working lists.

use crate::extract::AnnotationExtractor;
use crate::filter::filter_by_state;
use crate::gateway::{AnnotationUpdate, GatewayError, PersistenceGateway};
use crate::model::annotation::{Annotation, TagList};
use crate::model::candidate::ExtractionCandidate;
use crate::model::dataset::Dataset;
use crate::model::filter_state::ActiveFilterState;
use crate::model::taxonomy::Taxonomy;
use crate::reconcile::{apply_extraction, MergeSummary};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Workflow errors surfaced to the caller.
#[derive(Debug)]
pub enum SessionError {
    /// No dataset with this id is loaded.
    DatasetNotFound(String),
    /// Operation requires a dataset in edit mode.
    NotEditing,
    /// No taxonomy node with this id.
    NodeNotFound(String),
    /// Gateway rejected the write; working lists are kept for retry.
    CommitFailed(GatewayError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetNotFound(id) => write!(f, "dataset not found: {id}"),
            Self::NotEditing => write!(f, "no dataset is being edited"),
            Self::NodeNotFound(id) => write!(f, "taxonomy node not found: {id}"),
            Self::CommitFailed(err) => write!(f, "commit failed: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CommitFailed(err) => Some(err),
            _ => None,
        }
    }
}

/// Session-scoped state container.
#[derive(Debug, Clone)]
pub struct AppState {
    taxonomy: Taxonomy,
    datasets: Vec<Dataset>,
    filter: ActiveFilterState,
    editing: Option<String>,
}

impl AppState {
    /// Creates a state in filter (non-edit) mode with empty working lists.
    pub fn new(taxonomy: Taxonomy, datasets: Vec<Dataset>) -> Self {
        Self {
            taxonomy,
            datasets,
            filter: ActiveFilterState::new(),
            editing: None,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|dataset| dataset.id == id)
    }

    /// Working lists (edit mode) or active filter (filter mode).
    pub fn filter(&self) -> &ActiveFilterState {
        &self.filter
    }

    /// Id of the dataset in edit mode.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Datasets visible under the current working lists.
    pub fn visible_datasets(&self) -> Vec<&Dataset> {
        filter_by_state(&self.datasets, &self.filter)
    }
}

/// Annotation workflow over a state and its two collaborators.
pub struct AnnotationSession<E: AnnotationExtractor, G: PersistenceGateway> {
    state: AppState,
    extractor: E,
    gateway: G,
}

impl<E: AnnotationExtractor, G: PersistenceGateway> AnnotationSession<E, G> {
    pub fn new(state: AppState, extractor: E, gateway: G) -> Self {
        Self {
            state,
            extractor,
            gateway,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Releases the state and collaborators.
    pub fn into_parts(self) -> (AppState, E, G) {
        (self.state, self.extractor, self.gateway)
    }

    /// Datasets visible under the current working lists.
    pub fn visible_datasets(&self) -> Vec<&Dataset> {
        self.state.visible_datasets()
    }

    /// Enters edit mode for `dataset_id`, seeding the working lists from its
    /// stored sets. Re-entering discards unsaved working changes.
    pub fn begin_edit(&mut self, dataset_id: &str) -> SessionResult<()> {
        let dataset = self
            .state
            .dataset(dataset_id)
            .ok_or_else(|| SessionError::DatasetNotFound(dataset_id.to_string()))?;
        let seeded = ActiveFilterState::from_dataset(dataset);
        self.state.filter = seeded;
        self.state.editing = Some(dataset_id.to_string());
        info!("event=edit_begin module=session status=ok dataset_id={dataset_id}");
        Ok(())
    }

    /// Leaves edit mode without committing and clears the working lists.
    pub fn cancel_edit(&mut self) {
        if let Some(dataset_id) = self.state.editing.take() {
            info!("event=edit_cancel module=session status=ok dataset_id={dataset_id}");
        }
        self.state.filter.clear();
    }

    /// Runs the extractor, degrading any failure to zero candidates.
    pub fn extract(&self, text: &str) -> Vec<ExtractionCandidate> {
        match self.extractor.extract(text) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(
                    "event=extract module=session status=degraded candidates=0 error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    /// Add workflow: merges candidates into the working lists, stays editing.
    pub fn add_candidates(
        &mut self,
        candidates: &[ExtractionCandidate],
    ) -> SessionResult<MergeSummary> {
        let dataset_id = self.editing_id()?.to_string();
        let routed = apply_extraction(candidates, &self.state.taxonomy);
        let summary = routed.merge_into(&mut self.state.filter);
        info!(
            "event=reconcile module=session status=ok dataset_id={} candidates={} added={} unmapped={}",
            dataset_id,
            candidates.len(),
            summary.total(),
            routed.unmapped
        );
        Ok(summary)
    }

    /// Add workflow from free text.
    pub fn add_from_text(&mut self, text: &str) -> SessionResult<MergeSummary> {
        self.editing_id()?;
        let candidates = self.extract(text);
        self.add_candidates(&candidates)
    }

    /// Submit workflow: merge, then commit and leave edit mode.
    ///
    /// On commit failure the merged working lists are kept.
    pub fn submit_candidates(
        &mut self,
        candidates: &[ExtractionCandidate],
    ) -> SessionResult<MergeSummary> {
        let summary = self.add_candidates(candidates)?;
        self.commit()?;
        Ok(summary)
    }

    /// Submit workflow from free text.
    pub fn submit_from_text(&mut self, text: &str) -> SessionResult<MergeSummary> {
        self.editing_id()?;
        let candidates = self.extract(text);
        self.submit_candidates(&candidates)
    }

    /// Adds a node picked in the taxonomy browser to one working list.
    ///
    /// Works in both edit and filter mode. Returns whether the tag was new.
    pub fn add_manual(&mut self, list: TagList, node_id: &str) -> SessionResult<bool> {
        let node = self
            .state
            .taxonomy
            .find(node_id)
            .ok_or_else(|| SessionError::NodeNotFound(node_id.to_string()))?;
        let annotation = Annotation::manual(node.id.clone(), node.label.clone());
        Ok(self.state.filter.merge(list, [annotation]) == 1)
    }

    /// Removes a tag from one working list; returns whether it was present.
    pub fn remove_tag(&mut self, list: TagList, tag_id: &str) -> bool {
        self.state.filter.remove(list, tag_id)
    }

    /// Clears the working lists; in filter mode this shows every dataset.
    pub fn clear_filter(&mut self) {
        self.state.filter.clear();
    }

    /// Writes the working lists onto the edited dataset and leaves edit mode.
    pub fn commit(&mut self) -> SessionResult<()> {
        let dataset_id = self.editing_id()?.to_string();
        let update = AnnotationUpdate {
            dataset_id: dataset_id.clone(),
            keywords: self.state.filter.keywords().to_vec(),
            inclusion_terms: self.state.filter.inclusions().to_vec(),
            exclusion_terms: self.state.filter.exclusions().to_vec(),
        };

        if let Err(err) = self.gateway.write_annotations(&update) {
            warn!(
                "event=commit module=session status=error dataset_id={} error={}",
                dataset_id, err
            );
            return Err(SessionError::CommitFailed(err));
        }

        let dataset = self
            .state
            .datasets
            .iter_mut()
            .find(|dataset| dataset.id == dataset_id)
            .ok_or_else(|| SessionError::DatasetNotFound(dataset_id.clone()))?;
        for list in TagList::ALL {
            dataset.replace_tags(list, update.tags(list).to_vec());
        }
        self.state.editing = None;
        info!(
            "event=commit module=session status=ok dataset_id={} keywords={} inclusions={} exclusions={}",
            dataset_id,
            update.keywords.len(),
            update.inclusion_terms.len(),
            update.exclusion_terms.len()
        );
        Ok(())
    }

    fn editing_id(&self) -> SessionResult<&str> {
        self.state.editing().ok_or(SessionError::NotEditing)
    }
}
