//! Taxonomy tree model and lookup indexes.
//!
//! # Responsibility
//! - Hold the category -> subcategory -> term tree for one session.
//! - Precompute the id and label indexes used by browsing and reconciliation.
//! - Provide pruned-tree search for the taxonomy browser.
//!
//! # Invariants
//! - Node ids are non-empty and unique across the whole tree.
//! - Labels are not unique; the label index is last-visited-wins in
//!   depth-first pre-order.
//! - A `Taxonomy` is never mutated after construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One node of the taxonomy tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub children: Vec<TaxonomyNode>,
}

impl TaxonomyNode {
    /// Creates a leaf node.
    pub fn leaf(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Creates a node with children.
    pub fn branch(
        id: impl Into<String>,
        label: impl Into<String>,
        children: Vec<TaxonomyNode>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children,
        }
    }
}

/// Structural errors detected while building a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// A node carries a blank id.
    EmptyId { label: String },
    /// Two nodes share one id.
    DuplicateId(String),
}

impl Display for TaxonomyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId { label } => write!(f, "taxonomy node `{label}` has an empty id"),
            Self::DuplicateId(id) => write!(f, "duplicate taxonomy node id: {id}"),
        }
    }
}

impl Error for TaxonomyError {}

/// Pre-order visit record: one node plus its ancestors (root first).
#[derive(Debug, Clone)]
pub struct TaxonomyEntry<'a> {
    pub node: &'a TaxonomyNode,
    pub ancestors: Vec<&'a TaxonomyNode>,
}

impl TaxonomyEntry<'_> {
    /// Zero for categories, one for subcategories, two for terms.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Nearest ancestor, if any.
    pub fn parent(&self) -> Option<&TaxonomyNode> {
        self.ancestors.last().copied()
    }
}

/// Immutable taxonomy with precomputed indexes.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    roots: Vec<TaxonomyNode>,
    paths_by_id: HashMap<String, Vec<usize>>,
    ids_by_label: HashMap<String, String>,
}

impl Taxonomy {
    /// Builds a taxonomy, validating id uniqueness in one traversal.
    ///
    /// # Errors
    /// - `EmptyId` when a node id is blank.
    /// - `DuplicateId` when two nodes share an id.
    pub fn try_new(roots: Vec<TaxonomyNode>) -> Result<Self, TaxonomyError> {
        let mut paths_by_id = HashMap::new();
        let mut ids_by_label = HashMap::new();
        let mut path = Vec::new();
        for (index, root) in roots.iter().enumerate() {
            path.push(index);
            index_node(root, &mut path, &mut paths_by_id, &mut ids_by_label)?;
            path.pop();
        }

        Ok(Self {
            roots,
            paths_by_id,
            ids_by_label,
        })
    }

    /// Creates an empty taxonomy.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            paths_by_id: HashMap::new(),
            ids_by_label: HashMap::new(),
        }
    }

    /// Top-level category nodes in configured order.
    pub fn roots(&self) -> &[TaxonomyNode] {
        &self.roots
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.paths_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths_by_id.is_empty()
    }

    /// Looks up a node by id.
    pub fn find(&self, id: &str) -> Option<&TaxonomyNode> {
        let path = self.paths_by_id.get(id)?;
        self.node_at(path)
    }

    /// Resolves an exact label to a node id (last-visited-wins on collision).
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.ids_by_label.get(label).map(String::as_str)
    }

    /// Returns the labels from root down to the node with `id`.
    pub fn path_to(&self, id: &str) -> Option<Vec<&str>> {
        let path = self.paths_by_id.get(id)?;
        let mut labels = Vec::with_capacity(path.len());
        let mut level = self.roots.as_slice();
        for &index in path {
            let node = level.get(index)?;
            labels.push(node.label.as_str());
            level = node.children.as_slice();
        }
        Some(labels)
    }

    /// Returns every node in depth-first pre-order with its ancestors.
    pub fn entries(&self) -> Vec<TaxonomyEntry<'_>> {
        let mut out = Vec::with_capacity(self.len());
        let mut ancestors = Vec::new();
        for root in &self.roots {
            collect_entries(root, &mut ancestors, &mut out);
        }
        out
    }

    /// Second-level labels mapped to the labels of their children.
    pub fn levels(&self) -> Vec<(&str, Vec<&str>)> {
        self.roots
            .iter()
            .flat_map(|category| category.children.iter())
            .map(|sub| {
                let terms = sub
                    .children
                    .iter()
                    .map(|term| term.label.as_str())
                    .collect();
                (sub.label.as_str(), terms)
            })
            .collect()
    }

    /// Returns a pruned copy of the tree for browsing.
    ///
    /// A node is kept with its whole subtree when its label contains `query`
    /// (case-insensitive); otherwise it is kept only as an ancestor of a
    /// match. An empty query returns the whole tree.
    pub fn search(&self, query: &str) -> Vec<TaxonomyNode> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.roots.clone();
        }
        self.roots
            .iter()
            .filter_map(|root| prune(root, &needle))
            .collect()
    }

    fn node_at(&self, path: &[usize]) -> Option<&TaxonomyNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &index in rest {
            node = node.children.get(index)?;
        }
        Some(node)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::empty()
    }
}

fn index_node(
    node: &TaxonomyNode,
    path: &mut Vec<usize>,
    paths_by_id: &mut HashMap<String, Vec<usize>>,
    ids_by_label: &mut HashMap<String, String>,
) -> Result<(), TaxonomyError> {
    if node.id.trim().is_empty() {
        return Err(TaxonomyError::EmptyId {
            label: node.label.clone(),
        });
    }
    if paths_by_id.insert(node.id.clone(), path.clone()).is_some() {
        return Err(TaxonomyError::DuplicateId(node.id.clone()));
    }
    ids_by_label.insert(node.label.clone(), node.id.clone());

    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        index_node(child, path, paths_by_id, ids_by_label)?;
        path.pop();
    }
    Ok(())
}

fn collect_entries<'a>(
    node: &'a TaxonomyNode,
    ancestors: &mut Vec<&'a TaxonomyNode>,
    out: &mut Vec<TaxonomyEntry<'a>>,
) {
    out.push(TaxonomyEntry {
        node,
        ancestors: ancestors.clone(),
    });
    ancestors.push(node);
    for child in &node.children {
        collect_entries(child, ancestors, out);
    }
    ancestors.pop();
}

fn prune(node: &TaxonomyNode, needle: &str) -> Option<TaxonomyNode> {
    if node.label.to_lowercase().contains(needle) {
        return Some(node.clone());
    }
    let children: Vec<TaxonomyNode> = node
        .children
        .iter()
        .filter_map(|child| prune(child, needle))
        .collect();
    if children.is_empty() {
        None
    } else {
        Some(TaxonomyNode {
            id: node.id.clone(),
            label: node.label.clone(),
            children,
        })
    }
}
