//! Checkbox selection over a glossary hierarchy.
//!
//! Checking a node selects it, its whole subtree and its ancestor chain.
//! Unchecking removes the node and its subtree; ancestors on the node's chain stay
//! selected only while some other selected node still lies beneath them.
//! Every surface (tree view and flat search results) goes through the same rules.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, instrument};

use crate::domain::arena::DomainTree;
use crate::domain::entities::DomainItem;
use crate::domain::error::{DomainError, DomainResult};

/// Tri-state checkbox value for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl CheckState {
    pub fn mark(&self) -> &'static str {
        match self {
            CheckState::Checked => "[x]",
            CheckState::Indeterminate => "[-]",
            CheckState::Unchecked => "[ ]",
        }
    }
}

/// Ids added and removed by one propagation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Set of checked ids, owned by the enclosing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist in `tree`, e.g. after a refetch.
    pub fn retain_known(&mut self, tree: &DomainTree) {
        self.ids.retain(|id| tree.contains(id));
    }

    /// Check or uncheck `id` and propagate through the hierarchy.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn apply(&mut self, tree: &DomainTree, id: &str, checked: bool) -> DomainResult<SelectionChange> {
        let idx = tree
            .find(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        let before = self.ids.clone();

        let subtree = std::iter::once(id).chain(tree.descendant_ids(idx));
        if checked {
            for sid in subtree {
                self.ids.insert(sid.to_string());
            }
            for aid in tree.ancestor_ids(id) {
                self.ids.insert(aid.to_string());
            }
        } else {
            for sid in subtree {
                self.ids.remove(sid);
            }
            let stripped: HashSet<&str> = tree
                .ancestor_ids(id)
                .into_iter()
                .filter(|aid| self.ids.remove(*aid))
                .collect();

            // Rebuild pass: ancestors come back only when a survivor below them justifies it
            let survivors: Vec<String> = self.ids.iter().cloned().collect();
            for survivor in &survivors {
                for aid in tree.ancestor_ids(survivor) {
                    if stripped.contains(aid) {
                        self.ids.insert(aid.to_string());
                    }
                }
            }
        }

        let change = SelectionChange {
            added: self.ids.difference(&before).cloned().collect(),
            removed: before.difference(&self.ids).cloned().collect(),
        };
        debug!(added = change.added.len(), removed = change.removed.len(), "selection propagated");
        Ok(change)
    }

    pub fn check(&mut self, tree: &DomainTree, id: &str) -> DomainResult<SelectionChange> {
        self.apply(tree, id, true)
    }

    pub fn uncheck(&mut self, tree: &DomainTree, id: &str) -> DomainResult<SelectionChange> {
        self.apply(tree, id, false)
    }

    /// Flip `id`: a node that is already selected is unchecked.
    pub fn toggle(&mut self, tree: &DomainTree, id: &str) -> DomainResult<SelectionChange> {
        let checked = !self.contains(id);
        self.apply(tree, id, checked)
    }

    /// Checkbox state of `id` for display.
    pub fn state(&self, tree: &DomainTree, id: &str) -> DomainResult<CheckState> {
        let idx = tree
            .find(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        let descendants = tree.descendant_ids(idx);
        let selected_below = descendants.iter().filter(|d| self.contains(d)).count();

        let state = if self.contains(id) && selected_below == descendants.len() {
            CheckState::Checked
        } else if self.contains(id) || selected_below > 0 {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        };
        Ok(state)
    }

    /// Selected items in tree pre-order.
    pub fn selected_items<'a>(&self, tree: &'a DomainTree) -> Vec<&'a DomainItem> {
        tree.iter()
            .filter(|(_, node)| self.contains(node.id()))
            .map(|(_, node)| &node.item)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
