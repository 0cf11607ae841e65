//! Expanded/collapsed view state kept apart from the tree itself.

use std::collections::BTreeSet;

use generational_arena::Index;

use crate::domain::arena::DomainTree;

/// Set of expanded node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: impl Into<String>) {
        self.expanded.insert(id.into());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Returns the new state of `id`.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Expand every ancestor of `id` so the node becomes visible.
    pub fn reveal(&mut self, tree: &DomainTree, id: &str) {
        for aid in tree.ancestor_ids(id) {
            self.expanded.insert(aid.to_string());
        }
    }

    pub fn expand_all(&mut self, tree: &DomainTree) {
        for (_, node) in tree.iter().filter(|(_, n)| !n.is_leaf()) {
            self.expanded.insert(node.item.id.clone());
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn retain_known(&mut self, tree: &DomainTree) {
        self.expanded.retain(|id| tree.contains(id));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    pub fn extend<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expanded.extend(ids.into_iter().map(Into::into));
    }

    /// Nodes whose ancestors are all expanded, in pre-order.
    pub fn visible(&self, tree: &DomainTree) -> Vec<Index> {
        let mut result = Vec::new();
        let mut stack: Vec<Index> = tree.roots().iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if let Some(node) = tree.get_node(idx) {
                result.push(idx);
                if self.is_expanded(node.id()) {
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }
        result
    }
}
