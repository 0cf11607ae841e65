//! Arena-backed forest of glossary nodes.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::instrument;

use crate::domain::entities::{DomainItem, PATH_SEPARATOR};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Listing record for this node
    pub item: DomainItem,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based forest for glossary hierarchies.
///
/// Nodes are addressed by generational index; `find` maps item ids to indices.
/// Roots keep their insertion order, as do the children of every node.
#[derive(Debug, Clone, Default)]
pub struct DomainTree {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    by_id: HashMap<String, Index>,
}

impl DomainTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item` below `parent` (or as a new root).
    ///
    /// The caller guarantees id uniqueness; a repeated id shadows the earlier one in `find`.
    #[instrument(level = "trace", skip(self, item), fields(id = %item.id))]
    pub fn insert_node(&mut self, item: DomainItem, parent: Option<Index>) -> Index {
        let id = item.id.clone();
        let node = TreeNode {
            item,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.push(node_idx),
            None => self.roots.push(node_idx),
        }
        self.by_id.insert(id, node_idx);

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn find(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&TreeNode> {
        self.find(id).and_then(|idx| self.get_node(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Maximum depth of the forest; roots count as depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of all nodes without children, in pre-order.
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.item.id.clone())
            .collect()
    }

    /// Parent chain of `idx`, nearest first, root last.
    pub fn ancestors(&self, idx: Index) -> Vec<Index> {
        let mut chain = Vec::new();
        let mut current = self.get_node(idx).and_then(|n| n.parent);
        while let Some(parent_idx) = current {
            chain.push(parent_idx);
            current = self.get_node(parent_idx).and_then(|n| n.parent);
        }
        chain
    }

    /// Ancestor ids of the node with `id`, nearest first.
    pub fn ancestor_ids(&self, id: &str) -> Vec<&str> {
        self.find(id)
            .map(|idx| {
                self.ancestors(idx)
                    .into_iter()
                    .filter_map(|a| self.get_node(a))
                    .map(|n| n.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All nodes strictly below `idx`, in pre-order.
    pub fn descendants(&self, idx: Index) -> Vec<Index> {
        let mut result = Vec::new();
        let mut stack: Vec<Index> = match self.get_node(idx) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return result,
        };
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get_node(current) {
                result.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        result
    }

    pub fn descendant_ids(&self, idx: Index) -> Vec<&str> {
        self.descendants(idx)
            .into_iter()
            .filter_map(|d| self.get_node(d))
            .map(|n| n.id())
            .collect()
    }

    /// Items in depth-first pre-order, exactly as stored.
    pub fn flatten(&self) -> Vec<&DomainItem> {
        self.iter().map(|(_, node)| &node.item).collect()
    }

    /// Items in pre-order with `path_id`, `path_name`, `parent_id` and
    /// `child_count` recomputed from tree position.
    #[instrument(level = "debug", skip(self))]
    pub fn to_items(&self) -> Vec<DomainItem> {
        self.iter()
            .map(|(idx, node)| {
                let mut chain: Vec<&TreeNode> = self
                    .ancestors(idx)
                    .into_iter()
                    .rev()
                    .filter_map(|a| self.get_node(a))
                    .collect();
                chain.push(node);

                let mut item = node.item.clone();
                item.path_id = Some(chain.iter().map(|n| n.id()).join(&PATH_SEPARATOR.to_string()));
                item.path_name = Some(
                    chain
                        .iter()
                        .map(|n| n.item.name.as_str())
                        .join(&PATH_SEPARATOR.to_string()),
                );
                item.parent_id = node
                    .parent
                    .and_then(|p| self.get_node(p))
                    .map(|p| p.item.id.clone());
                item.child_count = node.children.len() as u32;
                item
            })
            .collect()
    }
}

/// Depth-first pre-order traversal over all roots.
pub struct TreeIterator<'a> {
    tree: &'a DomainTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a DomainTree) -> Self {
        let stack = tree.roots.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a DomainTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a DomainTree) -> Self {
        let stack = tree.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
