//! termtree rendering of glossary forests.

use colored::Colorize;
use generational_arena::Index;
use termtree::Tree;

use crate::config::DisplayConfig;
use crate::domain::{DomainTree, ExpansionState, Matcher, SelectionSet, TreeNode};

/// What to decorate and which nodes to include when rendering.
#[derive(Default, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub display: Option<&'a DisplayConfig>,
    /// Prefix each node with its tri-state checkbox
    pub selection: Option<&'a SelectionSet>,
    /// Only descend into expanded nodes
    pub expansion: Option<&'a ExpansionState>,
    /// Highlight matched name segments
    pub matcher: Option<&'a Matcher>,
}

pub trait TreeNodeConvert {
    /// One termtree per root.
    fn to_tree_strings(&self, opts: &RenderOptions<'_>) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for DomainTree {
    fn to_tree_strings(&self, opts: &RenderOptions<'_>) -> Vec<Tree<String>> {
        fn build_tree(tree: &DomainTree, node_idx: Index, opts: &RenderOptions<'_>) -> Option<Tree<String>> {
            let node = tree.get_node(node_idx)?;
            let mut rendered = Tree::new(label(tree, node, opts));
            let descend = opts
                .expansion
                .map_or(true, |state| state.is_expanded(node.id()));
            if descend {
                for &child_idx in &node.children {
                    if let Some(child) = build_tree(tree, child_idx, opts) {
                        rendered.push(child);
                    }
                }
            }
            Some(rendered)
        }

        self.roots()
            .iter()
            .filter_map(|&root| build_tree(self, root, opts))
            .collect()
    }
}

fn label(tree: &DomainTree, node: &TreeNode, opts: &RenderOptions<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(selection) = opts.selection {
        if let Ok(state) = selection.state(tree, node.id()) {
            parts.push(state.mark().to_string());
        }
    }
    let display = opts.display.cloned().unwrap_or_default();
    if display.show_type {
        parts.push(node.item.kind.icon().to_string());
    }

    let name = match opts.matcher {
        Some(matcher) => matcher
            .highlight(&node.item.name)
            .iter()
            .map(|seg| {
                if seg.matched {
                    seg.text.yellow().bold().to_string()
                } else {
                    seg.text.to_string()
                }
            })
            .collect::<String>(),
        None => node.item.name.clone(),
    };
    parts.push(name);

    if display.show_child_count && !node.is_leaf() {
        parts.push(format!("({})", node.children.len()).dimmed().to_string());
    }
    parts.join(" ")
}
