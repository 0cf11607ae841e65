//! Tree builder that materializes flat listings into glossary hierarchies.

use std::collections::{BTreeMap, HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::DomainTree;
use crate::domain::entities::{DomainItem, DomainType};

/// A parent/child pair that violates the type containment rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentWarning {
    pub parent_id: String,
    pub parent_type: DomainType,
    pub child_id: String,
    pub child_type: DomainType,
}

/// Anomalies found while materializing a listing.
///
/// None of these stop the build: orphans and duplicates are left out of the tree,
/// containment warnings are kept in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Items whose ancestor chain does not lead to an attached parent
    pub orphans: Vec<String>,
    /// Ids seen more than once (the tree keeps the first occurrence that attaches)
    pub duplicates: Vec<String>,
    pub containment_warnings: Vec<ContainmentWarning>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.duplicates.is_empty() && self.containment_warnings.is_empty()
    }
}

/// Constructs hierarchical trees from flat domain listings.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    report: BuildReport,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report of the most recent `materialize` call.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn into_report(self) -> BuildReport {
        self.report
    }

    /// Build a forest from `items`.
    ///
    /// Items are bucketed by ancestor-chain length. Depth-1 items become roots;
    /// each deeper item attaches to the node one level up whose id precedes its own
    /// in its chain. Items that find no such parent are dropped and reported.
    /// A repeated id only takes the place of earlier occurrences that were orphaned.
    #[instrument(level = "debug", skip_all, fields(items = items.len()))]
    pub fn materialize(&mut self, items: Vec<DomainItem>) -> DomainTree {
        // Reset state for fresh build
        self.report = BuildReport::default();

        let buckets = bucket_by_depth(items);
        let mut tree = DomainTree::new();
        let mut seen: HashSet<String> = HashSet::new();

        // Nodes attached at the previous depth, by id
        let mut previous: HashMap<String, Index> = HashMap::new();
        let mut expected_depth = 1;

        for (depth, bucket) in buckets {
            if depth != expected_depth {
                // Gap in the chain: nothing at depth-1 to attach to
                previous.clear();
            }
            let mut current: HashMap<String, Index> = HashMap::with_capacity(bucket.len());

            for item in bucket {
                if !seen.insert(item.id.clone()) {
                    self.report.duplicates.push(item.id.clone());
                    if tree.contains(&item.id) {
                        warn!(id = %item.id, "dropping duplicate item");
                        continue;
                    }
                    debug!(id = %item.id, "earlier occurrence was orphaned, trying duplicate");
                }

                let parent_idx = if depth == 1 {
                    None
                } else {
                    match item.path_parent().and_then(|p| previous.get(p)) {
                        Some(&idx) => Some(idx),
                        None => {
                            warn!(id = %item.id, path = ?item.path_id, "dropping orphaned item");
                            self.report.orphans.push(item.id.clone());
                            continue;
                        }
                    }
                };

                if let Some(parent) = parent_idx.and_then(|p| tree.get_node(p)) {
                    if !parent.item.kind.can_contain(item.kind) {
                        debug!(parent = %parent.item.id, child = %item.id, "unexpected containment");
                        self.report.containment_warnings.push(ContainmentWarning {
                            parent_id: parent.item.id.clone(),
                            parent_type: parent.item.kind,
                            child_id: item.id.clone(),
                            child_type: item.kind,
                        });
                    }
                }

                let id = item.id.clone();
                let idx = tree.insert_node(item, parent_idx);
                current.insert(id, idx);
            }

            previous = current;
            expected_depth = depth + 1;
        }

        debug!(
            nodes = tree.len(),
            orphans = self.report.orphans.len(),
            duplicates = self.report.duplicates.len(),
            "materialized hierarchy"
        );
        tree
    }

}

/// Partition by depth, keeping input order inside each bucket.
fn bucket_by_depth(items: Vec<DomainItem>) -> BTreeMap<usize, Vec<DomainItem>> {
    let mut buckets: BTreeMap<usize, Vec<DomainItem>> = BTreeMap::new();
    for item in items {
        buckets.entry(item.depth()).or_default().push(item);
    }
    buckets
}

/// Materialize `items` and return the tree together with its build report.
pub fn materialize(items: Vec<DomainItem>) -> (DomainTree, BuildReport) {
    let mut builder = HierarchyBuilder::new();
    let tree = builder.materialize(items);
    (tree, builder.into_report())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, path: &str, kind: DomainType) -> DomainItem {
        DomainItem::new(id, id, kind).with_path(path)
    }

    #[test]
    fn given_self_rooted_item_without_path_when_materializing_then_becomes_root() {
        let (tree, report) = materialize(vec![DomainItem::new("X", "x", DomainType::Group)]);
        assert_eq!(tree.roots().len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn given_chain_gap_when_materializing_then_deeper_items_are_orphans() {
        // depth 2 missing entirely
        let items = vec![
            item("A", "A", DomainType::Group),
            item("C", "A/B/C", DomainType::Domain),
        ];
        let (tree, report) = materialize(items);
        assert_eq!(tree.len(), 1);
        assert_eq!(report.orphans, vec!["C"]);
    }

    #[test]
    fn given_parent_at_wrong_depth_when_materializing_then_child_is_orphan() {
        // D claims parent A but sits at depth 3
        let items = vec![
            item("A", "A", DomainType::Group),
            item("B", "A/B", DomainType::Domain),
            item("D", "X/A/D", DomainType::Domain),
        ];
        let (tree, report) = materialize(items);
        assert!(!tree.contains("D"));
        assert_eq!(report.orphans, vec!["D"]);
    }

    #[test]
    fn given_entity_under_group_when_materializing_then_keeps_node_and_warns() {
        let items = vec![
            item("A", "A", DomainType::Group),
            item("E", "A/E", DomainType::Entity),
        ];
        let (tree, report) = materialize(items);
        assert!(tree.contains("E"));
        assert_eq!(report.containment_warnings.len(), 1);
        assert_eq!(report.containment_warnings[0].child_type, DomainType::Entity);
    }

    #[test]
    fn given_builder_reused_when_materializing_then_report_is_reset() {
        let mut builder = HierarchyBuilder::new();
        builder.materialize(vec![item("C", "Z/C", DomainType::Domain)]);
        assert_eq!(builder.report().orphans.len(), 1);
        builder.materialize(vec![item("A", "A", DomainType::Group)]);
        assert!(builder.report().is_clean());
    }
}
