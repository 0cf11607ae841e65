//! Tests for selection propagation over materialized hierarchies

use rstest::rstest;

use glosstree::domain::{materialize, CheckState, DomainError, DomainTree, SelectionSet};
use glosstree::util::testing::{abc_items, glossary_items, init_test_setup};

fn glossary() -> DomainTree {
    materialize(glossary_items()).0
}

fn selected(sel: &SelectionSet) -> Vec<&str> {
    sel.iter().collect()
}

// ============================================================
// Checking
// ============================================================

#[rstest]
#[case("G1")]
#[case("D1")]
#[case("O1")]
#[case("E2")]
#[case("D2")]
#[case("G2")]
fn given_any_node_when_checked_then_whole_subtree_and_ancestors_selected(#[case] id: &str) {
    init_test_setup();
    let tree = glossary();
    let mut sel = SelectionSet::new();

    sel.check(&tree, id).unwrap();

    let idx = tree.find(id).unwrap();
    for d in tree.descendant_ids(idx) {
        assert!(sel.contains(d), "descendant {d} of {id} should be selected");
    }
    for a in tree.ancestor_ids(id) {
        assert!(sel.contains(a), "ancestor {a} of {id} should be selected");
    }
    assert!(sel.contains(id));
    assert_eq!(sel.state(&tree, id).unwrap(), CheckState::Checked);
}

#[test]
fn given_check_in_one_subtree_when_applied_then_other_subtrees_untouched() {
    let tree = glossary();
    let mut sel = SelectionSet::new();

    sel.check(&tree, "D3").unwrap();
    let change = sel.check(&tree, "O2").unwrap();

    assert_eq!(change.added, vec!["D2", "G1", "O2"]);
    assert_eq!(selected(&sel), vec!["D2", "D3", "G1", "G2", "O2"]);
}

// ============================================================
// Unchecking
// ============================================================

#[test]
fn given_b_checked_when_b_unchecked_then_selection_is_empty() {
    // Arrange
    let tree = materialize(abc_items()).0;
    let mut sel = SelectionSet::new();
    sel.check(&tree, "B").unwrap();
    assert_eq!(selected(&sel), vec!["A", "B"]);

    // Act
    let change = sel.uncheck(&tree, "B").unwrap();

    // Assert: no stray A
    assert!(sel.is_empty());
    assert_eq!(change.removed, vec!["A", "B"]);
}

#[test]
fn given_root_checked_when_one_child_unchecked_then_root_stays_for_sibling() {
    let tree = materialize(abc_items()).0;
    let mut sel = SelectionSet::new();
    sel.check(&tree, "A").unwrap();

    sel.uncheck(&tree, "B").unwrap();
    assert_eq!(selected(&sel), vec!["A", "C"]);
    assert_eq!(sel.state(&tree, "A").unwrap(), CheckState::Indeterminate);

    sel.uncheck(&tree, "C").unwrap();
    assert!(sel.is_empty());
}

#[test]
fn given_sibling_subtree_selected_when_unchecking_then_only_shared_ancestors_remain() {
    // Arrange: invoice object and the ledger domain
    let tree = glossary();
    let mut sel = SelectionSet::new();
    sel.check(&tree, "O1").unwrap();
    sel.check(&tree, "D2").unwrap();

    // Act
    sel.uncheck(&tree, "O1").unwrap();

    // Assert: D1 had no other selected child, G1 still covers D2
    assert_eq!(selected(&sel), vec!["D2", "G1", "O2"]);
}

#[test]
fn given_leaf_unchecked_when_siblings_remain_then_whole_chain_kept() {
    let tree = glossary();
    let mut sel = SelectionSet::new();
    sel.check(&tree, "O1").unwrap();
    sel.check(&tree, "A1").unwrap();

    sel.uncheck(&tree, "E1").unwrap();

    assert_eq!(selected(&sel), vec!["A1", "D1", "E2", "G1", "O1"]);
    assert_eq!(sel.state(&tree, "O1").unwrap(), CheckState::Indeterminate);
    assert_eq!(sel.state(&tree, "E2").unwrap(), CheckState::Checked);
    assert_eq!(sel.state(&tree, "E1").unwrap(), CheckState::Unchecked);
}

#[test]
fn given_inner_node_unchecked_when_descendants_selected_then_descendants_removed() {
    let tree = glossary();
    let mut sel = SelectionSet::new();
    sel.check(&tree, "G1").unwrap();

    sel.uncheck(&tree, "D1").unwrap();

    for id in ["D1", "O1", "E1", "E2", "A1"] {
        assert!(!sel.contains(id), "{id} should be removed");
    }
    assert_eq!(selected(&sel), vec!["D2", "G1", "O2"]);
}

#[test]
fn given_unrelated_tree_selected_when_unchecking_then_it_is_untouched() {
    let tree = glossary();
    let mut sel = SelectionSet::new();
    sel.check(&tree, "G2").unwrap();
    sel.check(&tree, "E1").unwrap();

    sel.uncheck(&tree, "E1").unwrap();

    assert_eq!(selected(&sel), vec!["D3", "G2"]);
}

// ============================================================
// Errors and helpers
// ============================================================

#[test]
fn given_unknown_id_when_unchecking_then_errors_and_keeps_selection() {
    let tree = glossary();
    let mut sel = SelectionSet::new();
    sel.check(&tree, "D3").unwrap();

    let err = sel.uncheck(&tree, "NOPE").unwrap_err();

    assert_eq!(err, DomainError::NodeNotFound("NOPE".to_string()));
    assert_eq!(sel.len(), 2);
}

#[test]
fn given_selection_when_listing_items_then_tree_order() {
    let tree = glossary();
    let mut sel = SelectionSet::new();
    sel.check(&tree, "D3").unwrap();
    sel.check(&tree, "A1").unwrap();

    let ids: Vec<&str> = sel
        .selected_items(&tree)
        .into_iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["G1", "D1", "A1", "G2", "D3"]);
}
