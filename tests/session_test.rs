//! Tests for HierarchySession and PermissionStore backed by JSON listings

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use glosstree::application::services::{HierarchySession, PermissionStore};
use glosstree::application::ApplicationError;
use glosstree::domain::{CheckState, DomainItem, DomainType, SearchQuery};
use glosstree::infrastructure::traits::{InMemorySource, JsonFileSource};
use glosstree::util::testing::{glossary_items, init_test_setup};

fn write_listing(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write listing");
    path
}

fn items_json(items: &[DomainItem]) -> String {
    serde_json::to_string(items).expect("serialize items")
}

fn json_session(path: PathBuf) -> HierarchySession {
    HierarchySession::new(Arc::new(JsonFileSource::new(path)))
}

// ============================================================
// Lifecycle
// ============================================================

#[test]
fn given_json_listing_when_opening_then_tree_is_materialized() {
    init_test_setup();

    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_listing(&temp, "glossary.json", &items_json(&glossary_items()));

    // Act
    let mut session = json_session(path);
    let report = session.open(None).unwrap().clone();

    // Assert
    assert!(report.is_clean());
    assert_eq!(session.tree().unwrap().len(), 10);
    assert!(session.selection().is_empty());
    assert!(session.expansion().is_empty());
}

#[test]
fn given_scope_when_opening_then_only_scope_subtree_loaded() {
    let mut session = HierarchySession::new(Arc::new(InMemorySource::new(glossary_items())));

    session.open(Some("D1")).unwrap();

    // Inner scope becomes the single root
    let tree = session.tree().unwrap();
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.depth(), 3);
    assert!(session.report().unwrap().is_clean());

    session.open(Some("G2")).unwrap();
    let ids: Vec<&str> = session
        .tree()
        .unwrap()
        .flatten()
        .into_iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["G2", "D3"]);
}

#[test]
fn given_open_session_when_reopening_then_selection_and_expansion_reset() {
    let mut session = HierarchySession::new(Arc::new(InMemorySource::new(glossary_items())));
    session.open(None).unwrap();
    session.check("O1").unwrap();
    session.expansion_mut().expand("G1");

    session.open(None).unwrap();

    assert!(session.selection().is_empty());
    assert!(session.expansion().is_empty());
}

#[test]
fn given_listing_shrinks_when_refreshing_then_stale_ids_dropped() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_listing(&temp, "glossary.json", &items_json(&glossary_items()));
    let mut session = json_session(path.clone());
    session.open(None).unwrap();
    session.check("D3").unwrap();
    session.check("O2").unwrap();
    session.expansion_mut().expand("G2");
    session.expansion_mut().expand("G1");

    // Act: the Customer group disappears upstream
    let remaining: Vec<DomainItem> = glossary_items()
        .into_iter()
        .filter(|i| !i.id.starts_with('G') || i.id == "G1")
        .filter(|i| i.id != "D3")
        .collect();
    fs::write(&path, items_json(&remaining)).unwrap();
    session.refresh().unwrap();

    // Assert
    let selected: Vec<&str> = session.selection().iter().collect();
    assert_eq!(selected, vec!["D2", "G1", "O2"]);
    let expanded: Vec<&str> = session.expansion().iter().collect();
    assert_eq!(expanded, vec!["G1"]);
}

#[test]
fn given_checked_node_gains_child_when_refreshing_then_child_is_selected() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_listing(&temp, "glossary.json", &items_json(&glossary_items()));
    let mut session = json_session(path.clone());
    session.open(None).unwrap();
    session.check("D2").unwrap();

    // Act: a second object appears below Ledger
    let mut grown = glossary_items();
    grown.push(DomainItem::new("O3", "Chart of accounts", DomainType::Object).with_path("G1/D2/O3"));
    fs::write(&path, items_json(&grown)).unwrap();
    session.refresh().unwrap();

    // Assert
    assert!(session.selection().contains("O3"));
    assert_eq!(session.check_state("D2").unwrap(), CheckState::Checked);
    // partially checked before, so no new subtrees are pulled in
    assert_eq!(session.check_state("G1").unwrap(), CheckState::Indeterminate);
    assert!(!session.selection().contains("D1"));
}

// ============================================================
// Selection and search through the session
// ============================================================

#[test]
fn given_search_hit_when_toggled_then_uses_hierarchical_propagation() {
    let mut session = HierarchySession::new(Arc::new(InMemorySource::new(glossary_items())));
    session.open(None).unwrap();

    // Act: pick "Invoice" from the flat result list
    let outcome = session.search(&SearchQuery::substring("^invoice$")).unwrap();
    assert!(outcome.is_empty(), "substring mode treats ^ and $ literally");
    let outcome = session.search(&SearchQuery::regex("^invoice$")).unwrap();
    let hit = outcome.match_ids(session.tree().unwrap()).remove(0);
    session.toggle(&hit).unwrap();

    // Assert
    assert_eq!(session.check_state("O1").unwrap(), CheckState::Checked);
    assert_eq!(session.check_state("D1").unwrap(), CheckState::Indeterminate);
    assert!(session.selection().contains("E1"));
    let expanded: Vec<&str> = session.expansion().iter().collect();
    assert_eq!(expanded, vec!["D1", "G1"]);
}

#[test]
fn given_blank_search_after_hit_when_searching_then_expansion_preserved() {
    let mut session = HierarchySession::new(Arc::new(InMemorySource::new(glossary_items())));
    session.open(None).unwrap();
    session.search(&SearchQuery::substring("journal")).unwrap();

    session.search(&SearchQuery::substring("")).unwrap();

    let expanded: Vec<&str> = session.expansion().iter().collect();
    assert_eq!(expanded, vec!["D2", "G1"]);
}

// ============================================================
// Fetch failures
// ============================================================

#[test]
fn given_missing_listing_when_opening_then_fetch_error_with_user_message() {
    let temp = TempDir::new().unwrap();
    let mut session = json_session(temp.path().join("absent.json"));

    let err = session.open(None).unwrap_err();

    assert!(matches!(err, ApplicationError::Fetch { .. }));
    assert_eq!(err.user_message(), "could not load hierarchy: not found");
    assert!(!session.is_open());
}

#[test]
fn given_malformed_json_when_opening_then_fetch_error_is_invalid_data() {
    let temp = TempDir::new().unwrap();
    let path = write_listing(&temp, "broken.json", "{ not json");
    let mut session = json_session(path);

    match session.open(None) {
        Err(ApplicationError::Fetch { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::InvalidData)
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

// ============================================================
// Permissions
// ============================================================

#[test]
fn given_full_document_when_initializing_permissions_then_codes_available() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let doc = format!(
        r#"{{"items": {}, "permissions": ["glossary:edit", "glossary:view"]}}"#,
        items_json(&glossary_items())
    );
    let path = write_listing(&temp, "full.json", &doc);
    let source = Arc::new(JsonFileSource::new(path));

    // Act
    let mut store = PermissionStore::new(source.clone());
    store.init().unwrap();

    // Assert
    assert!(store.has("glossary:edit").unwrap());
    assert!(!store.has("roles:admin").unwrap());
    assert!(store.has_any(&["roles:admin", "glossary:view"]).unwrap());
    assert_eq!(store.codes().unwrap(), vec!["glossary:edit", "glossary:view"]);

    // Same document still serves the hierarchy
    let mut session = HierarchySession::new(source);
    session.open(None).unwrap();
    assert_eq!(session.tree().unwrap().roots().len(), 2);
}

#[test]
fn given_uninitialized_store_when_checking_then_errors() {
    let store = PermissionStore::new(Arc::new(InMemorySource::default()));
    assert!(!store.is_loaded());
    assert!(matches!(
        store.has("glossary:view"),
        Err(ApplicationError::PermissionsNotLoaded)
    ));
}

#[test]
fn given_permissions_change_when_refreshing_then_store_updates() {
    let source = InMemorySource::default().with_permissions(vec!["a".into()]);
    let mut store = PermissionStore::new(Arc::new(source));
    store.init().unwrap();
    assert!(store.has("a").unwrap());

    // init is a no-op once loaded, refresh always reloads
    store.init().unwrap();
    store.refresh().unwrap();
    assert!(store.has("a").unwrap());
}
