//! Hierarchy session service
//!
//! Owns one open hierarchy view: the materialized tree, its selection and its
//! expansion state. A session is opened for a scope, refreshed in place and
//! closed when the enclosing dialog goes away.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    search, BuildReport, CheckState, DomainItem, DomainTree, ExpansionState, HierarchyBuilder,
    SearchOutcome, SearchQuery, SelectionChange, SelectionSet,
};
use crate::infrastructure::traits::ItemSource;

#[derive(Debug)]
struct Loaded {
    scope: Option<String>,
    tree: DomainTree,
    report: BuildReport,
}

/// Service holding the state of one hierarchy browser.
pub struct HierarchySession {
    source: Arc<dyn ItemSource>,
    loaded: Option<Loaded>,
    selection: SelectionSet,
    expansion: ExpansionState,
}

impl HierarchySession {
    /// Create a closed session reading from `source`.
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self {
            source,
            loaded: None,
            selection: SelectionSet::new(),
            expansion: ExpansionState::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.loaded.is_some()
    }

    /// Fetch and materialize the hierarchy below `scope`, starting with an empty
    /// selection and everything collapsed.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&mut self, scope: Option<&str>) -> ApplicationResult<&BuildReport> {
        let loaded = self.fetch(scope)?;
        self.selection.clear();
        self.expansion.collapse_all();
        info!(nodes = loaded.tree.len(), "hierarchy opened");
        Ok(&self.loaded.insert(loaded).report)
    }

    /// Refetch the current scope; selection and expansion keep ids that still exist.
    ///
    /// Nodes that were fully checked are checked again on the new tree, so children
    /// added upstream come back selected.
    #[instrument(level = "debug", skip(self))]
    pub fn refresh(&mut self) -> ApplicationResult<&BuildReport> {
        let current = self.loaded()?;
        let scope = current.scope.clone();
        let fully_checked: Vec<String> = self
            .selection
            .iter()
            .filter(|id| matches!(self.selection.state(&current.tree, id), Ok(CheckState::Checked)))
            .map(str::to_string)
            .collect();

        let loaded = self.fetch(scope.as_deref())?;
        self.selection.retain_known(&loaded.tree);
        for id in fully_checked.iter().filter(|id| loaded.tree.contains(id)) {
            self.selection.check(&loaded.tree, id)?;
        }
        self.expansion.retain_known(&loaded.tree);
        debug!(selected = self.selection.len(), "hierarchy refreshed");
        Ok(&self.loaded.insert(loaded).report)
    }

    /// Drop the tree and reset selection and expansion.
    pub fn close(&mut self) {
        self.loaded = None;
        self.selection.clear();
        self.expansion.collapse_all();
    }

    fn fetch(&self, scope: Option<&str>) -> ApplicationResult<Loaded> {
        let what = match scope {
            Some(s) => format!("hierarchy below '{s}'"),
            None => "hierarchy".to_string(),
        };
        let items = self.source.list_items(scope).fetch_context(&what)?;
        let mut builder = HierarchyBuilder::new();
        let tree = builder.materialize(items);
        Ok(Loaded {
            scope: scope.map(str::to_string),
            tree,
            report: builder.into_report(),
        })
    }

    fn loaded(&self) -> ApplicationResult<&Loaded> {
        self.loaded.as_ref().ok_or(ApplicationError::SessionNotOpen)
    }

    pub fn tree(&self) -> ApplicationResult<&DomainTree> {
        Ok(&self.loaded()?.tree)
    }

    pub fn report(&self) -> ApplicationResult<&BuildReport> {
        Ok(&self.loaded()?.report)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    pub fn check(&mut self, id: &str) -> ApplicationResult<SelectionChange> {
        self.apply(id, true)
    }

    pub fn uncheck(&mut self, id: &str) -> ApplicationResult<SelectionChange> {
        self.apply(id, false)
    }

    pub fn toggle(&mut self, id: &str) -> ApplicationResult<SelectionChange> {
        let checked = !self.selection.contains(id);
        self.apply(id, checked)
    }

    fn apply(&mut self, id: &str, checked: bool) -> ApplicationResult<SelectionChange> {
        let loaded = self.loaded.as_ref().ok_or(ApplicationError::SessionNotOpen)?;
        Ok(self.selection.apply(&loaded.tree, id, checked)?)
    }

    pub fn check_state(&self, id: &str) -> ApplicationResult<CheckState> {
        Ok(self.selection.state(self.tree()?, id)?)
    }

    /// Run a search and adopt its expansion so every hit is visible.
    ///
    /// A blank query leaves the current expansion as it is.
    pub fn search(&mut self, query: &SearchQuery) -> ApplicationResult<SearchOutcome> {
        let loaded = self.loaded.as_ref().ok_or(ApplicationError::SessionNotOpen)?;
        let outcome = search(&loaded.tree, query, &self.expansion)?;
        self.expansion = outcome.expanded.clone();
        Ok(outcome)
    }

    pub fn selected_items(&self) -> ApplicationResult<Vec<&DomainItem>> {
        Ok(self.selection.selected_items(self.tree()?))
    }
}
