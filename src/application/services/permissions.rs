//! Permission store
//!
//! Holds the permission codes of the current user. The store is passed to
//! whoever needs it and has an explicit init/refresh lifecycle.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::infrastructure::traits::PermissionSource;

pub struct PermissionStore {
    source: Arc<dyn PermissionSource>,
    codes: Option<HashSet<String>>,
}

impl PermissionStore {
    pub fn new(source: Arc<dyn PermissionSource>) -> Self {
        Self { source, codes: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.codes.is_some()
    }

    /// Load the permission list unless it is already loaded.
    pub fn init(&mut self) -> ApplicationResult<()> {
        if self.codes.is_none() {
            self.refresh()?;
        }
        Ok(())
    }

    /// Reload the permission list from the source.
    pub fn refresh(&mut self) -> ApplicationResult<()> {
        let codes: HashSet<String> = self
            .source
            .fetch_permissions()
            .fetch_context("permissions")?
            .into_iter()
            .collect();
        debug!("permissions loaded: {}", codes.len());
        self.codes = Some(codes);
        Ok(())
    }

    pub fn has(&self, code: &str) -> ApplicationResult<bool> {
        let codes = self.codes.as_ref().ok_or(ApplicationError::PermissionsNotLoaded)?;
        Ok(codes.contains(code))
    }

    pub fn has_any(&self, wanted: &[&str]) -> ApplicationResult<bool> {
        let codes = self.codes.as_ref().ok_or(ApplicationError::PermissionsNotLoaded)?;
        Ok(wanted.iter().any(|c| codes.contains(*c)))
    }

    /// Loaded codes in sorted order.
    pub fn codes(&self) -> ApplicationResult<Vec<&str>> {
        let codes = self.codes.as_ref().ok_or(ApplicationError::PermissionsNotLoaded)?;
        let mut sorted: Vec<&str> = codes.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        Ok(sorted)
    }
}
