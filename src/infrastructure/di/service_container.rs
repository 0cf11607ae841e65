//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{HierarchySession, PermissionStore};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, ItemSource, JsonFileSource, PermissionSource, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Hierarchy listing endpoint
    pub items: Arc<dyn ItemSource>,

    /// Permission list endpoint
    pub permissions: Arc<dyn PermissionSource>,
}

impl ServiceContainer {
    /// Create a container reading the listing at `listing` from disk.
    pub fn new(settings: Settings, listing: PathBuf) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let source = Arc::new(JsonFileSource::with_fs(listing, fs));
        Self::with_deps(settings, source.clone(), source)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        items: Arc<dyn ItemSource>,
        permissions: Arc<dyn PermissionSource>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            items,
            permissions,
        }
    }

    pub fn hierarchy_session(&self) -> HierarchySession {
        HierarchySession::new(self.items.clone())
    }

    pub fn permission_store(&self) -> PermissionStore {
        PermissionStore::new(self.permissions.clone())
    }
}
