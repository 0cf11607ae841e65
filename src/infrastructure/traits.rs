//! I/O boundary traits for testability
//!
//! These traits abstract the hierarchy listing endpoint and the permission list,
//! allowing services to be tested with in-memory implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{DomainItem, PATH_SEPARATOR};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Read endpoint returning hierarchy records.
pub trait ItemSource: Send + Sync {
    /// List items, optionally restricted to the subtree rooted at `scope`.
    ///
    /// A scoped listing includes the scope item itself, with every chain rebased
    /// so that the scope item is a root.
    fn list_items(&self, scope: Option<&str>) -> io::Result<Vec<DomainItem>>;
}

/// Source of the current user's permission codes.
pub trait PermissionSource: Send + Sync {
    fn fetch_permissions(&self) -> io::Result<Vec<String>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// On-disk listing document: either a bare item array or an object carrying
/// `items` and optionally `permissions`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingDocument {
    Items(Vec<DomainItem>),
    Full {
        items: Vec<DomainItem>,
        #[serde(default)]
        permissions: Vec<String>,
    },
}

impl ListingDocument {
    fn into_parts(self) -> (Vec<DomainItem>, Vec<String>) {
        match self {
            ListingDocument::Items(items) => (items, Vec::new()),
            ListingDocument::Full { items, permissions } => (items, permissions),
        }
    }
}

/// Listing read from a JSON file, as exported from the glossary backend.
pub struct JsonFileSource {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, Arc::new(RealFileSystem))
    }

    pub fn with_fs(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> io::Result<(Vec<DomainItem>, Vec<String>)> {
        if !self.fs.exists(&self.path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("listing not found: {}", self.path.display()),
            ));
        }
        let content = self.fs.read_to_string(&self.path)?;
        let doc: ListingDocument = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(doc.into_parts())
    }
}

impl ItemSource for JsonFileSource {
    fn list_items(&self, scope: Option<&str>) -> io::Result<Vec<DomainItem>> {
        let (items, _) = self.load()?;
        debug!("list_items: path={} total={}", self.path.display(), items.len());
        Ok(filter_scope(items, scope))
    }
}

impl PermissionSource for JsonFileSource {
    fn fetch_permissions(&self) -> io::Result<Vec<String>> {
        let (_, permissions) = self.load()?;
        Ok(permissions)
    }
}

/// Fixed listing held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub items: Vec<DomainItem>,
    pub permissions: Vec<String>,
}

impl InMemorySource {
    pub fn new(items: Vec<DomainItem>) -> Self {
        Self {
            items,
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }
}

impl ItemSource for InMemorySource {
    fn list_items(&self, scope: Option<&str>) -> io::Result<Vec<DomainItem>> {
        Ok(filter_scope(self.items.clone(), scope))
    }
}

impl PermissionSource for InMemorySource {
    fn fetch_permissions(&self) -> io::Result<Vec<String>> {
        Ok(self.permissions.clone())
    }
}

/// Keep the subtree rooted at `scope`, with chains rebased so `scope` is a root.
fn filter_scope(items: Vec<DomainItem>, scope: Option<&str>) -> Vec<DomainItem> {
    let Some(scope) = scope else {
        return items;
    };
    items
        .into_iter()
        .filter_map(|mut item| {
            let chain: Vec<String> = item.ancestor_ids().into_iter().map(str::to_string).collect();
            let pos = chain.iter().position(|id| *id == scope)?;
            if pos > 0 {
                let sep = PATH_SEPARATOR.to_string();
                let rebased = chain[pos..].join(&sep);
                item.path_name = item.path_name.take().map(|names| {
                    let parts: Vec<&str> = names.split(PATH_SEPARATOR).collect();
                    if parts.len() == chain.len() {
                        parts[pos..].join(&sep)
                    } else {
                        warn!(
                            id = %item.id,
                            ids = chain.len(),
                            names = parts.len(),
                            "path_name does not line up with path_id, keeping it as is"
                        );
                        names
                    }
                });
                item.path_id = Some(rebased);
                if item.id == scope {
                    item.parent_id = None;
                }
            }
            Some(item)
        })
        .collect()
}
