//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Separator used in `path_id` and `path_name` chains.
pub const PATH_SEPARATOR: char = '/';

/// Kind of a glossary hierarchy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// Top-level grouping of business domains
    Group,
    /// Business domain (subject area)
    Domain,
    /// Business object within a domain
    Object,
    /// Business activity within a domain
    Activity,
    /// Logical entity attached to a business object
    Entity,
}

impl DomainType {
    pub const ALL: [DomainType; 5] = [
        DomainType::Group,
        DomainType::Domain,
        DomainType::Object,
        DomainType::Activity,
        DomainType::Entity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DomainType::Group => "Group",
            DomainType::Domain => "Business domain",
            DomainType::Object => "Business object",
            DomainType::Activity => "Business activity",
            DomainType::Entity => "Entity",
        }
    }

    /// Single-glyph marker for terminal rendering.
    pub fn icon(&self) -> &'static str {
        match self {
            DomainType::Group => "▣",
            DomainType::Domain => "◆",
            DomainType::Object => "●",
            DomainType::Activity => "▶",
            DomainType::Entity => "■",
        }
    }

    /// Whether an entry of this type may directly contain an entry of type `child`.
    ///
    /// Only used for reporting; materialization never rejects items on this basis.
    pub fn can_contain(&self, child: DomainType) -> bool {
        match self {
            DomainType::Group => matches!(child, DomainType::Group | DomainType::Domain),
            DomainType::Domain => matches!(
                child,
                DomainType::Domain | DomainType::Object | DomainType::Activity
            ),
            DomainType::Object => matches!(child, DomainType::Entity),
            DomainType::Activity | DomainType::Entity => false,
        }
    }

    pub fn is_leaf_type(&self) -> bool {
        matches!(self, DomainType::Activity | DomainType::Entity)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Group => "group",
            DomainType::Domain => "domain",
            DomainType::Object => "object",
            DomainType::Activity => "activity",
            DomainType::Entity => "entity",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(DomainType::Group),
            "domain" => Ok(DomainType::Domain),
            "object" => Ok(DomainType::Object),
            "activity" => Ok(DomainType::Activity),
            "entity" => Ok(DomainType::Entity),
            other => Err(DomainError::UnknownDomainType(other.to_string())),
        }
    }
}

/// One record of the backend hierarchy listing.
///
/// `path_id` holds the ancestor id chain joined by `/`, ending with the
/// item's own id, e.g. `"A/B"` for `B` below `A`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DomainType,
    #[serde(default, alias = "pathId", skip_serializing_if = "Option::is_none")]
    pub path_id: Option<String>,
    #[serde(default, alias = "pathName", skip_serializing_if = "Option::is_none")]
    pub path_name: Option<String>,
    #[serde(default, alias = "childCount")]
    pub child_count: u32,
    #[serde(default, alias = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl DomainItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DomainType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            path_id: None,
            path_name: None,
            child_count: 0,
            parent_id: None,
        }
    }

    pub fn with_path(mut self, path_id: impl Into<String>) -> Self {
        self.path_id = Some(path_id.into());
        self
    }

    /// Ancestor chain including the item itself.
    ///
    /// Empty segments are skipped; a missing or empty `path_id` yields `[id]`.
    pub fn ancestor_ids(&self) -> Vec<&str> {
        let ids: Vec<&str> = self
            .path_id
            .as_deref()
            .map(|p| p.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        if ids.is_empty() {
            vec![self.id.as_str()]
        } else {
            ids
        }
    }

    /// Length of the ancestor chain; roots have depth 1.
    pub fn depth(&self) -> usize {
        self.ancestor_ids().len()
    }

    /// Id of the direct parent according to `path_id`, if any.
    pub fn path_parent(&self) -> Option<&str> {
        let ids = self.ancestor_ids();
        if ids.len() < 2 {
            None
        } else {
            Some(ids[ids.len() - 2])
        }
    }
}

impl fmt::Display for DomainItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.icon(), self.name)
    }
}
