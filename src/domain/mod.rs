//! Domain layer: entities and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod expansion;
pub mod search;
pub mod selection;

pub use arena::{DomainTree, TreeNode};
pub use builder::{materialize, BuildReport, ContainmentWarning, HierarchyBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use expansion::ExpansionState;
pub use search::{search, MatchMode, Matcher, SearchOutcome, SearchQuery, Segment};
pub use selection::{CheckState, SelectionChange, SelectionSet};
