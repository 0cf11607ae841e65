//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ItemSource, PermissionSource)
//! but are themselves concrete structs, not traits.

mod hierarchy;
mod permissions;

pub use hierarchy::HierarchySession;
pub use permissions::PermissionStore;
