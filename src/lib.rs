//! glosstree: business glossary hierarchies.
//!
//! Turns flat domain listings (items carrying a `/`-joined ancestor id chain) into
//! an arena-backed forest, propagates checkbox selection through it, and searches
//! names while computing which ancestors must be expanded to show each hit.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use domain::{
    materialize, search, BuildReport, CheckState, DomainItem, DomainTree, DomainType,
    ExpansionState, SearchQuery, SelectionSet,
};
