//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgMatches, Parser, Subcommand, ValueHint};

/// Business glossary hierarchies: materialize domain trees, propagate selection, search and expand
#[derive(Parser, Debug)]
#[command(name = "glosstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Listing file (JSON array of items, or {"items": [...], "permissions": [...]})
    #[arg(short, long, global = true, env = "GLOSSTREE_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Restrict the listing to the subtree below this id
    #[arg(short, long, global = true)]
    pub scope: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hierarchy as tree
    Tree {
        /// Append child counts to inner nodes
        #[arg(long)]
        counts: bool,
    },

    /// Search node names and show the hits in context
    Search {
        /// Search text
        query: String,
        /// Interpret the query as a regular expression
        #[arg(long)]
        regex: bool,
        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Apply check/uncheck operations in order and show the selection
    Select {
        /// Id to check (repeatable)
        #[arg(long = "check", value_name = "ID")]
        check: Vec<String>,
        /// Id to uncheck (repeatable, interleaves with --check in command-line order)
        #[arg(long = "uncheck", value_name = "ID")]
        uncheck: Vec<String>,
        /// Print selected ids only
        #[arg(long)]
        ids: bool,
    },

    /// Print items as JSON with paths rebuilt from tree position
    Flatten,

    /// Report orphans, duplicates and unexpected containment
    Check,

    /// List permission codes from the listing file
    Permissions {
        /// Exit with failure unless this code is present
        #[arg(long)]
        require: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show config file locations
    Path,
}

/// One `--check` or `--uncheck` of `select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOp {
    Check(String),
    Uncheck(String),
}

/// `select` operations in the order they were typed.
///
/// Returns nothing unless `matches` holds a `select` subcommand.
pub fn select_ops(matches: &ArgMatches) -> Vec<SelectOp> {
    let Some(("select", sub)) = matches.subcommand() else {
        return Vec::new();
    };

    let mut indexed: Vec<(usize, SelectOp)> = Vec::new();
    let mut collect = |name: &str, op: fn(String) -> SelectOp| {
        if let (Some(values), Some(indices)) = (sub.get_many::<String>(name), sub.indices_of(name)) {
            indexed.extend(indices.zip(values).map(|(i, v)| (i, op(v.clone()))));
        }
    };
    collect("check", SelectOp::Check);
    collect("uncheck", SelectOp::Uncheck);

    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, op)| op).collect()
}
