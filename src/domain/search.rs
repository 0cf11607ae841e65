//! Name search over a hierarchy, with the expansion needed to show every hit.

use std::collections::HashSet;

use generational_arena::Index;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::DomainTree;
use crate::domain::entities::DomainItem;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::expansion::ExpansionState;

/// How the query text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Literal substring
    #[default]
    Substring,
    /// Regular expression
    Regex,
}

/// Compiled name predicate.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn new(query: &str, mode: MatchMode, case_sensitive: bool) -> DomainResult<Self> {
        let pattern = match mode {
            MatchMode::Substring => regex::escape(query),
            MatchMode::Regex => query.to_string(),
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| DomainError::InvalidPattern {
                pattern: query.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Split `name` into matched and unmatched runs.
    pub fn highlight<'a>(&self, name: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut last = 0;
        for m in self.regex.find_iter(name).filter(|m| !m.is_empty()) {
            if m.start() > last {
                segments.push(Segment {
                    text: &name[last..m.start()],
                    matched: false,
                });
            }
            segments.push(Segment {
                text: m.as_str(),
                matched: true,
            });
            last = m.end();
        }
        if last < name.len() {
            segments.push(Segment {
                text: &name[last..],
                matched: false,
            });
        }
        segments
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// A search request as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub mode: MatchMode,
    pub case_sensitive: bool,
}

impl SearchQuery {
    pub fn substring(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::Substring,
            case_sensitive: false,
        }
    }

    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::Regex,
            case_sensitive: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn matcher(&self) -> DomainResult<Matcher> {
        Matcher::new(&self.text, self.mode, self.case_sensitive)
    }
}

/// Hits and the expansion state that reveals them.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Matching nodes in pre-order
    pub matches: Vec<Index>,
    /// Previous expansion plus every ancestor of a match
    pub expanded: ExpansionState,
}

impl SearchOutcome {
    pub fn match_items<'a>(&self, tree: &'a DomainTree) -> Vec<&'a DomainItem> {
        self.matches
            .iter()
            .filter_map(|&idx| tree.get_node(idx))
            .map(|node| &node.item)
            .collect()
    }

    pub fn match_ids(&self, tree: &DomainTree) -> Vec<String> {
        self.match_items(tree).into_iter().map(|i| i.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Find nodes whose name matches `query` and the ancestors to expand.
///
/// A blank query yields no matches and hands back `previous` unchanged.
#[instrument(level = "debug", skip(tree, previous))]
pub fn search(tree: &DomainTree, query: &SearchQuery, previous: &ExpansionState) -> DomainResult<SearchOutcome> {
    let mut expanded = previous.clone();
    if query.is_blank() {
        return Ok(SearchOutcome {
            matches: Vec::new(),
            expanded,
        });
    }

    let matcher = query.matcher()?;
    let matches: Vec<Index> = tree
        .iter()
        .filter(|(_, node)| matcher.is_match(&node.item.name))
        .map(|(idx, _)| idx)
        .collect();

    // Ancestors collected by this search; ids only present in `previous` may
    // still have unexpanded ancestors of their own.
    let mut collected: HashSet<Index> = HashSet::new();
    for &idx in &matches {
        for ancestor in tree.ancestors(idx) {
            if !collected.insert(ancestor) {
                break;
            }
            if let Some(node) = tree.get_node(ancestor) {
                expanded.expand(node.id());
            }
        }
    }

    debug!(matches = matches.len(), expanded = expanded.len(), "search complete");
    Ok(SearchOutcome { matches, expanded })
}
