//! Parameterized custom-identifier routing
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! Custom identifiers are treated as `/`-delimited paths. A pattern segment
//! beginning with `:` is a named capture; every other segment must match
//! literally. Patterns are registered once at startup and the trie is
//! read-only afterwards, so concurrent dispatches share it without locking.
//!
//! Matching prefers a literal branch over a parameter branch at every
//! position, backtracking to the parameter edge when the literal branch
//! dead-ends. "No route" is an expected outcome (`None`), not an error.

use std::collections::HashMap;

use log::debug;

use crate::error::RegistryError;

/// Reserved literal route that always resolves to a registered no-op, so
/// disabled or expired UI elements never fall through to "route not found".
pub const VOID_ROUTE: &str = "/void";

/// Name → captured-value map produced by one trie match. Owned by the single
/// dispatch that produced it and discarded after the handler returns.
pub type RouteParams = HashMap<String, String>;

/// A trie over route patterns, generic over the handler payload.
pub struct PathTrie<H> {
    root: TrieNode<H>,
    len: usize,
}

struct TrieNode<H> {
    literals: HashMap<String, TrieNode<H>>,
    param: Option<ParamEdge<H>>,
    handler: Option<H>,
}

struct ParamEdge<H> {
    name: String,
    node: Box<TrieNode<H>>,
}

impl<H> Default for TrieNode<H> {
    fn default() -> Self {
        Self {
            literals: HashMap::new(),
            param: None,
            handler: None,
        }
    }
}

impl<H> Default for PathTrie<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PathTrie<H> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a route. Fails if the pattern is structurally ambiguous with
    /// an existing one: same terminal shape, or two differently named
    /// captures at the same branch. Ambiguity is rejected rather than
    /// overwritten so runtime routing stays deterministic.
    pub fn register(&mut self, pattern: &str, handler: H) -> Result<(), RegistryError> {
        let mut node = &mut self.root;
        for segment in segments(pattern) {
            if let Some(name) = segment.strip_prefix(':') {
                let edge = node
                    .param
                    .get_or_insert_with(|| ParamEdge {
                        name: name.to_string(),
                        node: Box::default(),
                    });
                if edge.name != name {
                    return Err(RegistryError::AmbiguousRoute(pattern.to_string()));
                }
                node = &mut edge.node;
            } else {
                node = node.literals.entry(segment.to_string()).or_default();
            }
        }
        if node.handler.is_some() {
            return Err(RegistryError::AmbiguousRoute(pattern.to_string()));
        }
        node.handler = Some(handler);
        self.len += 1;
        debug!("Registered route pattern: {pattern}");
        Ok(())
    }

    /// Resolve a concrete path to its handler and captured parameters.
    ///
    /// Returns `None` when no registered pattern matches, including when the
    /// segment counts differ.
    pub fn matches(&self, path: &str) -> Option<(&H, RouteParams)> {
        let parts: Vec<&str> = segments(path).collect();
        let mut params = RouteParams::new();
        let handler = Self::descend(&self.root, &parts, &mut params)?;
        Some((handler, params))
    }

    /// Depth-first walk trying the literal branch first, falling back to the
    /// parameter edge when the literal branch reaches no handler. A failed
    /// parameter attempt restores whatever value the capture held before it.
    fn descend<'a>(
        node: &'a TrieNode<H>,
        parts: &[&str],
        params: &mut RouteParams,
    ) -> Option<&'a H> {
        let Some((segment, rest)) = parts.split_first() else {
            return node.handler.as_ref();
        };
        if let Some(next) = node.literals.get(*segment) {
            if let Some(handler) = Self::descend(next, rest, params) {
                return Some(handler);
            }
        }
        if let Some(edge) = &node.param {
            let previous = params.insert(edge.name.clone(), (*segment).to_string());
            if let Some(handler) = Self::descend(&edge.node, rest, params) {
                return Some(handler);
            }
            match previous {
                Some(value) => params.insert(edge.name.clone(), value),
                None => params.remove(&edge.name),
            };
        }
        None
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
