//! Route matching engine
//!
//! Matching is a depth-first walk of the sealed route tree. At every node the
//! skippable paths are tried first (longest first), then the children in
//! registration order. The first subtree that ends on a terminal node wins, so
//! among overlapping patterns the one registered first takes priority.

use crate::error::{RoutingError, RoutingResult};
use crate::node::{NodeId, NodeTree, Terminal};
use crate::route::Route;
use crate::segment::split_path;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// A route resolved for a request path, with its raw parameter values
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute<'r, T> {
    route: &'r Route<T>,
    index: usize,
    params: HashMap<String, String>,
}

impl<'r, T> MatchedRoute<'r, T> {
    pub(crate) fn new(route: &'r Route<T>, index: usize, params: HashMap<String, String>) -> Self {
        Self {
            route,
            index,
            params,
        }
    }

    pub fn route(&self) -> &'r Route<T> {
        self.route
    }

    /// Position of the route in the list the router was built from
    pub fn route_index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.params
    }
}

/// Size of a sealed route tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub routes: usize,
    pub nodes: usize,
    pub terminals: usize,
    pub skippable_paths: usize,
}

/// Immutable route matcher produced by [`crate::RouterBuilder`].
///
/// Nothing is mutated after construction, so a router can be shared between
/// threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: Vec<Route<T>>,
    tree: NodeTree,
    skippable_paths: bool,
}

impl<T> Router<T> {
    pub(crate) fn new(routes: Vec<Route<T>>, tree: NodeTree, skippable_paths: bool) -> Self {
        Self {
            routes,
            tree,
            skippable_paths,
        }
    }

    /// Resolve a request path.
    ///
    /// The path must be empty or start with `/`; anything else is an
    /// `InvalidArgument` error. A path that matches no route is `Ok(None)`.
    pub fn match_path(&self, path: &str) -> RoutingResult<Option<MatchedRoute<'_, T>>> {
        self.find(path, self.skippable_paths)
    }

    /// Resolve a request path by plain per-segment descent, ignoring the
    /// skippable path index. Always returns the same result as
    /// [`Router::match_path`].
    pub fn match_path_without_shortcuts(
        &self,
        path: &str,
    ) -> RoutingResult<Option<MatchedRoute<'_, T>>> {
        self.find(path, false)
    }

    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    pub fn route_at(&self, index: usize) -> Option<&Route<T>> {
        self.routes.get(index)
    }

    /// Look a route up by name
    pub fn route_by_name(&self, name: &str) -> Option<&Route<T>> {
        self.routes.iter().find(|route| route.name() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            routes: self.routes.len(),
            nodes: self.tree.len(),
            terminals: self
                .tree
                .iter()
                .filter(|(_, node)| node.is_terminal())
                .count(),
            skippable_paths: self.tree.skippable_path_count(),
        }
    }

    fn find(&self, path: &str, use_shortcuts: bool) -> RoutingResult<Option<MatchedRoute<'_, T>>> {
        let (found, visits) = if path.is_empty() {
            let root = self.tree.root();
            (Some(root).filter(|&root| self.tree.node(root).is_terminal()), 1)
        } else if path.starts_with('/') {
            let search = self.search(path, use_shortcuts);
            (search.found, search.visits)
        } else {
            return Err(RoutingError::invalid_argument(format!(
                "request path '{}' must be empty or start with a slash",
                path
            )));
        };

        let matched = found
            .and_then(|node| self.tree.node(node).terminal())
            .and_then(|terminal| self.resolve(terminal, path));

        match &matched {
            Some(m) => trace!(
                "Matched '{}' to route '{}' ({} nodes visited)",
                path,
                m.route.path(),
                visits
            ),
            None => trace!("No route matched '{}' ({} nodes visited)", path, visits),
        }

        Ok(matched)
    }

    fn search(&self, path: &str, use_shortcuts: bool) -> Search {
        let mut search = Search {
            use_shortcuts,
            failed: HashSet::new(),
            visits: 0,
            found: None,
        };
        search.found = self.explore(&mut search, self.tree.root(), Some(path));
        search
    }

    /// Depth-first search for a terminal node. `remaining` always starts with
    /// a slash; `None` means the whole path has been consumed.
    ///
    /// The outcome only depends on the node and on how much of the path is
    /// left, so a failed pair is never explored twice.
    fn explore(
        &self,
        search: &mut Search,
        id: NodeId,
        remaining: Option<&str>,
    ) -> Option<NodeId> {
        search.visits += 1;
        let Some(remaining) = remaining else {
            return Some(id).filter(|&id| self.tree.node(id).is_terminal());
        };

        let state = (id, remaining.len());
        if search.failed.contains(&state) {
            return None;
        }

        if search.use_shortcuts {
            for (target, rest) in self.tree.matched_skippable_paths(id, remaining) {
                if let Some(found) = self.explore(search, target, rest) {
                    return Some(found);
                }
            }
        }

        let rest = &remaining[1..];
        let (component, next) = match rest.find('/') {
            Some(end) => (&rest[..end], Some(&rest[end..])),
            None => (rest, None),
        };

        for child in self.tree.matched_children(id, component) {
            if let Some(found) = self.explore(search, child, next) {
                return Some(found);
            }
        }

        search.failed.insert(state);
        None
    }

    fn resolve(&self, terminal: &Terminal, path: &str) -> Option<MatchedRoute<'_, T>> {
        let route = self.routes.get(terminal.route)?;
        let components = split_path(path);
        let params = terminal
            .params
            .iter()
            .filter_map(|(position, name)| {
                components
                    .get(*position)
                    .map(|value| (name.clone(), value.to_string()))
            })
            .collect();

        Some(MatchedRoute::new(route, terminal.route, params))
    }
}

/// State of one depth-first search
struct Search {
    use_shortcuts: bool,
    /// `(node, remaining length)` pairs known not to reach a terminal
    failed: HashSet<(NodeId, usize)>,
    visits: usize,
    found: Option<NodeId>,
}
