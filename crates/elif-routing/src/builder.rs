//! Route tree construction
//!
//! [`RouterBuilder`] parses every route once, folds the segment sequences into
//! a [`NodeTree`] and seals the result into a [`Router`]. The builder is consumed
//! by value, so no route can be added after a router has been produced.

use crate::config::RouterConfig;
use crate::error::{RoutingError, RoutingResult};
use crate::matcher::Router;
use crate::node::{NodeId, NodeKind, NodeTree, Terminal};
use crate::reverse::ReverseRouter;
use crate::route::Route;
use crate::segment::{parse_pattern, ConstraintAliases, Segment};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Builds a [`Router`] and/or a [`ReverseRouter`] from an ordered route list
#[derive(Debug)]
pub struct RouterBuilder<T> {
    routes: Vec<Route<T>>,
    aliases: ConstraintAliases,
    config: RouterConfig,
}

impl<T> RouterBuilder<T> {
    pub fn new(routes: Vec<Route<T>>) -> Self {
        Self {
            routes,
            aliases: ConstraintAliases::default(),
            config: RouterConfig::default(),
        }
    }

    /// Use a custom constraint alias registry
    pub fn with_aliases(mut self, aliases: ConstraintAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a route after the ones given to [`RouterBuilder::new`]
    pub fn route(mut self, route: Route<T>) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    /// Seal the route tree
    pub fn build(self) -> RoutingResult<Router<T>> {
        self.build_both().map(|(router, _)| router)
    }

    /// Build only the reverse router; no tree is constructed
    pub fn build_reverse_router(self) -> RoutingResult<ReverseRouter> {
        let parsed = parse_routes(&self.routes, &self.aliases)?;
        Ok(ReverseRouter::from_parsed(&self.routes, parsed))
    }

    /// Build the router and the reverse router from the same parsed routes
    pub fn build_both(self) -> RoutingResult<(Router<T>, ReverseRouter)> {
        let parsed = parse_routes(&self.routes, &self.aliases)?;

        let mut tree = NodeTree::new();
        for (index, (route, segments)) in self.routes.iter().zip(&parsed).enumerate() {
            insert_route(&mut tree, &self.routes, index, route, segments)?;
        }

        let skippable_paths = if self.config.enable_skippable_paths {
            tree.index_skippable_paths()
        } else {
            0
        };

        info!(
            "Route tree sealed: {} routes, {} nodes, {} skippable paths",
            self.routes.len(),
            tree.len(),
            skippable_paths
        );

        let reverse = ReverseRouter::from_parsed(&self.routes, parsed);
        let router = Router::new(self.routes, tree, self.config.enable_skippable_paths);
        Ok((router, reverse))
    }
}

/// Parse every route and reject duplicate names
fn parse_routes<T>(
    routes: &[Route<T>],
    aliases: &ConstraintAliases,
) -> RoutingResult<Vec<Vec<Segment>>> {
    let mut names = HashSet::new();
    routes
        .iter()
        .map(|route| {
            if let Some(name) = route.name() {
                if !names.insert(name) {
                    return Err(RoutingError::DuplicateRouteName(name.to_string()));
                }
            }
            parse_pattern(route.path(), aliases)
        })
        .collect()
}

fn insert_route<T>(
    tree: &mut NodeTree,
    routes: &[Route<T>],
    index: usize,
    route: &Route<T>,
    segments: &[Segment],
) -> RoutingResult<()> {
    let params: BTreeMap<usize, String> = segments
        .iter()
        .enumerate()
        .filter_map(|(position, segment)| {
            segment
                .param_name()
                .map(|name| (position, name.to_string()))
        })
        .collect();

    let node = segments.iter().fold(tree.root(), |node, segment| {
        tree.find_or_insert_child(node, segment)
    });

    mark(tree, routes, node, index, &params)?;

    if !route.option().is_strict_check_trailing() {
        let alternate = trailing_alternate(tree, node);
        if let Err(err) = mark(tree, routes, alternate, index, &params) {
            warn!(
                "Cannot register '{}' without strict trailing check: {}",
                route.path(),
                err
            );
            return Err(err);
        }
    }

    debug!(
        "Registered route '{}' ({} segments, {} parameters)",
        route.path(),
        segments.len(),
        params.len()
    );

    Ok(())
}

/// The node standing for the same route with the trailing slash toggled
fn trailing_alternate(tree: &mut NodeTree, node: NodeId) -> NodeId {
    let current = tree.node(node);
    if let (NodeKind::Blank, Some(parent)) = (current.kind(), current.parent()) {
        return parent;
    }
    tree.find_or_insert_child(node, &Segment::Separator)
}

fn mark<T>(
    tree: &mut NodeTree,
    routes: &[Route<T>],
    node: NodeId,
    index: usize,
    params: &BTreeMap<usize, String>,
) -> RoutingResult<()> {
    let terminal = Terminal {
        route: index,
        params: params.clone(),
    };

    tree.mark_terminal(node, terminal).map_err(|existing| {
        let existing = routes
            .get(existing)
            .map(|route| route.path().to_string())
            .unwrap_or_default();
        RoutingError::duplicate_route(routes[index].path(), existing)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteOption;
    use tracing_test::traced_test;

    fn lenient(path: &str) -> Route {
        Route::new(path).with_option(RouteOption::new().strict_check_trailing(false))
    }

    #[test]
    fn test_build_counts_nodes() {
        let router = RouterBuilder::new(vec![
            Route::new("/api/v1/users"),
            Route::new("/api/v1/posts"),
        ])
        .build()
        .unwrap();

        let stats = router.stats();
        assert_eq!(stats.routes, 2);
        // root, api, v1, users, posts
        assert_eq!(stats.nodes, 5);
        assert_eq!(stats.terminals, 2);
    }

    #[test]
    fn test_duplicate_route() {
        let err = RouterBuilder::new(vec![Route::new("/users/:id"), Route::new("/users/:name")])
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            RoutingError::duplicate_route("/users/:name", "/users/:id")
        );
    }

    #[test]
    fn test_different_constraints_do_not_conflict() {
        let result = RouterBuilder::new(vec![
            Route::new(r"/users/:id(\d+)"),
            Route::new(r"/users/:id([0-9]+)"),
            Route::new("/users/:id"),
        ])
        .build();

        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_route_name() {
        let err = RouterBuilder::new(vec![
            Route::new("/a").with_name("home"),
            Route::new("/b").with_name("home"),
        ])
        .build_reverse_router()
        .unwrap_err();

        assert_eq!(err, RoutingError::DuplicateRouteName("home".into()));
    }

    #[test]
    fn test_invalid_pattern_aborts_build() {
        let result = RouterBuilder::new(vec![Route::new("/ok"), Route::new("/bad/:id(")]).build();
        assert!(matches!(result, Err(RoutingError::InvalidPattern { .. })));
    }

    #[test]
    fn test_lenient_route_marks_both_nodes() {
        let router = RouterBuilder::new(vec![lenient("/foo"), lenient("/bar/")])
            .build()
            .unwrap();
        assert_eq!(router.stats().terminals, 4);
    }

    #[test]
    fn test_lenient_root_marks_root() {
        let router = RouterBuilder::new(vec![lenient("/")]).build().unwrap();
        let matched = router.match_path("").unwrap().unwrap();
        assert_eq!(matched.route().path(), "/");
    }

    #[test]
    fn test_lenient_adds_blank_child() {
        let router = RouterBuilder::new(vec![Route::new("/foo/bar/"), lenient("/foo")])
            .build()
            .unwrap();
        let matched = router.match_path("/foo/").unwrap().unwrap();
        assert_eq!(matched.route().path(), "/foo");
    }

    #[test]
    #[traced_test]
    fn test_lenient_conflict_is_rejected() {
        let err = RouterBuilder::new(vec![Route::new("/foo/"), lenient("/foo")])
            .build()
            .unwrap_err();

        assert_eq!(err, RoutingError::duplicate_route("/foo", "/foo/"));
        assert!(logs_contain("without strict trailing check"));
    }

    #[test]
    fn test_strict_route_after_lenient_twin_is_rejected() {
        // The lenient route already owns the blank node under `foo`
        let err = RouterBuilder::new(vec![lenient("/foo"), Route::new("/foo/")])
            .build()
            .unwrap_err();

        assert_eq!(err, RoutingError::duplicate_route("/foo/", "/foo"));
        assert!(err.is_build_error());
    }

    #[test]
    fn test_strict_trailing_is_distinct() {
        assert!(RouterBuilder::new(vec![Route::new("/foo/"), Route::new("/foo")])
            .build()
            .is_ok());
    }

    #[test]
    fn test_custom_aliases() {
        let aliases = ConstraintAliases::empty().with_alias("slug", "[a-z-]+");
        let router = RouterBuilder::new(vec![Route::new("/posts/:slug(@slug)")])
            .with_aliases(aliases)
            .build()
            .unwrap();

        assert!(router.match_path("/posts/hello-world").unwrap().is_some());
        assert!(router.match_path("/posts/Hello").unwrap().is_none());
    }

    #[test]
    fn test_disabled_skippable_paths() {
        let router = RouterBuilder::new(vec![Route::new("/api/v1/users")])
            .with_config(RouterConfig::default().with_skippable_paths(false))
            .build()
            .unwrap();

        assert_eq!(router.stats().skippable_paths, 0);
        assert!(router.match_path("/api/v1/users").unwrap().is_some());
    }

    #[test]
    #[traced_test]
    fn test_seal_is_logged() {
        RouterBuilder::new(vec![Route::new("/health")]).build().unwrap();
        assert!(logs_contain("Route tree sealed: 1 routes"));
    }
}
