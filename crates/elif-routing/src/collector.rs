//! Route table construction helpers
//!
//! [`RouteCollector`] gathers routes in registration order and supports nested
//! groups. A group receives its own collector carrying a derived
//! [`GroupContext`]; the parent context is never modified, so leaving a group
//! needs no restore step.
//!
//! ```
//! use elif_routing::{GroupContext, RouteCollector, RouteOption};
//!
//! let mut routes = RouteCollector::new();
//! routes.add_named("home", "/", "home");
//! routes.group("/api", |api| {
//!     api.add_named("api.users", "/users/:id", "users.show");
//! });
//! routes.scope(
//!     GroupContext::new()
//!         .nest("/admin")
//!         .with_name_prefix("admin.")
//!         .with_option(RouteOption::new().strict_check_trailing(false)),
//!     |admin| {
//!         admin.add_named("dashboard", "/dashboard", "admin.dashboard");
//!     },
//! );
//!
//! let (router, reverse) = routes.into_builder().build_both().unwrap();
//! assert!(router.match_path("/admin/dashboard/").unwrap().is_some());
//! assert!(reverse.has_route("admin.dashboard"));
//! ```

use crate::builder::RouterBuilder;
use crate::config::RouterConfig;
use crate::route::{Route, RouteOption};

/// Prefix, name prefix and default options applied to routes of a group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupContext {
    prefix: String,
    name_prefix: String,
    option: RouteOption,
}

impl GroupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a nested group under `prefix`
    pub fn nest(&self, prefix: &str) -> Self {
        Self {
            prefix: combine_paths(&self.prefix, prefix),
            ..self.clone()
        }
    }

    /// Append to the name prefix
    pub fn with_name_prefix(mut self, name_prefix: &str) -> Self {
        self.name_prefix.push_str(name_prefix);
        self
    }

    /// Default options for routes added without explicit options
    pub fn with_option(mut self, option: RouteOption) -> Self {
        self.option = option;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn option(&self) -> &RouteOption {
        &self.option
    }

    fn apply<T>(&self, mut route: Route<T>) -> Route<T> {
        let path = combine_paths(&self.prefix, route.path());
        route.set_path(path);
        let name = route
            .name()
            .map(|name| format!("{}{}", self.name_prefix, name));
        route.set_name(name);
        route
    }
}

/// Ordered route collection feeding a [`RouterBuilder`]
#[derive(Debug)]
pub struct RouteCollector<T> {
    routes: Vec<Route<T>>,
    context: GroupContext,
    config: RouterConfig,
}

impl<T> RouteCollector<T> {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        let option = RouteOption::new().strict_check_trailing(config.default_strict_check_trailing);
        Self {
            routes: Vec::new(),
            context: GroupContext::new().with_option(option),
            config,
        }
    }

    pub fn context(&self) -> &GroupContext {
        &self.context
    }

    /// Add a route using the current group's default options
    pub fn add<P: AsRef<str>>(&mut self, path: P, payload: T) -> &mut Self {
        let route = Route::with_payload(path.as_ref(), payload).with_option(self.context.option.clone());
        self.add_route(route)
    }

    pub fn add_named<N: Into<String>, P: AsRef<str>>(
        &mut self,
        name: N,
        path: P,
        payload: T,
    ) -> &mut Self {
        let route = Route::with_payload(path.as_ref(), payload)
            .with_name(name)
            .with_option(self.context.option.clone());
        self.add_route(route)
    }

    /// Add a fully specified route; the group prefixes still apply but its
    /// own options are kept
    pub fn add_route(&mut self, route: Route<T>) -> &mut Self {
        let route = self.context.apply(route);
        self.routes.push(route);
        self
    }

    /// Collect routes registered by `f` under a path prefix
    pub fn group<F>(&mut self, prefix: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut RouteCollector<T>),
    {
        let context = self.context.nest(prefix);
        self.scope(context, f)
    }

    /// Collect routes registered by `f` under an explicit context.
    ///
    /// The context replaces the current one for the nested collector; build it
    /// from [`RouteCollector::context`] to inherit the outer prefix.
    pub fn scope<F>(&mut self, context: GroupContext, f: F) -> &mut Self
    where
        F: FnOnce(&mut RouteCollector<T>),
    {
        let mut nested = RouteCollector {
            routes: Vec::new(),
            context,
            config: self.config.clone(),
        };
        f(&mut nested);
        self.routes.append(&mut nested.routes);
        self
    }

    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_routes(self) -> Vec<Route<T>> {
        self.routes
    }

    /// Hand the collected routes over to a builder using the same configuration
    pub fn into_builder(self) -> RouterBuilder<T> {
        RouterBuilder::new(self.routes).with_config(self.config)
    }
}

impl<T> Default for RouteCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a group prefix and a route path.
///
/// The trailing slash of `path` is kept, so `/admin` + `/` is `/admin/`.
pub fn combine_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if prefix.is_empty() {
        format!("/{}", path)
    } else {
        format!("{}/{}", prefix, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_paths() {
        assert_eq!(combine_paths("", "/users"), "/users");
        assert_eq!(combine_paths("/api", "/users"), "/api/users");
        assert_eq!(combine_paths("/api/", "users/"), "/api/users/");
        assert_eq!(combine_paths("/admin", "/"), "/admin/");
        assert_eq!(combine_paths("/admin", ""), "/admin/");
        assert_eq!(combine_paths("", "/"), "/");
        assert_eq!(combine_paths("", ""), "/");
    }

    #[test]
    fn test_groups_nest_prefixes_and_names() {
        let mut routes = RouteCollector::new();
        routes.add("/", 0);
        routes.group("/api", |api| {
            api.add("/status", 1);
            api.scope(api.context().nest("/v1").with_name_prefix("v1."), |v1| {
                v1.add_named("users", "/users/:id", 2);
            });
            api.add("/after", 3);
        });
        routes.add("/tail", 4);

        let paths: Vec<_> = routes.routes().iter().map(|r| r.path()).collect();
        assert_eq!(
            paths,
            vec!["/", "/api/status", "/api/v1/users/:id", "/api/after", "/tail"]
        );
        assert_eq!(routes.routes()[2].name(), Some("v1.users"));
        assert_eq!(*routes.routes()[3].payload(), 3);
    }

    #[test]
    fn test_group_defaults_and_config() {
        let config = RouterConfig::default().with_strict_check_trailing(false);
        let mut routes = RouteCollector::with_config(config);
        routes.add("/lenient", ());
        routes.scope(
            routes
                .context()
                .clone()
                .with_option(RouteOption::new().strict_check_trailing(true)),
            |strict| {
                strict.add("/strict", ());
            },
        );
        routes.add_route(Route::new("/explicit"));

        let strict: Vec<_> = routes
            .routes()
            .iter()
            .map(|r| r.option().is_strict_check_trailing())
            .collect();
        assert_eq!(strict, vec![false, true, true]);
    }

    #[test]
    fn test_into_builder() {
        let mut routes = RouteCollector::new();
        routes.group("/users", |users| {
            users.add_named("users.index", "/", "index");
            users.add_named("users.show", "/:id(@int)", "show");
        });

        let (router, reverse) = routes.into_builder().build_both().unwrap();
        let matched = router.match_path("/users/12").unwrap().unwrap();
        assert_eq!(*matched.route().payload(), "show");
        assert!(router.match_path("/users/").unwrap().is_some());
        assert!(router.match_path("/users").unwrap().is_none());
        assert_eq!(reverse.len(), 2);
    }
}
