//! Static route tables loaded from YAML
//!
//! ```yaml
//! routes:
//!   - path: /
//!     name: home
//!     handler: HomeController@index
//!   - path: /users/:id(@int)
//!     name: users.show
//!     strict_check_trailing: false
//!   - path: /search
//!     name: search
//!     queries:
//!       q: true
//!       page: false
//! ```
//!
//! `queries` lists the allowed query keys (`true` marks a required one); when
//! it is omitted every query key is passed through by reverse routing.

use crate::collector::RouteCollector;
use crate::config::RouterConfig;
use crate::error::{RoutingError, RoutingResult};
use crate::route::{QueryPolicy, Route, RouteOption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One route of a static table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque handler reference handed through as the route payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_check_trailing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<BTreeMap<String, bool>>,
}

impl RouteEntry {
    fn into_route(self, config: &RouterConfig) -> Route<Option<String>> {
        let strict = self
            .strict_check_trailing
            .unwrap_or(config.default_strict_check_trailing);
        let queries = match self.queries {
            Some(keys) => QueryPolicy::AllowListed(keys),
            None => QueryPolicy::AllowAll,
        };
        let option = RouteOption::new()
            .strict_check_trailing(strict)
            .queries(queries);

        let route = Route::with_payload(self.path, self.handler).with_option(option);
        match self.name {
            Some(name) => route.with_name(name),
            None => route,
        }
    }
}

/// Ordered list of routes declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn from_yaml(source: &str) -> RoutingResult<Self> {
        serde_yaml::from_str(source)
            .map_err(|e| RoutingError::config(format!("Invalid route table: {}", e)))
    }

    pub fn to_yaml(&self) -> RoutingResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| RoutingError::config(format!("Cannot serialize route table: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Collect the table's routes in declaration order. Entries without an
    /// explicit `strict_check_trailing` use the configured default.
    pub fn into_collector(self, config: RouterConfig) -> RouteCollector<Option<String>> {
        let mut collector = RouteCollector::with_config(config.clone());
        for entry in self.routes {
            collector.add_route(entry.into_route(&config));
        }
        collector
    }
}
