//! Route definitions and per-route options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which query parameters reverse routing may render for a route
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPolicy {
    /// Every caller supplied key not consumed as a path parameter
    #[default]
    AllowAll,
    /// Only the listed keys; `true` marks a key as required
    AllowListed(BTreeMap<String, bool>),
}

impl QueryPolicy {
    pub fn is_allow_all(&self) -> bool {
        matches!(self, QueryPolicy::AllowAll)
    }
}

fn default_strict_check_trailing() -> bool {
    true
}

/// Matching and rendering options of a single route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOption {
    /// When false, the route also answers with the trailing slash added or removed
    #[serde(default = "default_strict_check_trailing")]
    pub strict_check_trailing: bool,
    #[serde(default)]
    pub queries: QueryPolicy,
}

impl Default for RouteOption {
    fn default() -> Self {
        Self {
            strict_check_trailing: default_strict_check_trailing(),
            queries: QueryPolicy::default(),
        }
    }
}

impl RouteOption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the end of the path is compared exactly (with or without slash)
    pub fn is_strict_check_trailing(&self) -> bool {
        self.strict_check_trailing
    }

    pub fn strict_check_trailing(mut self, strict: bool) -> Self {
        self.strict_check_trailing = strict;
        self
    }

    pub fn queries(mut self, queries: QueryPolicy) -> Self {
        self.queries = queries;
        self
    }

    /// Allow a query key, switching the policy to an allow list if needed
    pub fn allow_query<K: Into<String>>(mut self, key: K, required: bool) -> Self {
        match &mut self.queries {
            QueryPolicy::AllowListed(keys) => {
                keys.insert(key.into(), required);
            }
            QueryPolicy::AllowAll => {
                let mut keys = BTreeMap::new();
                keys.insert(key.into(), required);
                self.queries = QueryPolicy::AllowListed(keys);
            }
        }
        self
    }
}

/// A route definition: pattern, options, optional name and an opaque payload.
///
/// The payload is whatever the framework needs to dispatch (a handler id,
/// a controller reference, ...). The routing engine never inspects it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<T = ()> {
    path: String,
    name: Option<String>,
    option: RouteOption,
    payload: T,
}

impl Route<()> {
    pub fn new<P: Into<String>>(path: P) -> Self {
        Route::with_payload(path, ())
    }
}

impl<T> Route<T> {
    pub fn with_payload<P: Into<String>>(path: P, payload: T) -> Self {
        Self {
            path: path.into(),
            name: None,
            option: RouteOption::default(),
            payload,
        }
    }

    pub fn with_name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_option(mut self, option: RouteOption) -> Self {
        self.option = option;
        self
    }

    /// Replace the payload, possibly changing its type
    pub fn map_payload<U, F: FnOnce(T) -> U>(self, f: F) -> Route<U> {
        Route {
            path: self.path,
            name: self.name,
            option: self.option,
            payload: f(self.payload),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn option(&self) -> &RouteOption {
        &self.option
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}
