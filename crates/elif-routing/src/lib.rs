//! # elif-routing
//!
//! Segment-tree route matching and reverse routing for the elif.rs framework.
//!
//! ## Features
//!
//! - **Segment tree**: routes sharing a prefix share nodes; matching walks one
//!   path component at a time with backtracking
//! - **Deterministic priority**: among overlapping patterns the route
//!   registered first wins
//! - **Skippable paths**: precomputed jumps over runs of literal segments
//! - **Trailing slash leniency**: opt-in per route
//! - **Reverse routing**: render paths and query strings from route names
//! - **Match caching**: optional key-value cache in front of the matcher
//!
//! ## Quick Start
//!
//! ```rust
//! use elif_routing::{Route, RouteOption, RouterBuilder};
//! use std::collections::HashMap;
//!
//! let routes = vec![
//!     Route::with_payload("/", "home").with_name("home"),
//!     Route::with_payload("/users/:id(@int)", "users.show").with_name("users.show"),
//!     Route::with_payload("/docs", "docs")
//!         .with_option(RouteOption::new().strict_check_trailing(false)),
//! ];
//!
//! let (router, reverse) = RouterBuilder::new(routes).build_both().unwrap();
//!
//! let matched = router.match_path("/users/42").unwrap().unwrap();
//! assert_eq!(*matched.route().payload(), "users.show");
//! assert_eq!(matched.param("id"), Some("42"));
//! assert!(router.match_path("/docs/").unwrap().is_some());
//! assert!(router.match_path("/nowhere/at/all").unwrap().is_none());
//!
//! let mut params = HashMap::new();
//! params.insert("id".to_string(), "7".to_string());
//! assert_eq!(
//!     reverse.make("users.show", &params, &HashMap::new()).unwrap(),
//!     "/users/7"
//! );
//! ```
//!
//! Method handling is left to the caller: keep one router per method, or
//! filter the matched route's payload.

pub mod builder;
pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod matcher;
pub mod node;
pub mod reverse;
pub mod route;
pub mod segment;
pub mod table;

pub use builder::RouterBuilder;
pub use cache::{cache_key, CachedResult, CachedRouter, MemoryRouteCache, RouteCache};
pub use collector::{combine_paths, GroupContext, RouteCollector};
pub use config::{RouterConfig, RouterDefaults};
pub use error::{RoutingError, RoutingResult};
pub use matcher::{MatchedRoute, Router, RouterStats};
pub use reverse::ReverseRouter;
pub use route::{QueryPolicy, Route, RouteOption};
pub use segment::{parse_pattern, split_path, Constraint, ConstraintAliases, Segment};
pub use table::{RouteEntry, RouteTable};
