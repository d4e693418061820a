//! Property tests for the route tree
//!
//! - Skippable paths are only an index: matching with them must give the same
//!   route and parameters as plain per-segment descent, for any route set.
//! - Reverse routing round trips: a rendered path matches the route it was
//!   rendered from, with the same parameters.

use elif_routing::*;
use proptest::prelude::*;
use std::collections::HashMap;

/// `*` is an unconstrained parameter, `#` a numeric one and `~` a one-letter one
const PATTERN_COMPONENTS: &[&str] = &["a", "b", "c", "*", "#", "~"];

const REQUEST_COMPONENTS: &[&str] = &["a", "b", "c", "", "1", "42", "x"];

fn render_component(position: usize, component: &str) -> String {
    match component {
        "*" => format!(":p{}", position),
        "#" => format!(r":p{}(\d+)", position),
        "~" => format!(":p{}([a-c])", position),
        literal => literal.to_string(),
    }
}

fn route_pattern() -> impl Strategy<Value = (String, bool)> {
    (
        prop::collection::vec(prop::sample::select(PATTERN_COMPONENTS), 0..4),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(components, trailing, strict)| {
            let mut path: String = components
                .iter()
                .enumerate()
                .map(|(position, component)| format!("/{}", render_component(position, component)))
                .collect();
            if path.is_empty() || trailing {
                path.push('/');
            }
            (path, strict)
        })
}

fn request_path() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(REQUEST_COMPONENTS), 0..5).prop_map(|components| {
        if components.is_empty() {
            String::new()
        } else {
            format!("/{}", components.join("/"))
        }
    })
}

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn build(patterns: &[(String, bool)]) -> RoutingResult<Router<()>> {
    let routes = patterns
        .iter()
        .map(|(path, strict)| {
            Route::new(path.as_str())
                .with_option(RouteOption::new().strict_check_trailing(*strict))
        })
        .collect();
    RouterBuilder::new(routes).build()
}

fn outcome(
    result: RoutingResult<Option<MatchedRoute<'_, ()>>>,
) -> Option<(usize, HashMap<String, String>)> {
    result
        .ok()
        .flatten()
        .map(|matched| (matched.route_index(), matched.into_params()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_skippable_paths_match_plain_descent(
        patterns in prop::collection::vec(route_pattern(), 1..10),
        paths in prop::collection::vec(request_path(), 1..20),
    ) {
        // Conflicting route sets are rejected at build time; nothing to compare.
        let Ok(router) = build(&patterns) else {
            return Ok(());
        };

        for path in &paths {
            let with_shortcuts = outcome(router.match_path(path));
            let without_shortcuts = outcome(router.match_path_without_shortcuts(path));
            prop_assert_eq!(with_shortcuts, without_shortcuts, "path '{}'", path);
        }
    }

    #[test]
    fn prop_lenient_routes_ignore_trailing_slash(
        components in prop::collection::vec("[a-z]{1,6}", 1..5),
    ) {
        let path = format!("/{}", components.join("/"));
        let router = RouterBuilder::new(vec![
            Route::new(path.as_str()).with_option(RouteOption::new().strict_check_trailing(false)),
        ])
        .build()
        .unwrap();

        prop_assert!(router.match_path(&path).unwrap().is_some());
        let with_slash = format!("{}/", path);
        prop_assert!(router.match_path(&with_slash).unwrap().is_some());
    }

    #[test]
    fn prop_reverse_routing_round_trips(
        id in "0|[1-9][0-9]{0,5}",
        slug in "[A-Za-z0-9_.~-]{1,12}",
        tag in "[a-z]{1,8}",
        item in "[0-9]{1,4}",
        year in "[0-9]{4}",
        month in "[0-9]{2}",
    ) {
        let (router, reverse) = RouterBuilder::new(vec![
            Route::new("/users/:id(@int)").with_name("users.show"),
            Route::new("/users/:id(@int)/posts/:slug").with_name("users.post"),
            Route::new("/tags/:tag([a-z]+)/items/:item(\\d+)/").with_name("tags.item"),
            Route::new("/archive/:year(\\d{4})/:month(\\d{2})").with_name("archive"),
        ])
        .build_both()
        .unwrap();

        let cases = vec![
            ("users.show", values(&[("id", id.as_str())])),
            ("users.post", values(&[("id", id.as_str()), ("slug", slug.as_str())])),
            ("tags.item", values(&[("tag", tag.as_str()), ("item", item.as_str())])),
            ("archive", values(&[("year", year.as_str()), ("month", month.as_str())])),
        ];

        for (name, params) in cases {
            let path = reverse.make(name, &params, &HashMap::new()).unwrap();
            let matched = router.match_path(&path).unwrap();
            prop_assert!(matched.is_some(), "no match for '{}'", path);
            let matched = matched.unwrap();
            prop_assert_eq!(matched.route().name(), Some(name));
            prop_assert_eq!(matched.into_params(), params);
        }
    }
}
