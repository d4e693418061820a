//! Reverse routing: rendering paths from route names
//!
//! Every named route keeps the segment sequence parsed at build time, so a
//! rendered path always lines up with what the forward matcher expects.

use crate::error::{RoutingError, RoutingResult};
use crate::route::{QueryPolicy, Route};
use crate::segment::Segment;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone)]
struct ReverseRoute {
    segments: Vec<Segment>,
    queries: QueryPolicy,
}

/// Renders paths for named routes
#[derive(Debug, Clone, Default)]
pub struct ReverseRouter {
    routes: HashMap<String, ReverseRoute>,
}

impl ReverseRouter {
    /// Keep the parsed segments of every named route. `parsed` is aligned
    /// with `routes`.
    pub(crate) fn from_parsed<T>(routes: &[Route<T>], parsed: Vec<Vec<Segment>>) -> Self {
        let routes = routes
            .iter()
            .zip(parsed)
            .filter_map(|(route, segments)| {
                route.name().map(|name| {
                    (
                        name.to_string(),
                        ReverseRoute {
                            segments,
                            queries: route.option().queries.clone(),
                        },
                    )
                })
            })
            .collect();

        Self { routes }
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Render the path (and query string) of a named route
    pub fn make(
        &self,
        name: &str,
        path_params: &HashMap<String, String>,
        query_params: &HashMap<String, String>,
    ) -> RoutingResult<String> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))?;

        let mut url = render_path(&route.segments, path_params)?;

        let query = select_query(route, query_params)?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&render_query(&query));
        }

        debug!("Generated '{}' for route '{}'", url, name);
        Ok(url)
    }

    /// Same as [`ReverseRouter::make`], appending `#fragment` when given
    pub fn make_with_fragment(
        &self,
        name: &str,
        path_params: &HashMap<String, String>,
        query_params: &HashMap<String, String>,
        fragment: Option<&str>,
    ) -> RoutingResult<String> {
        let mut url = self.make(name, path_params, query_params)?;
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(&urlencoding::encode(fragment));
        }
        Ok(url)
    }
}

fn render_path(segments: &[Segment], params: &HashMap<String, String>) -> RoutingResult<String> {
    let mut path = String::new();

    for segment in segments {
        path.push('/');
        match segment {
            Segment::Separator => {}
            Segment::Literal(text) => path.push_str(text),
            Segment::Named { name, constraint } => {
                let value = params
                    .get(name)
                    .ok_or_else(|| RoutingError::MissingParameter(name.clone()))?;

                match constraint {
                    Some(constraint) if !constraint.is_match(value) => {
                        return Err(RoutingError::ParameterConstraintViolation {
                            name: name.clone(),
                            value: value.clone(),
                            constraint: constraint.as_str().to_string(),
                        });
                    }
                    // An empty component would only ever reach a blank node
                    None if value.is_empty() => {
                        return Err(RoutingError::MissingParameter(name.clone()));
                    }
                    _ => {}
                }

                path.push_str(&urlencoding::encode(value));
            }
        }
    }

    Ok(path)
}

fn select_query<'q>(
    route: &ReverseRoute,
    params: &'q HashMap<String, String>,
) -> RoutingResult<BTreeMap<&'q str, &'q str>> {
    match &route.queries {
        QueryPolicy::AllowAll => Ok(params
            .iter()
            .filter(|(key, _)| {
                !route
                    .segments
                    .iter()
                    .any(|segment| segment.param_name() == Some(key.as_str()))
            })
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()),
        QueryPolicy::AllowListed(allowed) => {
            let mut query = BTreeMap::new();
            for (key, required) in allowed {
                match params.get_key_value(key) {
                    Some((key, value)) => {
                        query.insert(key.as_str(), value.as_str());
                    }
                    None if *required => {
                        return Err(RoutingError::MissingParameter(key.clone()));
                    }
                    None => {}
                }
            }
            Ok(query)
        }
    }
}

fn render_query(query: &BTreeMap<&str, &str>) -> String {
    query
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
