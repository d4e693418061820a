//! Route pattern segment parsing
//!
//! A pattern such as `/users/:id(\d+)/` is split after its leading slash into
//! `/`-delimited components and every component becomes exactly one
//! [`Segment`]. The segment at index `i` therefore lines up with component `i`
//! of a request path split by [`split_path`].
//!
//! ## Pattern syntax
//! - `users` - literal text, compared exactly
//! - `:id` - named parameter matching any non-empty component
//! - `:id(\d+)` - named parameter whose component must fully match the regex
//! - `:id(@int)` - named parameter using a regex registered in [`ConstraintAliases`]
//! - an empty trailing component (`/users/`) is a [`Segment::Separator`]

use crate::error::{RoutingError, RoutingResult};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Compiled regular expression gating a named segment
#[derive(Debug, Clone)]
pub struct Constraint {
    source: String,
    regex: Regex,
}

impl Constraint {
    /// Compile a constraint. The expression is anchored on both ends.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The regex text as written in the pattern (aliases already resolved)
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether a value fully matches this constraint
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Named capture groups of a matching value.
    ///
    /// Matching never transforms a captured parameter; callers that want typed
    /// values can convert these groups themselves.
    pub fn captures(&self, value: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(value)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Constraint {}

/// One component of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Empty component; the trailing slash of `/users/` or the whole of `/`
    Separator,
    /// Static text that must equal the request component
    Literal(String),
    /// Parameter binding the request component to `name`
    Named {
        name: String,
        constraint: Option<Constraint>,
    },
}

impl Segment {
    /// Parameter name for named segments
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Segment::Separator)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Separator => Ok(()),
            Segment::Literal(text) => write!(f, "{}", text),
            Segment::Named {
                name,
                constraint: None,
            } => write!(f, ":{}", name),
            Segment::Named {
                name,
                constraint: Some(constraint),
            } => write!(f, ":{}({})", name, constraint.as_str()),
        }
    }
}

/// Registry of short names for frequently used constraint regexes.
///
/// Passed by value into the router builder; there is no process-wide registry.
#[derive(Debug, Clone)]
pub struct ConstraintAliases {
    aliases: HashMap<String, String>,
}

impl ConstraintAliases {
    /// Registry without any alias
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Add or replace an alias
    pub fn with_alias<N: Into<String>, R: Into<String>>(mut self, name: N, regex: R) -> Self {
        self.insert(name, regex);
        self
    }

    pub fn insert<N: Into<String>, R: Into<String>>(&mut self, name: N, regex: R) {
        self.aliases.insert(name.into(), regex.into());
    }

    /// Regex text registered for an alias
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for ConstraintAliases {
    fn default() -> Self {
        let integer = "0|[1-9][0-9]*";
        Self::empty()
            .with_alias("d", integer)
            .with_alias("digit", integer)
            .with_alias("int", integer)
            .with_alias("num", "[1-9][0-9]*")
            .with_alias("hex", "0[xX][0-9a-fA-F]+")
            .with_alias(
                "float",
                r"[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?",
            )
            .with_alias("bool", "(?i:true|false|on|off|yes|no|1|0)")
    }
}

/// Split a request path into its components.
///
/// `"/"` yields `[""]` and `"/abc/"` yields `["abc", ""]`. The empty path yields
/// no component at all.
pub fn split_path(path: &str) -> Vec<&str> {
    match path.strip_prefix('/') {
        Some(rest) => rest.split('/').collect(),
        None if path.is_empty() => Vec::new(),
        None => path.split('/').collect(),
    }
}

/// Parse a route pattern into its segment sequence
pub fn parse_pattern(pattern: &str, aliases: &ConstraintAliases) -> RoutingResult<Vec<Segment>> {
    validate_pattern(pattern)?;

    let mut seen_params = HashSet::new();
    split_path(pattern)
        .into_iter()
        .map(|component| parse_component(pattern, component, aliases, &mut seen_params))
        .collect()
}

/// Render a segment sequence back into a pattern string
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment))
        .collect()
}

fn validate_pattern(pattern: &str) -> RoutingResult<()> {
    if pattern.is_empty() {
        return Err(RoutingError::invalid_pattern(pattern, "the path must not be empty"));
    }

    if pattern.trim() != pattern {
        return Err(RoutingError::invalid_pattern(
            pattern,
            "the path must not start or end with whitespace",
        ));
    }

    if !pattern.starts_with('/') {
        return Err(RoutingError::invalid_pattern(
            pattern,
            "the path must start with a slash",
        ));
    }

    if pattern.contains("//") {
        return Err(RoutingError::invalid_pattern(
            pattern,
            "the path must not contain consecutive slashes",
        ));
    }

    if !pattern.is_ascii() {
        return Err(RoutingError::invalid_pattern(
            pattern,
            "the path must not contain multibyte characters",
        ));
    }

    Ok(())
}

fn parse_component(
    pattern: &str,
    component: &str,
    aliases: &ConstraintAliases,
    seen_params: &mut HashSet<String>,
) -> RoutingResult<Segment> {
    if component.is_empty() {
        return Ok(Segment::Separator);
    }

    let Some(definition) = component.strip_prefix(':') else {
        return Ok(Segment::Literal(component.to_string()));
    };

    let (name, constraint_source) = match definition.find('(') {
        Some(open) => {
            let inner = definition[open + 1..].strip_suffix(')').ok_or_else(|| {
                RoutingError::invalid_pattern(
                    pattern,
                    format!("unterminated constraint in '{}'", component),
                )
            })?;
            (&definition[..open], Some(inner))
        }
        None => (definition, None),
    };

    if !is_valid_param_name(name) {
        return Err(RoutingError::invalid_pattern(
            pattern,
            format!("invalid parameter name '{}'", name),
        ));
    }

    if !seen_params.insert(name.to_string()) {
        return Err(RoutingError::invalid_pattern(
            pattern,
            format!("duplicate parameter name '{}'", name),
        ));
    }

    let constraint = constraint_source
        .map(|source| compile_constraint(pattern, source, aliases))
        .transpose()?;

    Ok(Segment::Named {
        name: name.to_string(),
        constraint,
    })
}

fn compile_constraint(
    pattern: &str,
    source: &str,
    aliases: &ConstraintAliases,
) -> RoutingResult<Constraint> {
    if source.is_empty() {
        return Err(RoutingError::invalid_pattern(pattern, "empty constraint"));
    }

    let source = match source.strip_prefix('@') {
        Some(alias) => aliases.resolve(alias).ok_or_else(|| {
            RoutingError::invalid_pattern(pattern, format!("unknown constraint alias '{}'", alias))
        })?,
        None => source,
    };

    Constraint::new(source).map_err(|e| {
        RoutingError::invalid_pattern(pattern, format!("invalid regex '{}': {}", source, e))
    })
}

fn is_valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
