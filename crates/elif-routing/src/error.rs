//! Routing error types
//!
//! Build-time errors abort tree construction, match-time contract violations
//! surface as `InvalidArgument`, and reverse routing errors are returned to the
//! caller. "No matching route" is never an error: it is `Ok(None)`.

use thiserror::Error;

/// Result type for routing operations
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Routing engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Route '{path}' conflicts with already registered route '{existing}'")]
    DuplicateRoute { path: String, existing: String },

    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter '{name}' value '{value}' does not match constraint '{constraint}'")]
    ParameterConstraintViolation {
        name: String,
        value: String,
        constraint: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl RoutingError {
    /// Create an invalid pattern error
    pub fn invalid_pattern<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        RoutingError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate route error
    pub fn duplicate_route<P: Into<String>, E: Into<String>>(path: P, existing: E) -> Self {
        RoutingError::DuplicateRoute {
            path: path.into(),
            existing: existing.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        RoutingError::InvalidArgument(message.into())
    }

    /// Create a configuration error
    pub fn config<T: Into<String>>(message: T) -> Self {
        RoutingError::Config {
            message: message.into(),
        }
    }

    /// Whether this error can only be raised while building a router
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            RoutingError::InvalidPattern { .. }
                | RoutingError::DuplicateRoute { .. }
                | RoutingError::DuplicateRouteName(_)
        )
    }

    /// Whether this error comes from reverse routing and can be fixed by
    /// retrying with corrected input
    pub fn is_reverse_error(&self) -> bool {
        matches!(
            self,
            RoutingError::RouteNotFound(_)
                | RoutingError::MissingParameter(_)
                | RoutingError::ParameterConstraintViolation { .. }
        )
    }
}
