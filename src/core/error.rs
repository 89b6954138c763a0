//! Unified error handling for viewgate
//!
//! This module provides a centralized error type system that eliminates
//! the need for modules to depend on each other for error handling.

use std::fmt;

/// Unified error types for the view composition layer
#[derive(Debug)]
pub enum GateError {
    /// Configuration-related errors
    Configuration(String),

    /// Action identifier is empty or not of the `component:handler:action` form
    MalformedAction(String),

    /// No handler registered for the requested component/handler pair
    HandlerNotFound(String),

    /// Route lookup failures (non-fatal during breadcrumb resolution)
    RouteLookup(String),

    /// Template rendering failures
    Template(String),

    /// Session store failures
    Session(String),

    /// Serialization errors
    Serialization(String),

    /// Authentication/Authorization errors
    Unauthorized(String),

    /// Internal system errors
    Internal(String),
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            GateError::MalformedAction(msg) => write!(f, "Malformed action identifier: {msg}"),
            GateError::HandlerNotFound(msg) => write!(f, "Handler not found: {msg}"),
            GateError::RouteLookup(msg) => write!(f, "Route lookup failed: {msg}"),
            GateError::Template(msg) => write!(f, "Template rendering failed: {msg}"),
            GateError::Session(msg) => write!(f, "Session error: {msg}"),
            GateError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            GateError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            GateError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for GateError {}

// Error conversions
impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        GateError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for GateError {
    fn from(err: serde_yaml::Error) -> Self {
        GateError::Configuration(err.to_string())
    }
}

/// Result type alias for viewgate operations
pub type GateResult<T> = std::result::Result<T, GateError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn with_context(self, context: &str) -> GateResult<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn with_context(self, context: &str) -> GateResult<T> {
        self.map_err(|e| GateError::Internal(format!("{context}: {e}")))
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::GateError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::GateError::Configuration(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::core::error::GateError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::GateError::Internal(format!($fmt, $($arg)*))
    };
}
