//! Core abstractions and interfaces for viewgate
//!
//! This module provides the foundational traits, types, and utilities
//! that form the backbone of the viewgate architecture.

pub mod container;
pub mod context;
pub mod error;
pub mod traits;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use container::Gateway;
pub use context::RequestContext;
pub use error::{ErrorContext, GateError, GateResult};
pub use traits::*;
