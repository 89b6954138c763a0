//! Core traits for viewgate components
//!
//! This module defines the narrow capability contracts that decouple the
//! composition layer from the host application's routing, templating,
//! localization and authentication subsystems.

use std::collections::HashMap;

use async_trait::async_trait;
use http::Response;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{context::RequestContext, error::GateResult};
use crate::dispatch::AjaxOutcome;

/// Outcome of matching a path against the host's route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Canonical route name
    pub name: String,

    /// Object action captured from the path, when the route carries one.
    /// Action URLs share a route name, so the suffix differentiates them.
    pub action_suffix: Option<String>,
}

/// Trait for resolving request paths to canonical route names
pub trait RouteLookup: Send + Sync {
    /// Resolve a path to its route; errors when no route matches
    fn resolve(&self, path: &str) -> GateResult<ResolvedRoute>;
}

/// Trait for rendering registered templates into markup
pub trait TemplateEngine: Send + Sync {
    /// Render the template identified by `template_id` with the given parameters
    fn render(&self, template_id: &str, params: &JsonMap<String, JsonValue>) -> GateResult<String>;
}

/// Trait for resolving message keys through the host's localization catalogs
pub trait Localizer: Send + Sync {
    /// Translate `key` in `domain`, substituting `vars`. Unknown keys fall
    /// back to the key itself rather than failing.
    fn translate(&self, key: &str, vars: &HashMap<String, String>, domain: &str) -> String;
}

/// Authentication strength attached to a caller, ordered weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthLevel {
    Anonymous,
    Remembered,
    Full,
}

/// Trait for the authentication gate guarding action execution
pub trait AuthGate: Send + Sync {
    /// Whether the caller is authenticated at `min_level` or stronger
    fn is_authenticated(&self, ctx: &RequestContext, min_level: AuthLevel) -> bool;
}

/// Trait for ajax actions registered by other components.
///
/// The dispatcher forwards the unqualified action name together with the
/// full request context; the handler owns its own success semantics.
#[async_trait]
pub trait AjaxHandler: Send + Sync {
    async fn handle(&self, action: &str, ctx: &mut RequestContext) -> GateResult<AjaxOutcome>;
}

/// Trait for content handlers the composer forwards view rendering to
#[async_trait]
pub trait ContentHandler: Send + Sync {
    /// Produce the rendered content body for `target` with the given view
    /// parameters. Invoked synchronously in-process; it must complete before
    /// composition continues.
    async fn forward(
        &self,
        target: &str,
        params: &JsonMap<String, JsonValue>,
        ctx: &mut RequestContext,
    ) -> GateResult<String>;
}

/// Trait for page-level actions addressed by name in routes.
///
/// Registered explicitly and validated at registration time; there is no
/// reflective method lookup.
#[async_trait]
pub trait PageAction: Send + Sync {
    async fn execute(
        &self,
        object_id: &str,
        ctx: &mut RequestContext,
    ) -> GateResult<Response<Vec<u8>>>;
}

/// Trait for global search providers participating in the search fan-out
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Section name the provider's results are grouped under
    fn name(&self) -> &str;

    /// Run the search; failures are logged and skipped by the bus
    async fn search(&self, query: &str) -> GateResult<Vec<String>>;
}
