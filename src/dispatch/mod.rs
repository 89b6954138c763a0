//! Action dispatch
//!
//! Resolves textual action identifiers to handlers and executes the fixed
//! set of built-in session-toggle actions. Namespaced identifiers
//! (`component:handler:action`) go to the [`HandlerRegistry`]; everything
//! else is matched against the closed built-in set. Execution is gated on
//! the caller being at least `Remembered`; an unauthenticated caller gets a
//! `success: 0` outcome with no error, so action existence never leaks.

pub mod registry;

use std::sync::Arc;

use http::Response;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::Config;
use crate::core::context::RequestContext;
use crate::core::error::{GateError, GateResult};
use crate::core::traits::{AuthGate, AuthLevel, TemplateEngine};
use crate::search::SearchBus;
use registry::HandlerRegistry;

/// Built-in panel pin toggle
const ACTION_TOGGLE_PANEL: &str = "togglepanel";
/// Built-in list sort toggle
const ACTION_SET_ORDER_BY: &str = "setorderby";
/// Built-in global search
const ACTION_GLOBAL_SEARCH: &str = "globalsearch";

/// Result of an ajax dispatch, serialized as `{"success": 0|1, ...}`.
#[derive(Debug, Default, Serialize)]
pub struct AjaxOutcome {
    pub success: u8,

    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl AjaxOutcome {
    pub fn success() -> Self {
        Self {
            success: 1,
            extra: JsonMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.extra.insert(key.into(), value.into());
    }
}

/// Resolves action identifiers and runs the built-in session toggles.
pub struct ActionDispatcher {
    registry: Arc<HandlerRegistry>,
    auth: Arc<dyn AuthGate>,
    search: Arc<SearchBus>,
    templates: Arc<dyn TemplateEngine>,
    session_prefix: String,
    search_results_template: String,
}

impl ActionDispatcher {
    pub fn new(
        config: &Config,
        registry: Arc<HandlerRegistry>,
        auth: Arc<dyn AuthGate>,
        search: Arc<SearchBus>,
        templates: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            registry,
            auth,
            search,
            templates,
            session_prefix: config.session_prefix.clone(),
            search_results_template: config.templates.search_results.clone(),
        }
    }

    /// Execute an ajax action identified by `action`.
    ///
    /// An empty identifier falls back to the `ajaxAction` request parameter;
    /// if still empty, that is a malformed identifier. Unknown built-in
    /// actions are ignored and yield `success: 0` without error.
    pub async fn execute_ajax(
        &self,
        action: &str,
        ctx: &mut RequestContext,
    ) -> GateResult<AjaxOutcome> {
        let action = if action.is_empty() {
            ctx.param("ajaxAction").unwrap_or_default().to_string()
        } else {
            action.to_string()
        };
        if action.is_empty() {
            return Err(GateError::MalformedAction("empty action".to_string()));
        }

        let mut outcome = AjaxOutcome::default();

        if !self.auth.is_authenticated(ctx, AuthLevel::Remembered) {
            log::debug!("Unauthenticated caller, ignoring ajax action '{action}'");
            return Ok(outcome);
        }

        if action.contains(':') {
            return self.forward_namespaced(&action, ctx).await;
        }

        match action.as_str() {
            ACTION_TOGGLE_PANEL => self.toggle_panel(ctx, &mut outcome),
            ACTION_SET_ORDER_BY => self.set_order_by(ctx, &mut outcome),
            ACTION_GLOBAL_SEARCH => self.global_search(ctx, &mut outcome).await?,
            _ => {
                log::debug!("Ignoring unknown ajax action '{action}'");
            }
        }

        Ok(outcome)
    }

    /// Execute a page action by its registered name.
    ///
    /// Unknown actions are a lookup error; the gateway composes them into
    /// the access-denied response.
    pub async fn execute_page(
        &self,
        action: &str,
        object_id: &str,
        ctx: &mut RequestContext,
    ) -> GateResult<Response<Vec<u8>>> {
        let handler = self
            .registry
            .get_page(action)
            .ok_or_else(|| GateError::HandlerNotFound(format!("page action '{action}'")))?;
        handler.execute(object_id, ctx).await
    }

    async fn forward_namespaced(
        &self,
        action: &str,
        ctx: &mut RequestContext,
    ) -> GateResult<AjaxOutcome> {
        let parts: Vec<&str> = action.split(':').collect();
        if parts.len() != 3 {
            return Err(GateError::MalformedAction(format!(
                "'{action}' must be component:handler:action"
            )));
        }

        let handler = self.registry.get_ajax(parts[0], parts[1]).ok_or_else(|| {
            GateError::HandlerNotFound(format!("{}:{}", parts[0], parts[1]))
        })?;
        handler.handle(parts[2], ctx).await
    }

    fn toggle_panel(&self, ctx: &mut RequestContext, outcome: &mut AjaxOutcome) {
        let panel = ctx.param_or("panel", "left").to_string();
        let key = format!("{panel}-panel");
        let status = ctx.session().get_or(&key, "default");
        let new_status = if status == "unpinned" {
            "default"
        } else {
            "unpinned"
        };
        ctx.session().set(&key, new_status);
        outcome.success = 1;
    }

    fn set_order_by(&self, ctx: &mut RequestContext, outcome: &mut AjaxOutcome) {
        let name = ctx.param_or("name", "").to_string();
        let order_by = ctx.param_or("orderby", "").to_string();
        if name.is_empty() || order_by.is_empty() {
            return;
        }

        let dir_key = format!("{}.{name}.orderbydir", self.session_prefix);
        let dir = ctx.session().get_or(&dir_key, "ASC");
        let dir = if dir == "ASC" { "DESC" } else { "ASC" };
        ctx.session()
            .set(&format!("{}.{name}.orderby", self.session_prefix), &order_by);
        ctx.session().set(&dir_key, dir);
        outcome.success = 1;
    }

    async fn global_search(
        &self,
        ctx: &mut RequestContext,
        outcome: &mut AjaxOutcome,
    ) -> GateResult<()> {
        // Persist even an empty search string; it clears the stored one
        let query = ctx.param_or("searchstring", "").to_string();
        ctx.session()
            .set(&format!("{}.global_search", self.session_prefix), &query);

        let results = self.search.dispatch(&query).await;

        let mut params = JsonMap::new();
        params.insert("results".to_string(), serde_json::to_value(&results)?);
        let markup = self
            .templates
            .render(&self.search_results_template, &params)?;
        outcome.set("searchResults", markup);
        Ok(())
    }
}
