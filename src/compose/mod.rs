//! Response composition
//!
//! Turns an [`ActionIntent`] into exactly one of a full-page redirect or a
//! structured ajax response, decided solely by the request's asynchronous
//! marker. Flash messages are translated and queued before the branch, so
//! the redirect path leaves them for the next full render while the ajax
//! path consumes them into the rendered flash markup.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Response, StatusCode};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::Config;
use crate::core::context::RequestContext;
use crate::core::error::{GateError, GateResult};
use crate::core::traits::{Localizer, RouteLookup, TemplateEngine};
use crate::dispatch::registry::HandlerRegistry;
use crate::session::FlashKind;
use crate::utils::response::ResponseBuilder;

/// Marker carrying the overridden breadcrumb URI to downstream renderers.
pub const OVERRIDE_ROUTE_URI: &str = "overrideRouteUri";
/// Marker carrying the resolved canonical route name.
pub const OVERRIDE_ROUTE_NAME: &str = "overrideRouteName";
/// Marker telling a forwarded content handler to render full content
/// instead of re-entering ajax composition.
pub const IGNORE_AJAX: &str = "ignoreAjax";

/// Localization domain flash message keys are resolved in.
const FLASH_DOMAIN: &str = "flashes";

/// A flash message request: a kind plus a message key resolved through the
/// localizer at composition time.
#[derive(Debug, Clone)]
pub struct FlashSpec {
    pub kind: FlashKind,
    pub message_key: String,
    pub message_vars: HashMap<String, String>,
}

impl FlashSpec {
    pub fn new(kind: FlashKind, message_key: impl Into<String>) -> Self {
        Self {
            kind,
            message_key: message_key.into(),
            message_vars: HashMap::new(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.message_vars.insert(name.into(), value.into());
        self
    }
}

/// The logical result of an action, built by a caller and immutable once
/// handed to the composer.
#[derive(Debug, Clone)]
pub struct ActionIntent {
    /// Redirect target for ordinary requests; empty means the configured
    /// default route.
    pub return_url: String,

    /// Parameters handed to content and chrome rendering
    pub view_parameters: JsonMap<String, JsonValue>,

    /// View target: a content handler id, or a template id when
    /// `forward_to_handler` is false. Empty derives
    /// `{component}:default:index` from the request.
    pub content_template: String,

    /// Caller-supplied pairs echoed unchanged into the ajax body
    pub passthrough_vars: JsonMap<String, JsonValue>,

    pub flashes: Vec<FlashSpec>,

    /// Whether content comes from a registered handler rather than a
    /// direct template render
    pub forward_to_handler: bool,
}

impl Default for ActionIntent {
    fn default() -> Self {
        Self {
            return_url: String::new(),
            view_parameters: JsonMap::new(),
            content_template: String::new(),
            passthrough_vars: JsonMap::new(),
            flashes: Vec::new(),
            forward_to_handler: true,
        }
    }
}

impl ActionIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = url.into();
        self
    }

    pub fn content_template(mut self, template: impl Into<String>) -> Self {
        self.content_template = template.into();
        self
    }

    pub fn view_parameter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.view_parameters.insert(key.into(), value.into());
        self
    }

    pub fn passthrough(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.passthrough_vars.insert(key.into(), value.into());
        self
    }

    pub fn flash(mut self, flash: FlashSpec) -> Self {
        self.flashes.push(flash);
        self
    }

    pub fn forward_to_handler(mut self, forward: bool) -> Self {
        self.forward_to_handler = forward;
        self
    }
}

/// Decides between redirect and ajax responses for a composed intent.
pub struct ResponseComposer {
    config: Arc<Config>,
    router: Arc<dyn RouteLookup>,
    templates: Arc<dyn TemplateEngine>,
    localizer: Arc<dyn Localizer>,
    registry: Arc<HandlerRegistry>,
}

impl ResponseComposer {
    pub fn new(
        config: Arc<Config>,
        router: Arc<dyn RouteLookup>,
        templates: Arc<dyn TemplateEngine>,
        localizer: Arc<dyn Localizer>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            config,
            router,
            templates,
            localizer,
            registry,
        }
    }

    /// Compose the response for a post-action intent.
    ///
    /// Exactly one of {redirect, ajax body} is produced, decided solely by
    /// the context's asynchronous marker.
    pub async fn compose(
        &self,
        intent: &ActionIntent,
        ctx: &mut RequestContext,
    ) -> GateResult<Response<Vec<u8>>> {
        for flash in &intent.flashes {
            let message =
                self.localizer
                    .translate(&flash.message_key, &flash.message_vars, FLASH_DOMAIN);
            ctx.session().add_flash(flash.kind, message);
        }

        if !ctx.is_asynchronous() {
            let url = if intent.return_url.is_empty() {
                self.config.default_route.as_str()
            } else {
                intent.return_url.as_str()
            };
            // Flashes stay queued for the next full page render
            return Ok(ResponseBuilder::redirect(url, StatusCode::FOUND));
        }

        self.ajax(intent, ctx).await
    }

    /// Compose, degrading any failure into the access-denied response.
    pub async fn compose_or_deny(
        &self,
        intent: &ActionIntent,
        ctx: &mut RequestContext,
    ) -> Response<Vec<u8>> {
        match self.compose(intent, ctx).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Composition failed, responding with access denied: {e}");
                self.access_denied(ctx).await
            }
        }
    }

    /// The canned access-denied intent: default route plus one error flash.
    pub fn access_denied_intent(&self) -> ActionIntent {
        ActionIntent::new()
            .return_url(&self.config.default_route)
            .content_template(&self.config.templates.content_default)
            .passthrough(
                "activeLink",
                format!("#{}", self.config.default_route_name),
            )
            .passthrough("route", self.config.default_route.clone())
            .flash(FlashSpec::new(FlashKind::Error, "core.error.accessdenied"))
            .forward_to_handler(false)
    }

    /// Compose the access-denied response.
    ///
    /// Denial shares the ordinary composition path; if even that fails the
    /// caller still receives a well-formed plain 500.
    pub async fn access_denied(&self, ctx: &mut RequestContext) -> Response<Vec<u8>> {
        let intent = self.access_denied_intent();
        match self.compose(&intent, ctx).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Access-denied composition failed: {e}");
                ResponseBuilder::error_http(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                )
            }
        }
    }

    /// Redirect URLs with trailing slashes in order to prevent 404s.
    pub fn remove_trailing_slash(&self, ctx: &RequestContext) -> Response<Vec<u8>> {
        let path = ctx.path();
        let mut trimmed = path.trim_end_matches([' ', '/']);
        if trimmed.is_empty() {
            // the root path must stay "/" rather than an empty Location
            trimmed = "/";
        }
        let url = ctx.request_uri().replacen(path, trimmed, 1);
        ResponseBuilder::redirect(&url, StatusCode::MOVED_PERMANENTLY)
    }

    async fn ajax(
        &self,
        intent: &ActionIntent,
        ctx: &mut RequestContext,
    ) -> GateResult<Response<Vec<u8>>> {
        if let Some(JsonValue::String(route)) = intent.passthrough_vars.get("route") {
            self.override_breadcrumb_route(route, ctx);
        }

        let target = if intent.content_template.is_empty() {
            // Default view target derived from the requesting component
            format!("{}:default:index", ctx.param_or("component", ""))
        } else {
            intent.content_template.clone()
        };

        let new_content = if intent.forward_to_handler {
            let handler = self
                .registry
                .get_content(&target)
                .ok_or_else(|| GateError::HandlerNotFound(format!("content handler '{target}'")))?;
            // The forwarded handler must see full content, not re-enter the
            // ajax path
            ctx.set_var(IGNORE_AJAX, "true");
            let body = handler.forward(&target, &intent.view_parameters, ctx).await;
            ctx.remove_var(IGNORE_AJAX);
            body?
        } else {
            self.templates.render(&target, &intent.view_parameters)?
        };

        let mut chrome_params = intent.view_parameters.clone();
        if let Some(uri) = ctx.var(OVERRIDE_ROUTE_URI) {
            chrome_params.insert(OVERRIDE_ROUTE_URI.to_string(), uri.into());
        }
        if let Some(name) = ctx.var(OVERRIDE_ROUTE_NAME) {
            chrome_params.insert(OVERRIDE_ROUTE_NAME.to_string(), name.into());
        }
        // Flash queue is consumed here, exactly once
        let flashes = ctx.session().take_flashes();
        chrome_params.insert("flashes".to_string(), serde_json::to_value(&flashes)?);

        let breadcrumbs = self
            .templates
            .render(&self.config.templates.breadcrumbs, &chrome_params)?;
        let flashes_markup = self
            .templates
            .render(&self.config.templates.flashes, &chrome_params)?;

        let mut data = JsonMap::new();
        data.insert("newContent".to_string(), new_content.into());
        data.insert("breadcrumbs".to_string(), breadcrumbs.into());
        data.insert("flashes".to_string(), flashes_markup.into());
        // Passthrough keys win over the three fixed fields
        for (key, value) in &intent.passthrough_vars {
            data.insert(key.clone(), value.clone());
        }

        Ok(ResponseBuilder::json(&JsonValue::Object(data)))
    }

    /// Point the breadcrumb markers at the overridden route.
    ///
    /// Lookup failure degrades the breadcrumbs only; it is logged for
    /// diagnosis but never fails the composition.
    fn override_breadcrumb_route(&self, route: &str, ctx: &mut RequestContext) {
        ctx.set_var(OVERRIDE_ROUTE_URI, route);

        let path = route.strip_prefix(ctx.base_url()).unwrap_or(route);
        match self.router.resolve(path) {
            Ok(resolved) => {
                let name = match resolved.action_suffix {
                    Some(suffix) => format!("{}|{suffix}", resolved.name),
                    None => resolved.name,
                };
                ctx.set_var(OVERRIDE_ROUTE_NAME, name);
            }
            Err(e) => {
                log::debug!("Breadcrumb route override failed for '{route}': {e}");
            }
        }
    }
}
