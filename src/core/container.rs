//! Dependency wiring for the composition layer
//!
//! The gateway owns the capability set (router, templating, localization,
//! session store, auth gate) and the two working components built on top of
//! it, the action dispatcher and the response composer. Dependencies are
//! injected explicitly through the builder; there are no ambient globals.

use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};

use crate::auth::StaticAuthGate;
use crate::compose::{ActionIntent, ResponseComposer};
use crate::config::Config;
use crate::core::context::RequestContext;
use crate::core::traits::{AuthGate, Localizer, RouteLookup, TemplateEngine};
use crate::dispatch::{registry::HandlerRegistry, ActionDispatcher};
use crate::i18n::Catalog;
use crate::render::SimpleTemplates;
use crate::router::RouteTable;
use crate::search::SearchBus;
use crate::session::{MemorySessionStore, SessionHandle, SessionStore};
use crate::utils::response::ResponseBuilder;

/// Cookie carrying the caller's session id.
pub const SESSION_COOKIE: &str = "vg_session";

/// Builder assembling a [`Gateway`] from a config plus capability overrides.
pub struct GatewayBuilder {
    config: Config,
    router: Option<Arc<dyn RouteLookup>>,
    templates: Option<Arc<dyn TemplateEngine>>,
    localizer: Option<Arc<dyn Localizer>>,
    auth: Option<Arc<dyn AuthGate>>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl GatewayBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            router: None,
            templates: None,
            localizer: None,
            auth: None,
            sessions: None,
        }
    }

    pub fn router(mut self, router: Arc<dyn RouteLookup>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn templates(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthGate>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn build(self) -> Gateway {
        let config = Arc::new(self.config);
        let router = self
            .router
            .unwrap_or_else(|| Arc::new(RouteTable::new()));
        let templates = self
            .templates
            .unwrap_or_else(|| Arc::new(SimpleTemplates::new()));
        let localizer = self.localizer.unwrap_or_else(|| Arc::new(Catalog::new()));
        // Deny-by-default unless the host wires a real gate
        let auth = self
            .auth
            .unwrap_or_else(|| Arc::new(StaticAuthGate::denied()));
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));

        let registry = Arc::new(HandlerRegistry::new());
        let search = Arc::new(SearchBus::new());

        let dispatcher = ActionDispatcher::new(
            &config,
            registry.clone(),
            auth,
            search.clone(),
            templates.clone(),
        );
        let composer = ResponseComposer::new(
            config.clone(),
            router,
            templates,
            localizer,
            registry.clone(),
        );

        Gateway {
            sessions,
            registry,
            search,
            dispatcher,
            composer,
        }
    }
}

/// Entry points of the composition layer.
pub struct Gateway {
    sessions: Arc<dyn SessionStore>,
    registry: Arc<HandlerRegistry>,
    search: Arc<SearchBus>,
    dispatcher: ActionDispatcher,
    composer: ResponseComposer,
}

impl Gateway {
    pub fn builder(config: Config) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    /// Registry for ajax, content and page-action handlers
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Bus the global search fans out over
    pub fn search(&self) -> &SearchBus {
        &self.search
    }

    pub fn composer(&self) -> &ResponseComposer {
        &self.composer
    }

    /// Build a request context, binding the caller's session.
    ///
    /// The session id comes from the session cookie; absent or unknown
    /// callers get a fresh session. The store itself does not expire
    /// entries, so hosts must evict abandoned sessions via
    /// [`crate::session::SessionStore::remove`].
    pub fn context(&self, req: &Request<Bytes>) -> RequestContext {
        let sid = crate::utils::request::get_cookie_value(req.headers(), SESSION_COOKIE)
            .map(str::to_string)
            .unwrap_or_else(|| self.sessions.create());
        RequestContext::new(req, SessionHandle::new(self.sessions.clone(), sid))
    }

    /// Redirect or ajax-compose the result of an action.
    pub async fn post_action(
        &self,
        intent: &ActionIntent,
        ctx: &mut RequestContext,
    ) -> Response<Vec<u8>> {
        self.composer.compose_or_deny(intent, ctx).await
    }

    /// Execute an ajax action and serialize its outcome.
    ///
    /// Dispatch errors (malformed identifiers, unregistered handlers) are
    /// logged and composed into the access-denied response so the caller
    /// always receives a well-formed body.
    pub async fn execute_ajax(&self, action: &str, ctx: &mut RequestContext) -> Response<Vec<u8>> {
        match self.dispatcher.execute_ajax(action, ctx).await {
            Ok(outcome) => ResponseBuilder::json(&outcome),
            Err(e) => {
                log::warn!("Ajax dispatch failed for '{action}': {e}");
                self.composer.access_denied(ctx).await
            }
        }
    }

    /// Execute a registered page action; unknown actions compose the
    /// access-denied response.
    pub async fn execute_page_action(
        &self,
        action: &str,
        object_id: &str,
        ctx: &mut RequestContext,
    ) -> Response<Vec<u8>> {
        match self.dispatcher.execute_page(action, object_id, ctx).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Page action '{action}' unavailable: {e}");
                self.composer.access_denied(ctx).await
            }
        }
    }

    /// Compose the access-denied response directly.
    pub async fn access_denied(&self, ctx: &mut RequestContext) -> Response<Vec<u8>> {
        self.composer.access_denied(ctx).await
    }

    /// 301 redirect trimming trailing slashes from the request path.
    pub fn remove_trailing_slash(&self, ctx: &RequestContext) -> Response<Vec<u8>> {
        self.composer.remove_trailing_slash(ctx)
    }
}
