//! Integration tests for the composition layer
//!
//! These exercise the gateway end to end: intent composition on both the
//! redirect and ajax paths, breadcrumb route overrides, handler forwarding
//! and the access-denied degradation.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Request, StatusCode};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::auth::StaticAuthGate;
use crate::compose::{ActionIntent, FlashSpec, IGNORE_AJAX};
use crate::config::Config;
use crate::core::container::Gateway;
use crate::core::context::{RequestContext, XHR_HEADER, XHR_MARKER};
use crate::core::error::GateResult;
use crate::core::traits::{AuthLevel, ContentHandler, PageAction, SearchProvider};
use crate::i18n::Catalog;
use crate::render::SimpleTemplates;
use crate::router::RouteTable;
use crate::session::FlashKind;
use crate::utils::response::ResponseBuilder;

struct LeadIndexHandler;

#[async_trait]
impl ContentHandler for LeadIndexHandler {
    async fn forward(
        &self,
        target: &str,
        params: &JsonMap<String, JsonValue>,
        ctx: &mut RequestContext,
    ) -> GateResult<String> {
        assert_eq!(ctx.var(IGNORE_AJAX), Some("true"));
        let title = params
            .get("title")
            .and_then(JsonValue::as_str)
            .unwrap_or("untitled");
        Ok(format!("[{target}] {title}"))
    }
}

struct ViewLeadAction;

#[async_trait]
impl PageAction for ViewLeadAction {
    async fn execute(
        &self,
        object_id: &str,
        _ctx: &mut RequestContext,
    ) -> GateResult<http::Response<Vec<u8>>> {
        Ok(ResponseBuilder::json(
            &serde_json::json!({"lead": object_id}),
        ))
    }
}

struct LeadSearch;

#[async_trait]
impl SearchProvider for LeadSearch {
    fn name(&self) -> &str {
        "leads"
    }

    async fn search(&self, query: &str) -> GateResult<Vec<String>> {
        Ok(vec![format!("lead matching '{query}'")])
    }
}

fn gateway(auth_level: AuthLevel) -> Gateway {
    let config = Config {
        default_route: "/console".to_string(),
        ..Config::default()
    };

    let mut routes = RouteTable::new();
    routes.insert("/console", "console_index").unwrap();
    routes
        .insert("/console/leads/{objectAction}/{objectId}", "console_lead_action")
        .unwrap();

    let templates = SimpleTemplates::new();
    templates.register("core:default:index", "index page");
    templates.register("core:default:breadcrumbs", "<ol>{{ overrideRouteName }}</ol>");
    templates.register("core:default:flashes", "<div>{{ flashes }}</div>");
    templates.register("core:default:globalsearchresults", "<ul>{{ results }}</ul>");
    templates.register("lead:default:list", "lead list {{ page }}");

    let catalog = Catalog::new();
    catalog.add("flashes", "core.error.accessdenied", "Access denied");
    catalog.add("flashes", "core.notice.saved", "%name% has been saved");

    let gateway = Gateway::builder(config)
        .router(Arc::new(routes))
        .templates(Arc::new(templates))
        .localizer(Arc::new(catalog))
        .auth(Arc::new(StaticAuthGate::new(auth_level)))
        .build();

    gateway
        .registry()
        .register_content("lead:default:index", Arc::new(LeadIndexHandler))
        .unwrap();
    gateway
        .registry()
        .register_page("view", Arc::new(ViewLeadAction))
        .unwrap();
    gateway.search().register(Arc::new(LeadSearch));

    gateway
}

fn plain_request(uri: &str) -> Request<Bytes> {
    Request::builder().uri(uri).body(Bytes::new()).unwrap()
}

fn xhr_request(uri: &str) -> Request<Bytes> {
    Request::builder()
        .uri(uri)
        .header(XHR_HEADER, XHR_MARKER)
        .body(Bytes::new())
        .unwrap()
}

fn body_json(response: &http::Response<Vec<u8>>) -> JsonValue {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn test_non_async_intent_redirects_and_queues_flashes() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&plain_request("/console/leads"));

    let intent = ActionIntent::new()
        .return_url("/dashboard")
        .flash(FlashSpec::new(FlashKind::Error, "core.error.accessdenied"))
        .flash(FlashSpec::new(FlashKind::Success, "core.notice.saved").with_var("name", "Lead A"));

    let response = gateway.post_action(&intent, &mut ctx).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );

    // exactly len(flashes) entries queued, translated, still unconsumed
    assert_eq!(ctx.session().flash_count(), 2);
    let flashes = ctx.session().take_flashes();
    assert_eq!(flashes[0].message, "Access denied");
    assert_eq!(flashes[1].message, "Lead A has been saved");
}

#[tokio::test]
async fn test_empty_return_url_redirects_to_default_route() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&plain_request("/console/leads"));

    let response = gateway.post_action(&ActionIntent::new(), &mut ctx).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/console");
}

#[tokio::test]
async fn test_async_intent_composes_ajax_body() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&xhr_request("/console/leads"));

    let intent = ActionIntent::new()
        .content_template("lead:default:index")
        .view_parameter("title", "Leads")
        .passthrough("activeLink", "#console_leads")
        .passthrough("route", "/console/leads/edit/7")
        .flash(FlashSpec::new(FlashKind::Success, "core.notice.saved").with_var("name", "Lead A"));

    let response = gateway.post_action(&intent, &mut ctx).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(&response);
    // forwarded content handler produced the body
    assert_eq!(body["newContent"], "[lead:default:index] Leads");
    // breadcrumb override resolved through the route table, suffixed with
    // the object action
    assert_eq!(body["breadcrumbs"], "<ol>console_lead_action|edit</ol>");
    // flash markup consumed the queue
    assert!(body["flashes"]
        .as_str()
        .unwrap()
        .contains("Lead A has been saved"));
    // passthrough keys echoed unmodified
    assert_eq!(body["activeLink"], "#console_leads");
    assert_eq!(body["route"], "/console/leads/edit/7");

    assert_eq!(ctx.session().flash_count(), 0);
    assert_eq!(ctx.var("overrideRouteUri"), Some("/console/leads/edit/7"));

    let content_length: usize = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(content_length, response.body().len());
}

#[tokio::test]
async fn test_passthrough_wins_over_fixed_fields() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&xhr_request("/console/leads"));

    let intent = ActionIntent::new()
        .content_template("lead:default:list")
        .forward_to_handler(false)
        .passthrough("newContent", "caller supplied");

    let response = gateway.post_action(&intent, &mut ctx).await;
    let body = body_json(&response);
    assert_eq!(body["newContent"], "caller supplied");
}

#[tokio::test]
async fn test_unresolvable_override_route_degrades_breadcrumbs() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&xhr_request("/console/leads"));

    let intent = ActionIntent::new()
        .content_template("lead:default:list")
        .forward_to_handler(false)
        .passthrough("route", "/not/in/the/table");

    let response = gateway.post_action(&intent, &mut ctx).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(&response);
    // the URI marker is still set, the name marker is absent
    assert_eq!(ctx.var("overrideRouteUri"), Some("/not/in/the/table"));
    assert!(ctx.var("overrideRouteName").is_none());
    assert_eq!(body["breadcrumbs"], "<ol></ol>");
}

#[tokio::test]
async fn test_direct_template_render_when_not_forwarding() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&xhr_request("/console/leads"));

    let intent = ActionIntent::new()
        .content_template("lead:default:list")
        .forward_to_handler(false)
        .view_parameter("page", 2);

    let response = gateway.post_action(&intent, &mut ctx).await;
    let body = body_json(&response);
    assert_eq!(body["newContent"], "lead list 2");
}

#[tokio::test]
async fn test_missing_content_handler_composes_access_denied() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&xhr_request("/console/leads"));

    let intent = ActionIntent::new().content_template("lead:unregistered:index");
    let response = gateway.post_action(&intent, &mut ctx).await;

    // still a well-formed ajax body, carrying the denial flash
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(&response);
    assert_eq!(body["newContent"], "index page");
    assert!(body["flashes"].as_str().unwrap().contains("Access denied"));
    assert_eq!(body["activeLink"], "#console_index");
}

#[tokio::test]
async fn test_unregistered_ajax_handler_composes_access_denied() {
    let gateway = gateway(AuthLevel::Full);
    let mut ctx = gateway.context(&xhr_request("/console/ajax"));

    let response = gateway
        .execute_ajax("lead:segment:executeAjax", &mut ctx)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(&response);
    assert!(body.get("success").is_none());
    assert!(body["flashes"].as_str().unwrap().contains("Access denied"));
}

#[tokio::test]
async fn test_builtin_ajax_roundtrip_through_gateway() {
    let gateway = gateway(AuthLevel::Remembered);
    let req = Request::builder()
        .method(http::Method::POST)
        .uri("/console/ajax")
        .header("content-type", "application/x-www-form-urlencoded")
        .header(XHR_HEADER, XHR_MARKER)
        .body(Bytes::from_static(b"searchstring=lead"))
        .unwrap();
    let mut ctx = gateway.context(&req);

    let response = gateway.execute_ajax("globalsearch", &mut ctx).await;
    let body = body_json(&response);
    assert_eq!(body["success"], 0);
    assert!(body["searchResults"]
        .as_str()
        .unwrap()
        .contains("lead matching 'lead'"));
    assert_eq!(
        ctx.session().get("console.global_search").as_deref(),
        Some("lead")
    );
}

#[tokio::test]
async fn test_page_action_dispatch() {
    let gateway = gateway(AuthLevel::Full);

    let mut ctx = gateway.context(&plain_request("/console/leads/view/42"));
    let response = gateway.execute_page_action("view", "42", &mut ctx).await;
    assert_eq!(body_json(&response)["lead"], "42");

    // unknown page actions share the denial path
    let mut ctx = gateway.context(&plain_request("/console/leads/purge/42"));
    let response = gateway.execute_page_action("purge", "42", &mut ctx).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/console");
    assert_eq!(ctx.session().flash_count(), 1);
}

#[tokio::test]
async fn test_remove_trailing_slash() {
    let gateway = gateway(AuthLevel::Full);
    let ctx = gateway.context(&plain_request("/console/leads/?page=3"));

    let response = gateway.remove_trailing_slash(&ctx);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/console/leads?page=3"
    );
}

#[tokio::test]
async fn test_remove_trailing_slash_keeps_root() {
    let gateway = gateway(AuthLevel::Full);

    let ctx = gateway.context(&plain_request("/"));
    let response = gateway.remove_trailing_slash(&ctx);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let ctx = gateway.context(&plain_request("///"));
    let response = gateway.remove_trailing_slash(&ctx);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_session_continuity_via_cookie() {
    let gateway = gateway(AuthLevel::Full);

    let ctx = gateway.context(&plain_request("/console"));
    ctx.session().set("left-panel", "unpinned");
    let sid = ctx.session().id().to_string();

    let req = Request::builder()
        .uri("/console")
        .header(header::COOKIE, format!("vg_session={sid}"))
        .body(Bytes::new())
        .unwrap();
    let ctx2 = gateway.context(&req);
    assert_eq!(ctx2.session().id(), sid);
    assert_eq!(ctx2.session().get("left-panel").as_deref(), Some("unpinned"));
}
