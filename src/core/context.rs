//! Request context management
//!
//! This module provides the RequestContext that wraps one inbound call:
//! parsed query and body parameters, the asynchronous-request marker, the
//! caller's session handle, and string markers communicated to downstream
//! renderers (breadcrumb route overrides, forward flags).

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Request};

use crate::session::SessionHandle;
use crate::utils::request::{get_cookie_value, is_form_urlencoded, pair_value, parse_pairs};

/// Header a caller sets to request a structured partial-content response
/// instead of a full page redirect.
pub const XHR_HEADER: &str = "x-requested-with";
pub const XHR_MARKER: &str = "XMLHttpRequest";

/// Read-only view over an inbound call plus a session-scope accessor.
///
/// The only side effects available through the context are session writes
/// and the string marker map.
pub struct RequestContext {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Vec<(String, String)>,
    headers: HeaderMap,
    base_url: String,
    session: SessionHandle,
    vars: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(req: &Request<Bytes>, session: SessionHandle) -> Self {
        let query = parse_pairs(req.uri().query().unwrap_or_default());
        let body = if is_form_urlencoded(req.headers()) {
            std::str::from_utf8(req.body())
                .map(parse_pairs)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query,
            body,
            headers: req.headers().clone(),
            base_url: String::new(),
            session,
            vars: HashMap::new(),
        }
    }

    /// True if the caller signals an asynchronous/XHR-style request
    pub fn is_asynchronous(&self) -> bool {
        self.headers
            .get(XHR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value == XHR_MARKER)
            .unwrap_or(false)
    }

    /// Look up a named parameter, body parameters taking precedence over
    /// query parameters.
    pub fn param(&self, name: &str) -> Option<&str> {
        pair_value(&self.body, name).or_else(|| pair_value(&self.query, name))
    }

    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path plus the original query string, as received
    pub fn request_uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            let query: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{k}={v}")
                    }
                })
                .collect();
            format!("{}?{}", self.path, query.join("&"))
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        crate::utils::request::get_header_value(&self.headers, name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        get_cookie_value(&self.headers, name)
    }

    /// Prefix stripped from absolute route URLs before route matching
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Store a string marker for downstream renderers
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn contains_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::{MemorySessionStore, SessionStore};

    fn context_for(req: Request<Bytes>) -> RequestContext {
        let store = Arc::new(MemorySessionStore::new());
        let sid = store.create();
        RequestContext::new(&req, SessionHandle::new(store, sid))
    }

    #[test]
    fn test_xhr_marker() {
        let req = Request::builder()
            .uri("/console/leads")
            .header(XHR_HEADER, XHR_MARKER)
            .body(Bytes::new())
            .unwrap();
        assert!(context_for(req).is_asynchronous());

        let req = Request::builder()
            .uri("/console/leads")
            .body(Bytes::new())
            .unwrap();
        assert!(!context_for(req).is_asynchronous());
    }

    #[test]
    fn test_body_params_take_precedence() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/console/ajax?panel=right&page=2")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Bytes::from_static(b"panel=left"))
            .unwrap();
        let ctx = context_for(req);

        assert_eq!(ctx.param("panel"), Some("left"));
        assert_eq!(ctx.param("page"), Some("2"));
        assert_eq!(ctx.param_or("missing", "default"), "default");
    }

    #[test]
    fn test_request_uri_preserves_query() {
        let req = Request::builder()
            .uri("/console/leads/?page=3")
            .body(Bytes::new())
            .unwrap();
        let ctx = context_for(req);
        assert_eq!(ctx.request_uri(), "/console/leads/?page=3");
        assert_eq!(ctx.path(), "/console/leads/");
    }

    #[test]
    fn test_vars_roundtrip() {
        let req = Request::builder().uri("/").body(Bytes::new()).unwrap();
        let mut ctx = context_for(req);

        assert!(!ctx.contains_var("overrideRouteName"));
        ctx.set_var("overrideRouteName", "console_leads|view");
        assert_eq!(ctx.var("overrideRouteName"), Some("console_leads|view"));
        ctx.remove_var("overrideRouteName");
        assert!(ctx.var("overrideRouteName").is_none());
    }
}
