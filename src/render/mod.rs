//! Minimal placeholder template engine
//!
//! Templates are registered as strings with `{{ name }}` placeholders and
//! rendered against a JSON parameter map. This stands in for the host's
//! templating subsystem in tests and small deployments; production hosts
//! plug their own [`TemplateEngine`] implementation into the gateway.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::core::error::{GateError, GateResult};
use crate::core::traits::TemplateEngine;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").unwrap());

/// String-template implementation of [`TemplateEngine`].
#[derive(Default)]
pub struct SimpleTemplates {
    templates: DashMap<String, String>,
}

impl SimpleTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a template body under an id
    pub fn register(&self, template_id: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(template_id.into(), body.into());
    }
}

impl TemplateEngine for SimpleTemplates {
    fn render(&self, template_id: &str, params: &JsonMap<String, JsonValue>) -> GateResult<String> {
        let body = self
            .templates
            .get(template_id)
            .ok_or_else(|| GateError::Template(format!("unknown template '{template_id}'")))?;

        let rendered = PLACEHOLDER.replace_all(body.value(), |caps: &Captures| {
            params.get(&caps[1]).map(render_value).unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Number(_) | JsonValue::Bool(_) => value.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
