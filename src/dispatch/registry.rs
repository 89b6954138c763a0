//! Centralized handler registry
//!
//! Maps component/handler pairs to ajax handlers, view targets to content
//! handlers, and action names to page actions. Keys are validated when a
//! handler is registered, never resolved reflectively at call time.

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::core::error::{GateError, GateResult};
use crate::core::traits::{AjaxHandler, ContentHandler, PageAction};

/// Registry for all externally provided handlers
#[derive(Default)]
pub struct HandlerRegistry {
    ajax: DashMap<String, Arc<dyn AjaxHandler>>,
    content: DashMap<String, Arc<dyn ContentHandler>>,
    pages: DashMap<String, Arc<dyn PageAction>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ajax handler under a component/handler pair
    pub fn register_ajax(
        &self,
        component: &str,
        handler_name: &str,
        handler: Arc<dyn AjaxHandler>,
    ) -> GateResult<()> {
        let key = Self::ajax_key(validate_segment(component)?, validate_segment(handler_name)?);
        debug!("Registering ajax handler: {key}");
        self.ajax.insert(key, handler);
        Ok(())
    }

    /// Whether an ajax handler is registered for the pair
    pub fn exists(&self, component: &str, handler_name: &str) -> bool {
        self.ajax.contains_key(&Self::ajax_key(component, handler_name))
    }

    pub fn get_ajax(&self, component: &str, handler_name: &str) -> Option<Arc<dyn AjaxHandler>> {
        self.ajax
            .get(&Self::ajax_key(component, handler_name))
            .map(|entry| entry.value().clone())
    }

    /// Register a content handler under a view target id
    pub fn register_content(
        &self,
        target: &str,
        handler: Arc<dyn ContentHandler>,
    ) -> GateResult<()> {
        if target.is_empty() {
            return Err(GateError::Configuration(
                "content handler target must be non-empty".to_string(),
            ));
        }
        debug!("Registering content handler: {target}");
        self.content.insert(target.to_lowercase(), handler);
        Ok(())
    }

    pub fn get_content(&self, target: &str) -> Option<Arc<dyn ContentHandler>> {
        self.content
            .get(&target.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    /// Register a page action under its name
    pub fn register_page(&self, action: &str, handler: Arc<dyn PageAction>) -> GateResult<()> {
        let action = validate_segment(action)?;
        debug!("Registering page action: {action}");
        self.pages.insert(action.to_lowercase(), handler);
        Ok(())
    }

    pub fn get_page(&self, action: &str) -> Option<Arc<dyn PageAction>> {
        self.pages
            .get(&action.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    // Lookups are case-insensitive on component and handler names
    fn ajax_key(component: &str, handler_name: &str) -> String {
        format!("{}:{}", component.to_lowercase(), handler_name.to_lowercase())
    }
}

fn validate_segment(segment: &str) -> GateResult<&str> {
    if segment.is_empty() {
        return Err(GateError::Configuration(
            "registry key segment must be non-empty".to_string(),
        ));
    }
    if segment.contains(':') {
        return Err(GateError::Configuration(format!(
            "registry key segment '{segment}' must not contain ':'"
        )));
    }
    Ok(segment)
}
