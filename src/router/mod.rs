//! Route lookup backed by a compiled match table
//!
//! Patterns are validated when inserted, so lookup failures at request time
//! only ever mean "no route matches this path".

use matchit::{Match, Router};

use crate::core::error::{GateError, GateResult};
use crate::core::traits::{ResolvedRoute, RouteLookup};

/// Path parameter that differentiates action URLs sharing one route name.
const OBJECT_ACTION_PARAM: &str = "objectAction";

/// Match-table implementation of [`RouteLookup`].
///
/// Patterns use `matchit` syntax, e.g. `/leads/{objectAction}/{objectId}`.
#[derive(Default)]
pub struct RouteTable {
    inner: Router<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern under a canonical route name
    pub fn insert(&mut self, pattern: &str, name: &str) -> GateResult<()> {
        self.inner
            .insert(pattern, name.to_string())
            .map_err(|e| GateError::Configuration(format!("Invalid route pattern '{pattern}': {e}")))
    }
}

impl RouteLookup for RouteTable {
    fn resolve(&self, path: &str) -> GateResult<ResolvedRoute> {
        // Queries embedded in override URLs would break matching
        let path = path.split('?').next().unwrap_or(path);

        let Match { value, params } = self
            .inner
            .at(path)
            .map_err(|_| GateError::RouteLookup(format!("no route matches '{path}'")))?;

        Ok(ResolvedRoute {
            name: value.clone(),
            action_suffix: params.get(OBJECT_ACTION_PARAM).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table.insert("/console", "console_index").unwrap();
        table
            .insert("/console/leads/{objectAction}/{objectId}", "console_lead_action")
            .unwrap();
        table
    }

    #[test]
    fn test_resolve_plain_route() {
        let resolved = table().resolve("/console").unwrap();
        assert_eq!(resolved.name, "console_index");
        assert!(resolved.action_suffix.is_none());
    }

    #[test]
    fn test_resolve_appends_object_action() {
        let resolved = table().resolve("/console/leads/edit/42").unwrap();
        assert_eq!(resolved.name, "console_lead_action");
        assert_eq!(resolved.action_suffix.as_deref(), Some("edit"));
    }

    #[test]
    fn test_resolve_strips_query() {
        let resolved = table().resolve("/console?page=2").unwrap();
        assert_eq!(resolved.name, "console_index");
    }

    #[test]
    fn test_no_match_is_lookup_error() {
        let result = table().resolve("/nowhere");
        assert!(matches!(result, Err(GateError::RouteLookup(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected_at_insert() {
        let mut table = RouteTable::new();
        table.insert("/a/{x}", "a").unwrap();
        // conflicting parameter name in the same position
        let result = table.insert("/a/{y}", "b");
        assert!(matches!(result, Err(GateError::Configuration(_))));
    }
}
