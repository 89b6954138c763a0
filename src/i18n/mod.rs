//! Message catalogs for flash and UI text
//!
//! Catalogs are grouped by domain; message templates use `%name%`
//! placeholders. An unknown key degrades to the key itself so a missing
//! translation never breaks composition.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::core::traits::Localizer;

/// In-memory [`Localizer`] implementation.
#[derive(Default)]
pub struct Catalog {
    domains: DashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single message under a domain
    pub fn add(&self, domain: &str, key: impl Into<String>, template: impl Into<String>) {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .insert(key.into(), template.into());
    }
}

impl Localizer for Catalog {
    fn translate(&self, key: &str, vars: &HashMap<String, String>, domain: &str) -> String {
        let Some(messages) = self.domains.get(domain) else {
            return key.to_string();
        };
        let Some(template) = messages.get(key) else {
            return key.to_string();
        };

        let mut message = template.clone();
        for (name, value) in vars {
            message = message.replace(&format!("%{name}%"), value);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_vars() {
        let catalog = Catalog::new();
        catalog.add("flashes", "core.notice.updated", "%name% has been updated");

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Segment A".to_string());
        assert_eq!(
            catalog.translate("core.notice.updated", &vars, "flashes"),
            "Segment A has been updated"
        );
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.translate("core.error.accessdenied", &HashMap::new(), "flashes"),
            "core.error.accessdenied"
        );
    }

    #[test]
    fn test_domains_are_isolated() {
        let catalog = Catalog::new();
        catalog.add("flashes", "key", "flash text");
        assert_eq!(catalog.translate("key", &HashMap::new(), "menus"), "key");
    }
}
