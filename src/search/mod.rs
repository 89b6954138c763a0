//! Global search fan-out
//!
//! The `globalsearch` built-in dispatches the search string to every
//! registered provider and collects their results grouped by section.
//! Provider failures degrade that section only; they never fail the
//! dispatch.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use futures::future::join_all;

use crate::core::traits::SearchProvider;

/// Results grouped by provider section, ordered by section name.
pub type SearchResults = BTreeMap<String, Vec<String>>;

/// Fan-out bus over the registered search providers.
#[derive(Default)]
pub struct SearchBus {
    providers: RwLock<Vec<Arc<dyn SearchProvider>>>,
}

impl SearchBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, provider: Arc<dyn SearchProvider>) {
        self.providers
            .write()
            .expect("search provider list poisoned")
            .push(provider);
    }

    /// Dispatch `query` to all providers and merge their results.
    ///
    /// Runs even for an empty query; providers decide what that means.
    pub async fn dispatch(&self, query: &str) -> SearchResults {
        let providers: Vec<Arc<dyn SearchProvider>> = self
            .providers
            .read()
            .expect("search provider list poisoned")
            .clone();

        let searches = providers.iter().map(|provider| {
            let provider = provider.clone();
            async move {
                let name = provider.name().to_string();
                (name, provider.search(query).await)
            }
        });

        let mut results = SearchResults::new();
        for (name, outcome) in join_all(searches).await {
            match outcome {
                Ok(hits) => {
                    if !hits.is_empty() {
                        results.insert(name, hits);
                    }
                }
                Err(e) => {
                    log::warn!("Search provider '{name}' failed: {e}");
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::core::error::{GateError, GateResult};

    struct FixedProvider {
        name: &'static str,
        hits: Vec<String>,
    }

    #[async_trait]
    impl SearchProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, _query: &str) -> GateResult<Vec<String>> {
            Ok(self.hits.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _query: &str) -> GateResult<Vec<String>> {
            Err(GateError::Internal("backend offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_merges_sections() {
        let bus = SearchBus::new();
        bus.register(Arc::new(FixedProvider {
            name: "leads",
            hits: vec!["Lead A".to_string()],
        }));
        bus.register(Arc::new(FixedProvider {
            name: "assets",
            hits: vec!["Asset B".to_string(), "Asset C".to_string()],
        }));

        let results = bus.dispatch("a").await;
        assert_eq!(results.len(), 2);
        assert_eq!(results["assets"].len(), 2);
    }

    #[tokio::test]
    async fn test_failures_and_empty_sections_skipped() {
        let bus = SearchBus::new();
        bus.register(Arc::new(FailingProvider));
        bus.register(Arc::new(FixedProvider {
            name: "empty",
            hits: vec![],
        }));

        let results = bus.dispatch("anything").await;
        assert!(results.is_empty());
    }
}
