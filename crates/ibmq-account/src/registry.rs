//! Provider registry of an enabled account.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::credentials::{ProviderFilter, ProviderKey};
use crate::error::{AccountError, AccountResult};
use crate::provider::AccountProvider;

/// Ordered providers of an account, indexed by key.
///
/// Order is the hub catalog order and is stable for the lifetime of the
/// registry.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<AccountProvider>>,
    index: FxHashMap<ProviderKey, usize>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. A provider with the same key is replaced in
    /// place.
    pub fn insert(&mut self, provider: AccountProvider) {
        let key = provider.key().clone();
        debug!("Registering provider: {}", key);
        let provider = Arc::new(provider);
        match self.index.get(&key) {
            Some(&i) => self.providers[i] = provider,
            None => {
                self.index.insert(key, self.providers.len());
                self.providers.push(provider);
            }
        }
    }

    /// Providers matching `filter`, in catalog order.
    pub fn providers(&self, filter: &ProviderFilter) -> Vec<Arc<AccountProvider>> {
        self.providers
            .iter()
            .filter(|p| filter.matches(p.key()))
            .cloned()
            .collect()
    }

    /// The single provider matching `filter`.
    pub fn get_provider(&self, filter: &ProviderFilter) -> AccountResult<Arc<AccountProvider>> {
        let mut matches = self.providers(filter);
        match matches.len() {
            0 => Err(AccountError::ProviderNotFound(filter.to_string())),
            1 => Ok(matches.remove(0)),
            count => Err(AccountError::AmbiguousProvider {
                filter: filter.to_string(),
                count,
            }),
        }
    }

    /// Exact lookup by key.
    pub fn get(&self, key: &ProviderKey) -> Option<Arc<AccountProvider>> {
        self.index.get(key).map(|&i| Arc::clone(&self.providers[i]))
    }

    /// First provider in catalog order.
    pub fn first(&self) -> Option<Arc<AccountProvider>> {
        self.providers.first().cloned()
    }

    /// Keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &ProviderKey> {
        self.providers.iter().map(|p| p.key())
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        BackendConfiguration, BackendProperties, BackendStatus, JobInfo, JobPayload,
        ProviderApi, PulseDefaults,
    };
    use crate::credentials::Credential;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    struct NullApi;

    #[async_trait]
    impl ProviderApi for NullApi {
        async fn list_backends(&self) -> Result<Vec<BackendConfiguration>, TransportError> {
            Ok(Vec::new())
        }
        async fn backend_status(&self, _: &str) -> Result<BackendStatus, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
        async fn backend_properties(
            &self,
            _: &str,
            _: Option<DateTime<Utc>>,
        ) -> Result<Option<BackendProperties>, TransportError> {
            Ok(None)
        }
        async fn backend_defaults(
            &self,
            _: &str,
        ) -> Result<Option<PulseDefaults>, TransportError> {
            Ok(None)
        }
        async fn submit_job(&self, _: &str, _: &JobPayload) -> Result<JobInfo, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
        async fn job_status(&self, _: &str) -> Result<JobInfo, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
        async fn job_result(&self, _: &str) -> Result<serde_json::Value, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
        async fn cancel_job(&self, _: &str) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn provider(hub: &str, group: &str, project: &str) -> AccountProvider {
        let key = ProviderKey::new(hub, group, project);
        let credential = Credential::production("t").for_provider(&key, "https://api.example.com");
        AccountProvider::new(key, credential, Arc::new(NullApi))
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.insert(provider("ibm-q", "open", "main"));
        registry.insert(provider("ibm-q", "research", "alpha"));
        registry.insert(provider("partner", "open", "main"));
        registry
    }

    #[test]
    fn test_providers_preserve_catalog_order() {
        let registry = registry();
        let keys: Vec<String> = registry.keys().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            ["ibm-q/open/main", "ibm-q/research/alpha", "partner/open/main"]
        );
        assert_eq!(registry.providers(&ProviderFilter::any()).len(), 3);
    }

    #[test]
    fn test_filter_by_hub() {
        let matches = registry().providers(&ProviderFilter::any().hub("ibm-q"));
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|p| p.key().hub == "ibm-q"));
    }

    #[test]
    fn test_get_provider_unique() {
        let provider = registry()
            .get_provider(&ProviderFilter::any().group("research"))
            .unwrap();
        assert_eq!(provider.key().project, "alpha");
    }

    #[test]
    fn test_get_provider_ambiguous() {
        let err = registry()
            .get_provider(&ProviderFilter::any().group("open"))
            .unwrap_err();
        assert!(matches!(err, AccountError::AmbiguousProvider { count: 2, .. }));
    }

    #[test]
    fn test_get_provider_missing() {
        let err = registry()
            .get_provider(&ProviderFilter::any().hub("nope"))
            .unwrap_err();
        assert!(err.to_string().contains("No provider"));
    }

    #[test]
    fn test_exact_lookup_and_replace() {
        let mut registry = registry();
        let key = ProviderKey::new("partner", "open", "main");
        assert!(registry.get(&key).is_some());

        registry.insert(provider("partner", "open", "main"));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.keys().last(), Some(&key));
        assert!(registry.get(&ProviderKey::new("x", "y", "z")).is_none());
    }
}
