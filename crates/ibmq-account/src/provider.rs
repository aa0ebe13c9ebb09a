//! Providers and their backends.
//!
//! An [`AccountProvider`] is the (hub, group, project)-scoped view of an
//! account. Its backends are discovered lazily on first use and cached for
//! the lifetime of the provider.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::api::ProviderApi;
use crate::backend::RemoteBackend;
use crate::credentials::{Credential, ProviderKey};
use crate::error::{AccountError, AccountResult};

/// Display names of devices and the canonical names they stand for.
const BACKEND_ALIASES: [(&str, &str); 4] = [
    ("ibmq_5_yorktown", "ibmqx2"),
    ("ibmq_5_tenerife", "ibmqx4"),
    ("ibmq_16_rueschlikon", "ibmqx5"),
    ("ibmq_20_austin", "QS1_1"),
];

/// Retired backend names and their replacements.
const DEPRECATED_BACKEND_NAMES: [(&str, &str); 3] = [
    ("ibmqx_qasm_simulator", "ibmq_qasm_simulator"),
    ("ibmqx_hpc_qasm_simulator", "ibmq_qasm_simulator"),
    ("real", "ibmqx1"),
];

/// Read-only name translation table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendAliasMap {
    names: FxHashMap<String, String>,
}

impl BackendAliasMap {
    /// Build a map from `(from, to)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            names: pairs
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Display name → canonical name.
    pub fn aliases() -> Self {
        Self::from_pairs(BACKEND_ALIASES)
    }

    /// Deprecated name → current name.
    pub fn deprecated() -> Self {
        Self::from_pairs(DEPRECATED_BACKEND_NAMES)
    }

    /// Translation for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// All pairs, sorted by source name.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .names
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Name → backend mapping of a provider, in service order.
#[derive(Debug, Default)]
pub struct ProviderBackends {
    backends: Vec<Arc<RemoteBackend>>,
    index: FxHashMap<String, usize>,
}

impl ProviderBackends {
    fn from_backends(backends: Vec<RemoteBackend>) -> Self {
        let mut index = FxHashMap::default();
        let mut ordered = Vec::with_capacity(backends.len());
        for backend in backends {
            if index.contains_key(backend.name()) {
                warn!("ignoring duplicate backend {}", backend.name());
                continue;
            }
            index.insert(backend.name().to_string(), ordered.len());
            ordered.push(Arc::new(backend));
        }
        Self {
            backends: ordered,
            index,
        }
    }

    /// Backend by canonical name.
    pub fn get(&self, name: &str) -> Option<&Arc<RemoteBackend>> {
        self.index.get(name).map(|&i| &self.backends[i])
    }

    /// Canonical names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|b| b.name())
    }

    /// Iterate over the backends.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RemoteBackend>> {
        self.backends.iter()
    }

    /// Number of backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend was discovered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

/// Criteria for [`AccountProvider::backends`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendFilter {
    /// Backend name (aliases and deprecated names are resolved).
    pub name: Option<String>,
    /// Simulators only (`true`) or devices only (`false`).
    pub simulator: Option<bool>,
    /// Operational state.
    pub operational: Option<bool>,
}

impl BackendFilter {
    /// A filter matching every backend.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match a name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match simulators or devices.
    pub fn simulator(mut self, simulator: bool) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// Match the operational state.
    pub fn operational(mut self, operational: bool) -> Self {
        self.operational = Some(operational);
        self
    }
}

/// A (hub, group, project)-scoped provider.
pub struct AccountProvider {
    key: ProviderKey,
    credential: Credential,
    api: Arc<dyn ProviderApi>,
    aliases: BackendAliasMap,
    deprecated: BackendAliasMap,
    backends: OnceCell<Arc<ProviderBackends>>,
}

impl AccountProvider {
    /// Create a provider for a project-scoped credential.
    pub fn new(key: ProviderKey, credential: Credential, api: Arc<dyn ProviderApi>) -> Self {
        Self {
            key,
            credential,
            api,
            aliases: BackendAliasMap::aliases(),
            deprecated: BackendAliasMap::deprecated(),
            backends: OnceCell::new(),
        }
    }

    /// The (hub, group, project) key.
    pub fn key(&self) -> &ProviderKey {
        &self.key
    }

    /// The provider-scoped credential.
    pub fn credentials(&self) -> &Credential {
        &self.credential
    }

    /// Display name → canonical name.
    pub fn aliased_backend_names(&self) -> &BackendAliasMap {
        &self.aliases
    }

    /// Deprecated name → current name.
    pub fn deprecated_backend_names(&self) -> &BackendAliasMap {
        &self.deprecated
    }

    /// Backends of this provider, discovered on first use.
    ///
    /// A discovery failure yields an empty mapping and is retried on the
    /// next call.
    pub async fn provider_backends(&self) -> Arc<ProviderBackends> {
        let discovered = self
            .backends
            .get_or_try_init(|| async {
                let configs = self.api.list_backends().await?;
                debug!("discovered {} backends for {}", configs.len(), self.key);
                let backends = configs
                    .into_iter()
                    .map(|config| RemoteBackend::new(config, Arc::clone(&self.api)))
                    .collect();
                Ok::<_, AccountError>(Arc::new(ProviderBackends::from_backends(backends)))
            })
            .await;

        match discovered {
            Ok(backends) => Arc::clone(backends),
            Err(e) => {
                warn!("Unable to retrieve backends for {}: {}", self.key, e);
                Arc::new(ProviderBackends::default())
            }
        }
    }

    /// Canonical name for `name`, following aliases and deprecated names.
    pub fn resolve_backend_name<'a>(&'a self, name: &'a str) -> &'a str {
        if let Some(canonical) = self.aliases.get(name) {
            return canonical;
        }
        if let Some(current) = self.deprecated.get(name) {
            warn!("Backend '{}' is deprecated. Use '{}'.", name, current);
            return current;
        }
        name
    }

    /// Backends matching `filter`, in service order.
    pub async fn backends(
        &self,
        filter: &BackendFilter,
    ) -> AccountResult<Vec<Arc<RemoteBackend>>> {
        let all = self.provider_backends().await;
        let wanted = filter.name.as_deref().map(|n| self.resolve_backend_name(n));

        let mut matched = Vec::new();
        for backend in all.iter() {
            if wanted.is_some_and(|n| n != backend.name()) {
                continue;
            }
            if filter.simulator.is_some_and(|s| s != backend.is_simulator()) {
                continue;
            }
            if let Some(operational) = filter.operational {
                if backend.status().await?.operational != operational {
                    continue;
                }
            }
            matched.push(Arc::clone(backend));
        }
        Ok(matched)
    }

    /// Backend by name, alias or deprecated name.
    pub async fn get_backend(&self, name: &str) -> AccountResult<Arc<RemoteBackend>> {
        let canonical = self.resolve_backend_name(name);
        self.provider_backends()
            .await
            .get(canonical)
            .cloned()
            .ok_or_else(|| AccountError::BackendNotFound(name.to_string()))
    }
}

impl PartialEq for AccountProvider {
    fn eq(&self, other: &Self) -> bool {
        self.credential.unique_id() == other.credential.unique_id()
    }
}

impl Eq for AccountProvider {}

impl std::fmt::Debug for AccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountProvider")
            .field("key", &self.key)
            .field("url", &self.credential.url)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for AccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<AccountProvider(hub={}, group={}, project={})>",
            self.key.hub, self.key.group, self.key.project
        )
    }
}
