//! IBM Q Experience account client.
//!
//! This crate manages the lifecycle of an IBM Q Experience account within a
//! session and the providers and backends it grants access to.
//!
//! # Overview
//!
//! - [`AccountFactory`] owns the active credential and moves between
//!   `NoAccount` and `Enabled`
//! - [`classify_url`] decides whether a URL may be used to enable an account
//! - [`ProviderRegistry`] holds the (hub, group, project) providers of the
//!   enabled account
//! - [`AccountProvider`] discovers and caches its [`RemoteBackend`]s
//! - [`CredentialStore`] persists a single credential between sessions
//!
//! The network sits behind two traits, [`SessionAuthenticator`] and
//! [`ProviderApi`]; the `ibmq-adapter-http` crate implements them over
//! HTTPS.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ibmq_account::{AccountFactory, BackendFilter, Credential, FileCredentialStore};
//! use ibmq_adapter_http::HttpAuthenticator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(FileCredentialStore::at_default_location()?);
//!     let mut factory = AccountFactory::new(store, Arc::new(HttpAuthenticator::new()));
//!
//!     let provider = factory
//!         .enable_account(Credential::production("MY_API_TOKEN"))
//!         .await?
//!         .expect("account has at least one provider");
//!
//!     for backend in provider.backends(&BackendFilter::any().simulator(false)).await? {
//!         let status = backend.status().await?;
//!         println!("{}: {} pending jobs", backend.name(), status.pending_jobs);
//!     }
//!
//!     factory.disable_account()?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod job;
pub mod provider;
pub mod registry;
pub mod store;
pub mod url;

pub use api::{
    BackendConfiguration, BackendProperties, BackendStatus, JobInfo, JobPayload, ProviderApi,
    PulseDefaults,
};
pub use auth::{ServiceUrls, Session, SessionAuthenticator};
pub use backend::RemoteBackend;
pub use credentials::{
    ActiveAccount, Credential, EnvCredentials, ProviderFilter, ProviderKey, ProxyConfiguration,
};
pub use error::{AccountError, AccountResult, TransportError};
pub use factory::AccountFactory;
pub use job::{JobId, JobStatus, RemoteJob};
pub use provider::{AccountProvider, BackendAliasMap, BackendFilter, ProviderBackends};
pub use registry::ProviderRegistry;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredAccount};
pub use url::{
    QX_AUTH_URL, UrlClass, classify_url, parse_hub_suffix, project_url, strip_hub_suffix,
};
