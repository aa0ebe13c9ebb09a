//! Session authentication.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ProviderApi;
use crate::credentials::{Credential, ProviderKey};
use crate::error::TransportError;

/// Service URLs returned for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrls {
    /// Base URL of the HTTP API.
    pub http: String,
    /// Websocket URL, if the service advertises one.
    pub ws: Option<String>,
}

/// An authenticated session.
#[derive(Clone)]
pub struct Session {
    /// Access token obtained by exchanging the API token.
    pub access_token: String,
    /// Service URLs.
    pub urls: ServiceUrls,
    /// Hub catalog, in the order the service lists it.
    pub hubs: Vec<ProviderKey>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("urls", &self.urls)
            .field("hubs", &self.hubs)
            .finish()
    }
}

/// Exchanges credentials for a session and opens provider connections.
///
/// The factory never talks to the network itself; this trait is the only
/// way in. Implementations must not retry.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Authenticate and fetch the hub catalog.
    async fn authenticate(&self, credential: &Credential) -> Result<Session, TransportError>;

    /// Open the provider-scoped API for a provider credential.
    async fn connect(
        &self,
        session: &Session,
        credential: &Credential,
    ) -> Result<Arc<dyn ProviderApi>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_redacts_access_token() {
        let session = Session {
            access_token: "access-123".into(),
            urls: ServiceUrls {
                http: "https://api.example.com/api".into(),
                ws: None,
            },
            hubs: vec![ProviderKey::new("ibm-q", "open", "main")],
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("access-123"));
        assert!(debug.contains("ibm-q"));
    }
}
