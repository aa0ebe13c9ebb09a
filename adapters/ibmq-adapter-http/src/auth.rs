//! Token login and hub catalog discovery.

use std::sync::Arc;

use async_trait::async_trait;
use ibmq_account::{
    Credential, ProviderApi, ProviderKey, ServiceUrls, Session, SessionAuthenticator,
    TransportError,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::HttpProviderApi;
use crate::client::ApiClient;
use crate::error::HttpResult;

/// Response of `POST /users/loginWithToken`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    /// Access token.
    id: String,
}

/// Response of `GET /users/me`.
#[derive(Debug, Deserialize)]
struct UserInfo {
    urls: UserUrls,
}

#[derive(Debug, Deserialize)]
struct UserUrls {
    http: String,
    #[serde(default)]
    ws: Option<String>,
}

/// A hub entry of `GET /Network`.
#[derive(Debug, Deserialize)]
pub(crate) struct HubInfo {
    name: String,
    #[serde(default)]
    groups: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GroupInfo {
    #[serde(default)]
    projects: serde_json::Map<String, serde_json::Value>,
}

/// Flatten the network listing into (hub, group, project) keys, keeping the
/// order of the listing.
pub(crate) fn hub_catalog(hubs: Vec<HubInfo>) -> HttpResult<Vec<ProviderKey>> {
    let mut keys = Vec::new();
    for hub in hubs {
        for (group_name, group) in hub.groups {
            let group: GroupInfo = serde_json::from_value(group)?;
            for project_name in group.projects.keys() {
                keys.push(ProviderKey::new(&hub.name, &group_name, project_name));
            }
        }
    }
    Ok(keys)
}

/// [`SessionAuthenticator`] over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct HttpAuthenticator;

impl HttpAuthenticator {
    /// Create an authenticator.
    pub fn new() -> Self {
        Self
    }

    async fn login(&self, credential: &Credential) -> HttpResult<Session> {
        let base = credential.url.trim_end_matches('/');

        let client = ApiClient::new(credential, None)?;
        let login: LoginResponse = client
            .post_json(
                &format!("{base}/users/loginWithToken"),
                &serde_json::json!({ "apiToken": credential.token }),
            )
            .await?;

        let client = ApiClient::new(credential, Some(&login.id))?;
        let user: UserInfo = client.get_json(&format!("{base}/users/me")).await?;
        let http = user.urls.http.trim_end_matches('/').to_string();

        let network: Vec<HubInfo> = client.get_json(&format!("{http}/Network")).await?;
        let hubs = hub_catalog(network)?;
        debug!("{} providers available at {}", hubs.len(), http);

        Ok(Session {
            access_token: login.id,
            urls: ServiceUrls {
                http,
                ws: user.urls.ws,
            },
            hubs,
        })
    }
}

#[async_trait]
impl SessionAuthenticator for HttpAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Result<Session, TransportError> {
        Ok(self.login(credential).await?)
    }

    async fn connect(
        &self,
        session: &Session,
        credential: &Credential,
    ) -> Result<Arc<dyn ProviderApi>, TransportError> {
        let client = ApiClient::new(credential, Some(&session.access_token))?;
        Ok(Arc::new(HttpProviderApi::new(client, &credential.url)))
    }
}
