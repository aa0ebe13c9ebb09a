//! Account credentials and provider identifiers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::url::QX_AUTH_URL;

/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "QE_TOKEN";
/// Environment variable holding the authentication URL.
pub const ENV_URL: &str = "QE_URL";
/// Environment variable selecting the hub.
pub const ENV_HUB: &str = "QE_HUB";
/// Environment variable selecting the group.
pub const ENV_GROUP: &str = "QE_GROUP";
/// Environment variable selecting the project.
pub const ENV_PROJECT: &str = "QE_PROJECT";

/// All variables read by [`EnvCredentials`].
pub const CREDENTIAL_ENV_VARS: [&str; 5] = [ENV_TOKEN, ENV_URL, ENV_HUB, ENV_GROUP, ENV_PROJECT];

/// Proxy settings, keyed by URL scheme (`http`, `https` or `all`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfiguration {
    /// Proxy URL per scheme.
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
}

impl ProxyConfiguration {
    /// Create an empty proxy configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route requests of `scheme` through `proxy_url`.
    pub fn with_url(mut self, scheme: impl Into<String>, proxy_url: impl Into<String>) -> Self {
        self.urls.insert(scheme.into(), proxy_url.into());
        self
    }

    /// Whether no proxy is configured.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Identifier of a provider: the (hub, group, project) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderKey {
    /// Hub name.
    pub hub: String,
    /// Group name.
    pub group: String,
    /// Project name.
    pub project: String,
}

impl ProviderKey {
    /// Create a provider key.
    pub fn new(hub: impl Into<String>, group: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            hub: hub.into(),
            group: group.into(),
            project: project.into(),
        }
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hub, self.group, self.project)
    }
}

/// Credentials identifying an account, optionally scoped to a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// API token.
    pub token: String,
    /// Endpoint URL.
    pub url: String,
    /// Proxy settings.
    pub proxies: Option<ProxyConfiguration>,
    /// Hub name.
    pub hub: Option<String>,
    /// Group name.
    pub group: Option<String>,
    /// Project name.
    pub project: Option<String>,
    /// Verify TLS certificates.
    pub verify: bool,
}

impl Credential {
    /// Create a credential for `url`.
    pub fn new(token: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            url: url.into(),
            proxies: None,
            hub: None,
            group: None,
            project: None,
            verify: true,
        }
    }

    /// Create a credential for the production authentication URL.
    pub fn production(token: impl Into<String>) -> Self {
        Self::new(token, QX_AUTH_URL)
    }

    /// Set the proxy configuration.
    pub fn with_proxies(mut self, proxies: ProxyConfiguration) -> Self {
        self.proxies = Some(proxies);
        self
    }

    /// Select a hub.
    pub fn with_hub(mut self, hub: impl Into<String>) -> Self {
        self.hub = Some(hub.into());
        self
    }

    /// Select a group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Select a project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Scope this credential to a provider, replacing the URL with the
    /// provider's API URL.
    pub fn for_provider(&self, key: &ProviderKey, url: impl Into<String>) -> Self {
        Self {
            token: self.token.clone(),
            url: url.into(),
            proxies: self.proxies.clone(),
            hub: Some(key.hub.clone()),
            group: Some(key.group.clone()),
            project: Some(key.project.clone()),
            verify: self.verify,
        }
    }

    /// Provider filter from the hub/group/project fields.
    pub fn provider_filter(&self) -> ProviderFilter {
        ProviderFilter {
            hub: self.hub.clone(),
            group: self.group.clone(),
            project: self.project.clone(),
        }
    }

    /// Provider key, when all of hub, group and project are set.
    pub fn provider_key(&self) -> Option<ProviderKey> {
        match (&self.hub, &self.group, &self.project) {
            (Some(h), Some(g), Some(p)) => Some(ProviderKey::new(h, g, p)),
            _ => None,
        }
    }

    /// Identity of the credential: (url, hub, group, project).
    pub fn unique_id(&self) -> (String, Option<String>, Option<String>, Option<String>) {
        (
            self.url.clone(),
            self.hub.clone(),
            self.group.clone(),
            self.project.clone(),
        )
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .field("proxies", &self.proxies)
            .field("hub", &self.hub)
            .field("group", &self.group)
            .field("project", &self.project)
            .field("verify", &self.verify)
            .finish()
    }
}

/// The token/URL pair of the enabled account.
#[derive(Clone, PartialEq, Eq)]
pub struct ActiveAccount {
    /// API token.
    pub token: String,
    /// Authentication URL.
    pub url: String,
}

impl fmt::Debug for ActiveAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveAccount")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .finish()
    }
}

/// Filter over provider keys. Unset fields match any value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFilter {
    /// Hub to match.
    pub hub: Option<String>,
    /// Group to match.
    pub group: Option<String>,
    /// Project to match.
    pub project: Option<String>,
}

impl ProviderFilter {
    /// A filter matching every provider.
    pub fn any() -> Self {
        Self::default()
    }

    /// A filter matching exactly one key.
    pub fn exact(key: &ProviderKey) -> Self {
        Self {
            hub: Some(key.hub.clone()),
            group: Some(key.group.clone()),
            project: Some(key.project.clone()),
        }
    }

    /// Match the hub.
    pub fn hub(mut self, hub: impl Into<String>) -> Self {
        self.hub = Some(hub.into());
        self
    }

    /// Match the group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Match the project.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.hub.is_none() && self.group.is_none() && self.project.is_none()
    }

    /// Check a key against the filter.
    pub fn matches(&self, key: &ProviderKey) -> bool {
        fn field(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().is_none_or(|f| f == value)
        }
        field(&self.hub, &key.hub) && field(&self.group, &key.group) && field(&self.project, &key.project)
    }
}

impl fmt::Display for ProviderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("any");
        }
        let parts: Vec<String> = [("hub", &self.hub), ("group", &self.group), ("project", &self.project)]
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={v}")))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Credentials discovered from environment variables.
///
/// Reads the process environment by default; tests and embedders can
/// supply a fixed set of variables instead.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    vars: Option<HashMap<String, String>>,
}

impl EnvCredentials {
    /// Read from the process environment at lookup time.
    pub fn process() -> Self {
        Self { vars: None }
    }

    /// Read from a fixed set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Never find any credentials.
    pub fn disabled() -> Self {
        Self::from_vars(std::iter::empty::<(String, String)>())
    }

    fn get(&self, name: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Build a credential if `QE_TOKEN` is set.
    ///
    /// `QE_URL` defaults to the production authentication URL.
    pub fn read(&self) -> Option<Credential> {
        let token = self.get(ENV_TOKEN)?;
        let url = self.get(ENV_URL).unwrap_or_else(|| QX_AUTH_URL.to_string());
        let mut credential = Credential::new(token, url);
        credential.hub = self.get(ENV_HUB);
        credential.group = self.get(ENV_GROUP);
        credential.project = self.get(ENV_PROJECT);
        Some(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_builder() {
        let proxies = ProxyConfiguration::new().with_url("https", "https://127.0.0.1:5678");
        let cred = Credential::production("token")
            .with_proxies(proxies.clone())
            .with_hub("ibm-q")
            .with_group("open")
            .with_project("main")
            .with_verify(false);

        assert_eq!(cred.url, QX_AUTH_URL);
        assert_eq!(cred.proxies, Some(proxies));
        assert_eq!(cred.provider_key(), Some(ProviderKey::new("ibm-q", "open", "main")));
        assert!(!cred.verify);
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let cred = Credential::production("super-secret");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_partial_provider_key() {
        let cred = Credential::production("t").with_hub("ibm-q");
        assert!(cred.provider_key().is_none());
        assert_eq!(cred.provider_filter(), ProviderFilter::any().hub("ibm-q"));
    }

    #[test]
    fn test_for_provider() {
        let key = ProviderKey::new("h", "g", "p");
        let cred = Credential::production("t").for_provider(&key, "https://api.example.com/x");
        assert_eq!(cred.url, "https://api.example.com/x");
        assert_eq!(cred.provider_key(), Some(key));
        assert_eq!(cred.token, "t");
    }

    #[test]
    fn test_filter_matching() {
        let key = ProviderKey::new("ibm-q", "open", "main");
        assert!(ProviderFilter::any().matches(&key));
        assert!(ProviderFilter::any().hub("ibm-q").matches(&key));
        assert!(ProviderFilter::exact(&key).matches(&key));
        assert!(!ProviderFilter::any().project("other").matches(&key));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(ProviderFilter::any().to_string(), "any");
        assert_eq!(
            ProviderFilter::any().hub("h").project("p").to_string(),
            "hub=h, project=p"
        );
    }

    #[test]
    fn test_env_credentials_from_vars() {
        let env = EnvCredentials::from_vars([(ENV_TOKEN, "tok"), (ENV_HUB, "ibm-q")]);
        let cred = env.read().unwrap();
        assert_eq!(cred.token, "tok");
        assert_eq!(cred.url, QX_AUTH_URL);
        assert_eq!(cred.hub.as_deref(), Some("ibm-q"));
        assert!(cred.group.is_none());
    }

    #[test]
    fn test_env_credentials_blank_token_ignored() {
        let env = EnvCredentials::from_vars([(ENV_TOKEN, "  "), (ENV_URL, "https://x")]);
        assert!(env.read().is_none());
        assert!(EnvCredentials::disabled().read().is_none());
    }
}
