//! Endpoint URL classification.
//!
//! Deciding whether a URL may be used to enable an account is a pure
//! function over a closed set of classes:
//!
//! ```text
//!   parse ──✗──→ Malformed
//!     │
//!     ├── legacy host family ──→ LegacyUrl
//!     │
//!     └── strip /Hubs/<h>/Groups/<g>/Projects/<p>
//!           ├── auth marker ──→ AuthUrl
//!           └── otherwise   ──→ NonAuthUrl
//! ```
//!
//! An auth marker is a path segment equal to `auth` or a host whose first
//! label is `auth` (the production endpoint is
//! `https://auth.quantum-computing.ibm.com/api`).

use std::fmt;

use reqwest::Url;

use crate::credentials::ProviderKey;

/// Host of the legacy (version 1) API.
pub const LEGACY_API_HOST: &str = "quantumexperience.ng.bluemix.net";

/// Production authentication URL.
pub const QX_AUTH_URL: &str = "https://auth.quantum-computing.ibm.com/api";

/// Classification of an endpoint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlClass {
    /// A version 2 authentication URL; valid for enabling an account.
    AuthUrl,
    /// A URL of the legacy API host family.
    LegacyUrl,
    /// A version 2 URL without an auth marker (e.g. the API URL itself).
    NonAuthUrl,
    /// Not an absolute HTTPS URL with a host.
    Malformed,
}

impl UrlClass {
    /// Whether an account can be enabled with a URL of this class.
    pub fn is_auth(self) -> bool {
        self == UrlClass::AuthUrl
    }
}

impl fmt::Display for UrlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlClass::AuthUrl => "auth URL",
            UrlClass::LegacyUrl => "legacy API URL",
            UrlClass::NonAuthUrl => "non-auth API URL",
            UrlClass::Malformed => "malformed URL",
        };
        f.write_str(name)
    }
}

/// Classify an endpoint URL.
///
/// Total and side-effect free: every input maps to exactly one class.
pub fn classify_url(raw: &str) -> UrlClass {
    let Ok(url) = Url::parse(raw.trim()) else {
        return UrlClass::Malformed;
    };
    if url.scheme() != "https" {
        return UrlClass::Malformed;
    }
    let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
        return UrlClass::Malformed;
    };
    if host.is_empty() {
        return UrlClass::Malformed;
    }

    if is_legacy_host(&host) {
        return UrlClass::LegacyUrl;
    }

    let segments = path_segments(&url);
    let (base, _) = split_hub_suffix(&segments);

    let auth_host = host.split('.').next() == Some("auth");
    let auth_path = base.iter().any(|s| s.eq_ignore_ascii_case("auth"));

    if auth_host || auth_path {
        UrlClass::AuthUrl
    } else {
        UrlClass::NonAuthUrl
    }
}

/// Extract the `(hub, group, project)` triple from a trailing
/// `/Hubs/<h>/Groups/<g>/Projects/<p>` path suffix.
pub fn parse_hub_suffix(raw: &str) -> Option<ProviderKey> {
    let url = Url::parse(raw.trim()).ok()?;
    let segments = path_segments(&url);
    split_hub_suffix(&segments).1
}

/// Split a URL carrying a `/Hubs/<h>/Groups/<g>/Projects/<p>` suffix into
/// the URL without the suffix and the provider key it names.
pub fn strip_hub_suffix(raw: &str) -> Option<(String, ProviderKey)> {
    let mut url = Url::parse(raw.trim()).ok()?;
    let segments = path_segments(&url);
    let (base, key) = split_hub_suffix(&segments);
    let key = key?;
    let path = format!("/{}", base.join("/"));
    url.set_path(&path);
    Some((url.to_string(), key))
}

/// Build the project-scoped API URL for a provider.
pub fn project_url(api_url: &str, key: &ProviderKey) -> String {
    format!(
        "{}/Hubs/{}/Groups/{}/Projects/{}",
        api_url.trim_end_matches('/'),
        key.hub,
        key.group,
        key.project
    )
}

fn is_legacy_host(host: &str) -> bool {
    host == LEGACY_API_HOST
        || host
            .strip_suffix(LEGACY_API_HOST)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn split_hub_suffix(segments: &[String]) -> (&[String], Option<ProviderKey>) {
    let n = segments.len();
    if n < 6 {
        return (segments, None);
    }
    let tail = &segments[n - 6..];
    if tail[0] == "Hubs" && tail[2] == "Groups" && tail[4] == "Projects" {
        let key = ProviderKey::new(&tail[1], &tail[3], &tail[5]);
        (&segments[..n - 6], Some(key))
    } else {
        (segments, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API1_URL: &str = "https://quantumexperience.ng.bluemix.net/api";
    const API2_URL: &str = "https://api.quantum-computing.ibm.com/api";

    #[test]
    fn test_production_auth_url() {
        assert_eq!(classify_url(QX_AUTH_URL), UrlClass::AuthUrl);
    }

    #[test]
    fn test_auth_path_segment() {
        assert_eq!(
            classify_url("https://quantum.example.com/auth/api"),
            UrlClass::AuthUrl
        );
        assert_eq!(
            classify_url("https://quantum.example.com/api/AUTH"),
            UrlClass::AuthUrl
        );
    }

    #[test]
    fn test_api2_url_is_non_auth() {
        assert_eq!(classify_url(API2_URL), UrlClass::NonAuthUrl);
    }

    #[test]
    fn test_api2_url_with_hub_is_non_auth() {
        let url = format!("{API2_URL}/Hubs/X/Groups/Y/Projects/Z");
        assert_eq!(classify_url(&url), UrlClass::NonAuthUrl);
    }

    #[test]
    fn test_hub_named_auth_does_not_count() {
        let url = format!("{API2_URL}/Hubs/auth/Groups/auth/Projects/auth");
        assert_eq!(classify_url(&url), UrlClass::NonAuthUrl);
    }

    #[test]
    fn test_legacy_urls() {
        assert_eq!(classify_url(API1_URL), UrlClass::LegacyUrl);
        assert_eq!(
            classify_url("https://eu.quantumexperience.ng.bluemix.net/api/auth"),
            UrlClass::LegacyUrl
        );
        assert_eq!(
            classify_url("https://notquantumexperience.ng.bluemix.net/api"),
            UrlClass::NonAuthUrl
        );
    }

    #[test]
    fn test_malformed_urls() {
        assert_eq!(classify_url(""), UrlClass::Malformed);
        assert_eq!(classify_url("not a url"), UrlClass::Malformed);
        assert_eq!(
            classify_url("http://auth.quantum-computing.ibm.com/api"),
            UrlClass::Malformed
        );
        assert_eq!(classify_url("mailto:auth@example.com"), UrlClass::Malformed);
    }

    #[test]
    fn test_parse_hub_suffix() {
        let key = parse_hub_suffix(&format!("{API2_URL}/Hubs/ibm-q/Groups/open/Projects/main"))
            .unwrap();
        assert_eq!(key, ProviderKey::new("ibm-q", "open", "main"));
        assert!(parse_hub_suffix(API2_URL).is_none());
        assert!(parse_hub_suffix(&format!("{API2_URL}/Hubs/a/Groups/b")).is_none());
    }

    #[test]
    fn test_strip_hub_suffix() {
        let (base, key) =
            strip_hub_suffix(&format!("{QX_AUTH_URL}/Hubs/ibm-q/Groups/research/Projects/alpha"))
                .unwrap();
        assert_eq!(base, QX_AUTH_URL);
        assert_eq!(key, ProviderKey::new("ibm-q", "research", "alpha"));
        assert_eq!(classify_url(&base), UrlClass::AuthUrl);
        assert!(strip_hub_suffix(QX_AUTH_URL).is_none());
    }

    #[test]
    fn test_project_url() {
        let key = ProviderKey::new("ibm-q", "open", "main");
        assert_eq!(
            project_url("https://api.quantum-computing.ibm.com/api/", &key),
            "https://api.quantum-computing.ibm.com/api/Hubs/ibm-q/Groups/open/Projects/main"
        );
    }
}
