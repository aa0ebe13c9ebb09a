//! Error types for the account crate.

use thiserror::Error;

use crate::url::UrlClass;

/// Transport-level failures reported by the HTTP collaborator.
///
/// Every variant renders with a stable prefix (`ProxyError`, `Timeout`,
/// `ConnectionError`, `HTTPError`, `InvalidResponse`) so callers can match on
/// the cause without inspecting the variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// The configured proxy could not be reached or refused the tunnel.
    #[error("ProxyError: {0}")]
    Proxy(String),

    /// The request did not complete within the client timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The remote host could not be reached.
    #[error("ConnectionError: {0}")]
    Connection(String),

    /// The server answered with a non-success status.
    #[error("HTTPError {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("InvalidResponse: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Errors that can occur in account, provider and backend operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    /// The URL given to enable/load is not an authentication URL.
    #[error("The URL specified ({url}) is not an IBM Q Experience authentication URL ({class})")]
    InvalidAuthUrl {
        /// The rejected URL.
        url: String,
        /// How the URL was classified.
        class: UrlClass,
    },

    /// An account is already enabled in this factory.
    #[error("An IBM Q Experience account is already in use for this session")]
    AlreadyEnabled,

    /// No account is enabled in this factory.
    #[error("No account is in use for this session")]
    NoActiveAccount,

    /// Nothing is stored and no credentials were found in the environment.
    #[error("No stored IBM Q Experience credentials found")]
    NoStoredAccount,

    /// The credential token is empty.
    #[error("The account token must not be empty")]
    EmptyToken,

    /// The transport failed while talking to the service.
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// More than one provider matches a lookup.
    #[error("More than one provider matches the criteria ({filter}): {count} matches")]
    AmbiguousProvider {
        /// Rendered filter.
        filter: String,
        /// Number of matches.
        count: usize,
    },

    /// No provider matches a lookup.
    #[error("No provider matches the criteria ({0})")]
    ProviderNotFound(String),

    /// No backend with the given (resolved) name exists in the provider.
    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    /// The job finished with an error.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled.
    #[error("Job cancelled: {0}")]
    JobCancelled(String),

    /// The job has not reached a final state yet.
    #[error("Job {0} has not completed")]
    JobNotCompleted(String),

    /// Waiting for a job exceeded the caller's timeout.
    #[error("Timeout waiting for job {0}")]
    JobTimeout(String),

    /// Reading or writing the credential store failed.
    #[error("Credential store error: {0}")]
    Store(#[from] std::io::Error),

    /// The credential store contents could not be (de)serialized.
    #[error("Credential store format error: {0}")]
    StoreFormat(#[from] serde_yaml_ng::Error),
}

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_auth_url_display() {
        let err = AccountError::InvalidAuthUrl {
            url: "https://api.quantum-computing.ibm.com/api".into(),
            class: UrlClass::NonAuthUrl,
        };
        let msg = err.to_string();
        assert!(msg.contains("authentication URL"));
        assert!(msg.contains("api.quantum-computing.ibm.com"));
    }

    #[test]
    fn test_already_enabled_display() {
        assert!(AccountError::AlreadyEnabled.to_string().contains("already"));
    }

    #[test]
    fn test_no_active_account_display() {
        assert!(
            AccountError::NoActiveAccount
                .to_string()
                .contains("No account")
        );
    }

    #[test]
    fn test_no_stored_account_display() {
        assert!(AccountError::NoStoredAccount.to_string().contains("No stored"));
    }

    #[test]
    fn test_proxy_error_display_is_greppable() {
        let err: AccountError = TransportError::Proxy("connection refused".into()).into();
        let msg = err.to_string();
        assert!(msg.contains("ProxyError"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_http_error_status() {
        let err = TransportError::Http {
            status: 401,
            message: "unauthorized".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("HTTPError 401"));
        assert_eq!(TransportError::Timeout("x".into()).status(), None);
    }

    #[test]
    fn test_timeout_classification() {
        assert!(TransportError::Timeout("slow".into()).is_timeout());
        assert!(!TransportError::Connection("down".into()).is_timeout());
    }

    #[test]
    fn test_provider_lookup_display() {
        let ambiguous = AccountError::AmbiguousProvider {
            filter: "hub=ibm-q".into(),
            count: 3,
        };
        assert!(ambiguous.to_string().contains("More than one provider"));
        assert!(ambiguous.to_string().contains('3'));

        let missing = AccountError::ProviderNotFound("hub=nope".into());
        assert!(missing.to_string().contains("No provider"));
    }
}
