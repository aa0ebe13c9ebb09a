//! Error types for the HTTPS adapter.

use ibmq_account::TransportError;
use thiserror::Error;

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors that can occur when talking to the service over HTTPS.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request failed while a proxy was configured.
    #[error("ProxyError: {0}")]
    Proxy(#[source] reqwest::Error),

    /// A proxy URL in the credential could not be used.
    #[error("Invalid proxy URL {url}: {message}")]
    InvalidProxy {
        /// The rejected proxy URL.
        url: String,
        /// Reason.
        message: String,
    },

    /// The access token cannot be sent as a header value.
    #[error("Invalid access token")]
    InvalidToken,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required field is missing from the response.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),
}

/// Render an error with its source chain, so that the root cause (e.g.
/// "Connection refused") is kept when converting to a message.
fn chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<HttpError> for TransportError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Proxy(inner) => TransportError::Proxy(chain(&inner)),
            HttpError::InvalidProxy { .. } => TransportError::Proxy(e.to_string()),
            HttpError::InvalidToken => TransportError::Http {
                status: 401,
                message: e.to_string(),
            },
            HttpError::Request(inner) => {
                let message = chain(&inner);
                if inner.is_timeout() {
                    TransportError::Timeout(message)
                } else if inner.is_decode() {
                    TransportError::InvalidResponse(message)
                } else if let Some(status) = inner.status() {
                    TransportError::Http {
                        status: status.as_u16(),
                        message,
                    }
                } else {
                    TransportError::Connection(message)
                }
            }
            HttpError::ApiError { status, message } => TransportError::Http { status, message },
            HttpError::JsonError(_) | HttpError::MissingField(_) => {
                TransportError::InvalidResponse(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_to_http() {
        let transport: TransportError = HttpError::ApiError {
            status: 404,
            message: "Not Found".into(),
        }
        .into();
        assert_eq!(transport.status(), Some(404));
        assert!(transport.to_string().contains("HTTPError 404"));
    }

    #[test]
    fn test_json_error_to_invalid_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let transport: TransportError = HttpError::JsonError(json_err).into();
        assert!(matches!(transport, TransportError::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_field_to_invalid_response() {
        let transport: TransportError = HttpError::MissingField("qObjectResult").into();
        assert!(transport.to_string().contains("qObjectResult"));
    }

    #[test]
    fn test_invalid_proxy_to_proxy_error() {
        let transport: TransportError = HttpError::InvalidProxy {
            url: "::bad::".into(),
            message: "relative URL without a base".into(),
        }
        .into();
        assert!(transport.to_string().contains("ProxyError"));
    }

    #[test]
    fn test_invalid_token_to_unauthorized() {
        let transport: TransportError = HttpError::InvalidToken.into();
        assert_eq!(transport.status(), Some(401));
    }
}
