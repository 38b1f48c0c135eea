//! Provider failures.
//!
//! A [`ProviderError`] never reaches the aggregation driver: `fetch` logs it
//! and returns no events. The code still tells a timeout apart from a
//! rejected token, which is what the warning and `try_fetch` callers need.

use std::fmt;
use thiserror::Error;

/// What went wrong talking to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// 401 or 403: the token is missing, wrong or revoked.
    AuthenticationFailed,
    /// No response at all: connect, DNS or timeout.
    NetworkError,
    /// 429.
    RateLimited,
    /// 5xx.
    ServerError,
    /// A 2xx whose body is not the JSON we expect.
    InvalidResponse,
    /// 404, usually an unknown location slug.
    NotFound,
    /// Any other 4xx.
    BadRequest,
    /// The adapter cannot be built or called as configured.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Classifies an unsuccessful HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::BadRequest,
        }
    }

    /// Returns true when trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns the code as logged.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed provider request or a provider that cannot be set up.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Source name, e.g. "kudago".
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Builds the error for an unsuccessful HTTP status.
    ///
    /// At most 200 characters of the response body are kept.
    pub fn from_status(status: u16, body: &str) -> Self {
        let code = ProviderErrorCode::from_status(status);
        let message = match code {
            ProviderErrorCode::AuthenticationFailed => format!("token rejected (HTTP {})", status),
            ProviderErrorCode::RateLimited => format!("rate limited (HTTP {})", status),
            _ => {
                let excerpt: String = body.chars().take(200).collect();
                format!("HTTP {}: {}", status, excerpt.trim())
            }
        };
        Self::new(code, message)
    }

    /// The request never got a response.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// The response body could not be used.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// The adapter is misconfigured.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Tags the error with the source that raised it.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.provider {
            Some(ref provider) => write!(f, "{}: {} ({})", provider, self.message, self.code),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        use ProviderErrorCode::*;
        let cases = [
            (401, AuthenticationFailed),
            (403, AuthenticationFailed),
            (404, NotFound),
            (422, BadRequest),
            (429, RateLimited),
            (502, ServerError),
        ];
        for (status, code) in cases {
            assert_eq!(ProviderErrorCode::from_status(status), code, "HTTP {status}");
        }
    }

    #[test]
    fn only_transient_codes_retry() {
        assert!(ProviderErrorCode::NetworkError.is_retryable());
        assert!(ProviderErrorCode::RateLimited.is_retryable());
        assert!(ProviderErrorCode::ServerError.is_retryable());
        assert!(!ProviderErrorCode::AuthenticationFailed.is_retryable());
        assert!(!ProviderErrorCode::ConfigurationError.is_retryable());
        assert!(!ProviderErrorCode::InvalidResponse.is_retryable());
    }

    #[test]
    fn from_status_keeps_short_body_excerpt() {
        let body = "x".repeat(500);
        let err = ProviderError::from_status(400, &body);
        assert_eq!(err.code(), ProviderErrorCode::BadRequest);
        assert_eq!(err.message(), format!("HTTP 400: {}", "x".repeat(200)));

        let err = ProviderError::from_status(401, "secret details");
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn display_names_provider_and_code() {
        let err = ProviderError::from_status(429, "").with_provider("timepad");
        assert_eq!(err.to_string(), "timepad: rate limited (HTTP 429) (rate_limited)");

        let err = ProviderError::configuration("eventbrite token is missing");
        assert_eq!(
            err.to_string(),
            "eventbrite token is missing (configuration_error)"
        );
        assert!(err.provider().is_none());
    }

    #[test]
    fn source_is_exposed() {
        use std::error::Error;
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProviderError::invalid_response("bad body").with_source(parse_err);
        assert!(err.source().is_some());
    }
}
