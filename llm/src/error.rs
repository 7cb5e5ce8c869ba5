//! Errors raised while talking to a provider.

use crate::ProviderKind;
use thiserror::Error;

/// Broad class of a non-success HTTP status.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    Authentication,
    Permission,
    RateLimited,
    Api,
}

impl TransportErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => TransportErrorKind::Authentication,
            403 => TransportErrorKind::Permission,
            429 => TransportErrorKind::RateLimited,
            _ => TransportErrorKind::Api,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider answered with a non-2xx status.
    #[error("{}", describe_transport(.provider, .status, .detail))]
    Transport {
        provider: ProviderKind,
        status: u16,
        detail: String,
    },

    /// A 2xx body that lacks the field holding the reply.
    #[error("{provider} response format error: missing `{path}`")]
    ResponseFormat {
        provider: ProviderKind,
        path: &'static str,
    },

    #[error("request to {provider} failed: {source}")]
    Network {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to encode {provider} request: {source}")]
    Serialization {
        provider: ProviderKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: ProviderKind },

    #[error("the {provider} API key cannot be sent in an HTTP header")]
    InvalidApiKey { provider: ProviderKind },

    #[error("invalid {provider} base URL: {url}")]
    InvalidBaseUrl { provider: ProviderKind, url: String },

    #[error("{provider} is not configured")]
    NotConfigured { provider: ProviderKind },
}

impl LlmError {
    pub fn provider(&self) -> ProviderKind {
        match self {
            LlmError::Transport { provider, .. }
            | LlmError::ResponseFormat { provider, .. }
            | LlmError::Network { provider, .. }
            | LlmError::Serialization { provider, .. }
            | LlmError::MissingApiKey { provider }
            | LlmError::InvalidApiKey { provider }
            | LlmError::InvalidBaseUrl { provider, .. }
            | LlmError::NotConfigured { provider } => *provider,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        self.status().map(TransportErrorKind::from_status)
    }

    /// Bulleted suggestions shown under a rate-limit failure.
    pub fn remediation(&self) -> Option<&'static str> {
        if self.transport_kind() != Some(TransportErrorKind::RateLimited) {
            return None;
        }
        Some(match self.provider() {
            ProviderKind::Gemini => {
                "• Check the Gemini API quota settings in the Google Cloud Console\n\
                 • Make sure your billing account is enabled and has enough quota\n\
                 • Consider upgrading to a paid plan for higher quotas\n\
                 • Wait for the quota to reset (usually every minute or hour)\n\
                 • See: https://ai.google.dev/gemini-api/docs/rate-limits"
            }
            _ => {
                "• Please try again later and avoid sending requests too frequently\n\
                 • Check the rate limit settings for this API"
            }
        })
    }
}

fn describe_transport(provider: &ProviderKind, status: &u16, detail: &str) -> String {
    match (TransportErrorKind::from_status(*status), provider) {
        (TransportErrorKind::Authentication, _) => format!(
            "{provider} API authentication error (401): the API key is invalid or has expired. Details: {detail}"
        ),
        (TransportErrorKind::Permission, _) => format!(
            "{provider} API permission error (403): check that the API key is correct and has the required permissions. Details: {detail}"
        ),
        (TransportErrorKind::RateLimited, ProviderKind::Gemini) => format!(
            "Gemini API quota exceeded (429): you have exceeded your current quota. Check your Google Cloud billing settings and quota limits. Details: {detail}"
        ),
        (TransportErrorKind::RateLimited, _) => format!(
            "{provider} API rate limit (429): too many requests, please try again later. Details: {detail}"
        ),
        (TransportErrorKind::Api, _) => format!("{provider} API error: {status} - {detail}"),
    }
}
