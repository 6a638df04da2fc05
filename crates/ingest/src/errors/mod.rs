//! Error types and tier classification for the ingestion crate.
//!
//! This module provides:
//! - [`IngestError`]: The main error enum for all fetch operations
//! - [`ErrorTier`]: Classification deciding whether an error aborts a batch

mod tier;

pub use tier::ErrorTier;

use thiserror::Error;

/// Errors that can occur while building, performing or validating a fetch.
///
/// Each variant is classified into an [`ErrorTier`] via [`tier`](Self::tier).
#[derive(Error, Debug)]
pub enum IngestError {
    /// A credential environment variable was not set (or was blank).
    #[error("Missing credential: {var} is not set")]
    MissingCredential {
        /// Name of the environment variable
        var: String,
    },

    /// The caller passed an argument outside the supported set,
    /// e.g. an unknown Alpha Vantage function or a malformed CIK.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration value is present but malformed.
    #[error("Invalid configuration for {var}: {message}")]
    InvalidConfig {
        /// Name of the environment variable
        var: String,
        /// What is wrong with it
        message: String,
    },

    /// The download directory could not be created.
    #[error("Cannot create download directory {path}: {source}")]
    DownloadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {provider}")]
    Http { provider: String, status: u16 },

    /// A transport-level failure (connection refused, DNS, TLS, body read).
    #[error("Network error: {provider} - {message}")]
    Network { provider: String, message: String },

    /// The response body could not be parsed into the expected shape.
    #[error("Parse error: {provider} - {message}")]
    Parse { provider: String, message: String },

    /// A provider-specific hard failure reported in the payload.
    #[error("Provider error: {provider} - {message}")]
    Provider {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// Writing a downloaded document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Returns the tier of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bronze_ingest::errors::{ErrorTier, IngestError};
    ///
    /// let error = IngestError::MissingCredential { var: "API_ALPHA_VANTAGE_KEY".to_string() };
    /// assert_eq!(error.tier(), ErrorTier::Configuration);
    ///
    /// let error = IngestError::Timeout { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.tier(), ErrorTier::Entity);
    /// ```
    pub fn tier(&self) -> ErrorTier {
        match self {
            Self::MissingCredential { .. }
            | Self::InvalidArgument(_)
            | Self::InvalidConfig { .. }
            | Self::DownloadDir { .. } => ErrorTier::Configuration,

            Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::Http { .. }
            | Self::Network { .. }
            | Self::Parse { .. }
            | Self::Provider { .. }
            | Self::Io(_) => ErrorTier::Entity,
        }
    }

    /// Shorthand for `self.tier() == ErrorTier::Configuration`.
    pub fn is_configuration(&self) -> bool {
        self.tier() == ErrorTier::Configuration
    }

    pub(crate) fn parse(provider: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
