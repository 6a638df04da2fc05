//! HTTP fetch primitive.
//!
//! [`HttpFetch`] is the seam every vendor adapter calls through: one GET with
//! query parameters, bounded by the client's timeout. [`HttpClient`] is the
//! reqwest-backed implementation; tests substitute their own.

mod client;
#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::IngestError;
use crate::models::ApiRequest;

pub use client::HttpClient;

#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform the request and return the raw body.
    ///
    /// `provider` is only used to label errors and logs.
    async fn get_text(&self, provider: &str, request: &ApiRequest) -> Result<String, IngestError>;

    /// Perform the request and return the body untouched.
    ///
    /// Used for filing documents, which may be binary.
    async fn get_bytes(&self, provider: &str, request: &ApiRequest) -> Result<Vec<u8>, IngestError> {
        Ok(self.get_text(provider, request).await?.into_bytes())
    }

    /// Perform the request and parse the body as JSON.
    async fn get_json(&self, provider: &str, request: &ApiRequest) -> Result<Value, IngestError> {
        let text = self.get_text(provider, request).await?;
        parse_json(provider, &text)
    }
}

/// Parse a response body, failing with [`IngestError::Parse`] when it is not JSON.
pub fn parse_json(provider: &str, text: &str) -> Result<Value, IngestError> {
    serde_json::from_str(text)
        .map_err(|e| IngestError::parse(provider, format!("Failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_object() {
        let value = parse_json("FRED", r#"{"observations": []}"#).unwrap();
        assert_eq!(value, json!({"observations": []}));
    }

    #[test]
    fn test_parse_json_rejects_html() {
        let err = parse_json("SEC_EDGAR", "<html>Forbidden</html>").unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));
        assert!(!err.is_configuration());
    }
}
