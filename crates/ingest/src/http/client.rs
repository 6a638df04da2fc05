use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::HttpFetch;
use crate::errors::IngestError;
use crate::models::ApiRequest;

/// reqwest-backed [`HttpFetch`] with a fixed per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, IngestError> {
        Self::build(Client::builder().timeout(timeout))
    }

    /// Create a client that identifies itself with `user_agent`
    /// (SEC EDGAR rejects anonymous requests).
    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> Result<Self, IngestError> {
        Self::build(Client::builder().timeout(timeout).user_agent(user_agent))
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, IngestError> {
        let client = builder.build().map_err(|e| IngestError::Network {
            provider: "HTTP".to_string(),
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        provider: &str,
        request: &ApiRequest,
    ) -> Result<reqwest::Response, IngestError> {
        debug!("{} request: {}", provider, request);

        let response = self
            .client
            .get(&request.url)
            .query(&request.params.as_pairs())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IngestError::Timeout {
                        provider: provider.to_string(),
                    }
                } else {
                    IngestError::Network {
                        provider: provider.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(IngestError::RateLimited {
                provider: provider.to_string(),
            });
        }

        if !status.is_success() {
            return Err(IngestError::Http {
                provider: provider.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

fn read_error(provider: &str, e: reqwest::Error) -> IngestError {
    IngestError::Network {
        provider: provider.to_string(),
        message: format!("Failed to read response: {}", e),
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn get_text(&self, provider: &str, request: &ApiRequest) -> Result<String, IngestError> {
        self.send(provider, request)
            .await?
            .text()
            .await
            .map_err(|e| read_error(provider, e))
    }

    async fn get_bytes(&self, provider: &str, request: &ApiRequest) -> Result<Vec<u8>, IngestError> {
        let bytes = self
            .send(provider, request)
            .await?
            .bytes()
            .await
            .map_err(|e| read_error(provider, e))?;
        Ok(bytes.to_vec())
    }
}
