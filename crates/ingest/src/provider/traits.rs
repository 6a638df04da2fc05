//! Vendor adapter trait definitions.
//!
//! This module defines [`FetchAdapter`], the capability set every vendor
//! implements so the batch orchestrator can drive it generically.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::IngestError;
use crate::models::{ApiRequest, Validated};

use super::capabilities::RateLimit;

/// Trait for per-entity vendor fetchers.
///
/// A fetch is `build_request` → `perform` → `validate`. Soft failures come
/// back as [`Validated::NoData`]; transport, HTTP and parse failures as errors.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use bronze_ingest::provider::{FetchAdapter, RateLimit};
///
/// struct MyAdapter {
///     http: Arc<dyn HttpFetch>,
///     api_key: Option<String>,
/// }
///
/// #[async_trait]
/// impl FetchAdapter for MyAdapter {
///     type Selector = MyEndpoint;
///
///     fn id(&self) -> &'static str {
///         "MY_VENDOR"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     // ... build_request, perform, validate
/// }
/// ```
#[async_trait]
pub trait FetchAdapter: Send + Sync {
    /// Endpoint/function selector; a closed set parsed with `FromStr`.
    type Selector: fmt::Display + Send + Sync;

    /// Constant identifier such as "ALPHA_VANTAGE", used in logs and errors.
    fn id(&self) -> &'static str;

    /// Throttle the orchestrator applies between groups of entities.
    fn rate_limit(&self) -> RateLimit;

    /// Build the request for one entity.
    ///
    /// Fails with a configuration-tier error when the credential is missing or
    /// the entity/selector combination is invalid.
    fn build_request(
        &self,
        entity: &str,
        selector: &Self::Selector,
    ) -> Result<ApiRequest, IngestError>;

    /// Execute the request and return the parsed body.
    async fn perform(&self, request: &ApiRequest) -> Result<Value, IngestError>;

    /// Inspect a parsed body for vendor soft-failure markers.
    ///
    /// Returns an error only when the body does not have the basic shape the
    /// vendor always uses (e.g. a JSON object).
    fn validate(&self, raw: Value, entity: &str) -> Result<Validated, IngestError>;

    /// Fetch and validate a single entity.
    async fn fetch(&self, entity: &str, selector: &Self::Selector) -> Result<Validated, IngestError> {
        let request = self.build_request(entity, selector)?;
        let raw = self.perform(&request).await?;
        self.validate(raw, entity)
    }
}
