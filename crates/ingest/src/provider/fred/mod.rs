//! FRED (Federal Reserve Economic Data) fetcher.
//!
//! Series observations via /fred/series/observations. The validated payload is
//! the `observations` array.
//!
//! FRED allows 120 requests per minute per key.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::batch::fetch_batch;
use crate::config::{require, IngestConfig, FRED_KEY_VAR};
use crate::errors::IngestError;
use crate::http::{HttpClient, HttpFetch};
use crate::models::{ApiRequest, BatchResult, QueryParams, Validated};
use crate::provider::{expect_object, FetchAdapter, RateLimit};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const PROVIDER_ID: &str = "FRED";

const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Optional observation window and frequency applied to every series.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeriesWindow {
    pub observation_start: Option<NaiveDate>,
    pub observation_end: Option<NaiveDate>,
    /// FRED frequency code, e.g. "m" or "q". Passed through unchanged.
    pub frequency: Option<String>,
}

impl SeriesWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, date: NaiveDate) -> Self {
        self.observation_start = Some(date);
        self
    }

    pub fn end(mut self, date: NaiveDate) -> Self {
        self.observation_end = Some(date);
        self
    }

    pub fn frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }
}

impl fmt::Display for SeriesWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observations")?;
        if let Some(start) = self.observation_start {
            write!(f, " from {}", start)?;
        }
        if let Some(end) = self.observation_end {
            write!(f, " to {}", end)?;
        }
        if let Some(freq) = &self.frequency {
            write!(f, " ({})", freq)?;
        }
        Ok(())
    }
}

/// FRED series observations fetcher.
pub struct FredFetcher {
    http: Arc<dyn HttpFetch>,
    api_key: Option<String>,
    rate_limit: RateLimit,
}

impl FredFetcher {
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        let http = Arc::new(HttpClient::new(config.request_timeout)?);
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: &IngestConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http,
            api_key: config.fred_key.clone(),
            rate_limit: RateLimit::new(5, RATE_LIMIT_DELAY)
                .with_pause_override(config.rate_limit_delay),
        }
    }

    /// Query parameters for one series. Unset window fields are omitted.
    pub fn build_params(
        &self,
        series_id: &str,
        window: &SeriesWindow,
    ) -> Result<QueryParams, IngestError> {
        let api_key = require(&self.api_key, FRED_KEY_VAR)?;
        let mut params = QueryParams::new()
            .with("series_id", series_id)
            .with("api_key", api_key)
            .with("file_type", "json");

        if let Some(start) = window.observation_start {
            params.insert("observation_start", start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = window.observation_end {
            params.insert("observation_end", end.format("%Y-%m-%d").to_string());
        }
        if let Some(freq) = &window.frequency {
            params.insert("frequency", freq.as_str());
        }

        Ok(params)
    }

    /// Fetch one series.
    pub async fn fetch_series(
        &self,
        series_id: &str,
        window: &SeriesWindow,
    ) -> Result<Validated, IngestError> {
        self.fetch(series_id, window).await
    }

    /// Fetch several series with the same window.
    pub async fn fetch_batch_series<S>(
        &self,
        series_ids: &[S],
        window: &SeriesWindow,
    ) -> Result<BatchResult, IngestError>
    where
        S: AsRef<str> + Sync,
    {
        fetch_batch(self, series_ids, window).await
    }
}

#[async_trait]
impl FetchAdapter for FredFetcher {
    type Selector = SeriesWindow;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit
    }

    fn build_request(
        &self,
        entity: &str,
        selector: &Self::Selector,
    ) -> Result<ApiRequest, IngestError> {
        Ok(ApiRequest::new(BASE_URL, self.build_params(entity, selector)?))
    }

    async fn perform(&self, request: &ApiRequest) -> Result<Value, IngestError> {
        self.http.get_json(PROVIDER_ID, request).await
    }

    fn validate(&self, raw: Value, entity: &str) -> Result<Validated, IngestError> {
        let mut body = expect_object(PROVIDER_ID, raw)?;

        if let Some(msg) = body.get("error_message").and_then(Value::as_str) {
            warn!("FRED error for {}: {}", entity, msg);
            return Ok(Validated::no_data(format!("error_message: {}", msg)));
        }

        match body.remove("observations") {
            Some(Value::Array(rows)) if !rows.is_empty() => {
                debug!("FRED: {} observations for {}", rows.len(), entity);
                Ok(Validated::Payload(Value::Array(rows)))
            }
            Some(Value::Array(_)) => {
                warn!("FRED returned no observations for {}", entity);
                Ok(Validated::no_data("Empty observations"))
            }
            Some(other) => Err(IngestError::parse(
                PROVIDER_ID,
                format!("Expected observations to be an array, got {}", other),
            )),
            None => {
                warn!("FRED response for {} has no observations", entity);
                Ok(Validated::no_data("Missing observations"))
            }
        }
    }
}
