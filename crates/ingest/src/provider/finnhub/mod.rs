//! Finnhub fetcher.
//!
//! This module provides:
//! - Market holidays via /stock/market-holiday
//! - Company profiles via /stock/profile2
//! - Company and market news via /company-news and /news (see [`news`])
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

mod news;

pub use news::{aggregate_news, normalize_article, NewsRequest, NewsSource, RawArticle};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::batch::fetch_batch;
use crate::config::{require, IngestConfig, FINNHUB_KEY_VAR};
use crate::errors::IngestError;
use crate::http::{HttpClient, HttpFetch};
use crate::models::{ApiRequest, BatchResult, QueryParams, Validated};
use crate::provider::{expect_object, FetchAdapter, RateLimit};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Pause after every 5 entities. Finnhub allows 60 calls per minute.
const RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

// ============================================================================
// Endpoints
// ============================================================================

/// Finnhub endpoints driven through the batch orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinnhubEndpoint {
    /// Entity is an exchange code, e.g. "US".
    MarketHoliday,
    /// Entity is a stock symbol.
    CompanyProfile,
}

impl FinnhubEndpoint {
    pub const ALL: [FinnhubEndpoint; 2] = [Self::MarketHoliday, Self::CompanyProfile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketHoliday => "MARKET_HOLIDAY",
            Self::CompanyProfile => "COMPANY_PROFILE",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::MarketHoliday => "/stock/market-holiday",
            Self::CompanyProfile => "/stock/profile2",
        }
    }

    fn entity_param(&self) -> &'static str {
        match self {
            Self::MarketHoliday => "exchange",
            Self::CompanyProfile => "symbol",
        }
    }
}

impl fmt::Display for FinnhubEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinnhubEndpoint {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|e| e.as_str()).collect();
                IngestError::InvalidArgument(format!(
                    "Unsupported endpoint: {}. Valid options: {:?}",
                    s, valid
                ))
            })
    }
}

// ============================================================================
// FinnhubFetcher
// ============================================================================

/// Finnhub fetcher. Also the production [`NewsSource`].
pub struct FinnhubFetcher {
    http: Arc<dyn HttpFetch>,
    api_key: Option<String>,
    rate_limit: RateLimit,
}

impl FinnhubFetcher {
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        let http = Arc::new(HttpClient::new(config.request_timeout)?);
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: &IngestConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http,
            api_key: config.finnhub_key.clone(),
            rate_limit: RateLimit::new(5, RATE_LIMIT_DELAY)
                .with_pause_override(config.rate_limit_delay),
        }
    }

    /// Build a request for `path`, appending the token to `params`.
    fn request(&self, path: &str, mut params: QueryParams) -> Result<ApiRequest, IngestError> {
        let token = require(&self.api_key, FINNHUB_KEY_VAR)?;
        params.insert("token", token);
        Ok(ApiRequest::new(format!("{}{}", BASE_URL, path), params))
    }

    /// Fetch holiday information for one exchange. Errors propagate.
    pub async fn market_holiday(&self, exchange: &str) -> Result<Validated, IngestError> {
        self.fetch(exchange, &FinnhubEndpoint::MarketHoliday).await
    }

    /// Fetch holiday information for several exchanges.
    pub async fn market_holidays<S>(&self, exchanges: &[S]) -> Result<BatchResult, IngestError>
    where
        S: AsRef<str> + Sync,
    {
        fetch_batch(self, exchanges, &FinnhubEndpoint::MarketHoliday).await
    }

    /// Fetch company profiles for several symbols.
    pub async fn company_profiles<S>(&self, symbols: &[S]) -> Result<BatchResult, IngestError>
    where
        S: AsRef<str> + Sync,
    {
        fetch_batch(self, symbols, &FinnhubEndpoint::CompanyProfile).await
    }
}

#[async_trait]
impl FetchAdapter for FinnhubFetcher {
    type Selector = FinnhubEndpoint;

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
        let params = QueryParams::new().with(selector.entity_param(), entity);
        self.request(selector.path(), params)
    }

    async fn perform(&self, request: &ApiRequest) -> Result<Value, IngestError> {
        self.http.get_json(PROVIDER_ID, request).await
    }

    fn validate(&self, raw: Value, entity: &str) -> Result<Validated, IngestError> {
        let body = expect_object(PROVIDER_ID, raw)?;

        if let Some(msg) = body.get("error").and_then(Value::as_str) {
            warn!("Finnhub error for {}: {}", entity, msg);
            return Ok(Validated::no_data(format!("error: {}", msg)));
        }

        // Unknown symbols come back as {}
        if body.is_empty() {
            warn!("Finnhub returned an empty object for {}", entity);
            return Ok(Validated::no_data("Empty response"));
        }

        if let Some(Value::Array(rows)) = body.get("data") {
            if rows.is_empty() {
                warn!("Finnhub returned no rows for {}", entity);
                return Ok(Validated::no_data("Empty data list"));
            }
        }

        debug!("Finnhub: validated response for {}", entity);
        Ok(Validated::Payload(Value::Object(body)))
    }
}
