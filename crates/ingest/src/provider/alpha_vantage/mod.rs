//! Alpha Vantage fetcher.
//!
//! Supported functions:
//! - `HISTORICAL_OPTIONS` - full options chain history for a symbol
//! - `OVERVIEW` - company fundamentals
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.
//! Soft failures (bad symbol, rate-limit notes, premium-only notices) arrive
//! with HTTP 200 and one of the `Error Message` / `Note` / `Information` keys.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::batch::fetch_batch;
use crate::config::{require, IngestConfig, ALPHA_VANTAGE_KEY_VAR};
use crate::errors::IngestError;
use crate::http::{HttpClient, HttpFetch};
use crate::models::{ApiRequest, BatchResult, QueryParams, Validated};
use crate::provider::{expect_object, FetchAdapter, RateLimit};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Pause after every 5 symbols.
const RATE_LIMIT_DELAY: Duration = Duration::from_secs(15);

/// Alpha Vantage `function` values this fetcher supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaVantageFunction {
    HistoricalOptions,
    Overview,
}

impl AlphaVantageFunction {
    pub const ALL: [AlphaVantageFunction; 2] = [Self::HistoricalOptions, Self::Overview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HistoricalOptions => "HISTORICAL_OPTIONS",
            Self::Overview => "OVERVIEW",
        }
    }
}

impl fmt::Display for AlphaVantageFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlphaVantageFunction {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                IngestError::InvalidArgument(format!(
                    "Unsupported function: {}. Valid options: {:?}",
                    s, valid
                ))
            })
    }
}

/// Alpha Vantage fetcher.
pub struct AlphaVantageFetcher {
    http: Arc<dyn HttpFetch>,
    api_key: Option<String>,
    rate_limit: RateLimit,
}

impl AlphaVantageFetcher {
    /// Create a fetcher backed by a real HTTP client.
    ///
    /// A missing API key is not reported here; it surfaces on the first request.
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        let http = Arc::new(HttpClient::new(config.request_timeout)?);
        Ok(Self::with_http(config, http))
    }

    /// Create a fetcher over any [`HttpFetch`] implementation.
    pub fn with_http(config: &IngestConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http,
            api_key: config.alpha_vantage_key.clone(),
            rate_limit: RateLimit::new(5, RATE_LIMIT_DELAY)
                .with_pause_override(config.rate_limit_delay),
        }
    }

    /// Query parameters for `symbol` and `function`.
    pub fn build_params(
        &self,
        symbol: &str,
        function: AlphaVantageFunction,
    ) -> Result<QueryParams, IngestError> {
        let api_key = require(&self.api_key, ALPHA_VANTAGE_KEY_VAR)?;
        let mut params = QueryParams::new()
            .with("function", function.as_str())
            .with("symbol", symbol)
            .with("apikey", api_key);

        if function == AlphaVantageFunction::HistoricalOptions {
            params.insert("outputsize", "full");
        }

        Ok(params)
    }

    /// Fetch one symbol. `Ok(NoData)` when Alpha Vantage has nothing usable.
    pub async fn fetch_data(
        &self,
        symbol: &str,
        function: AlphaVantageFunction,
    ) -> Result<Validated, IngestError> {
        self.fetch(symbol, &function).await
    }

    /// Fetch many symbols, pausing after every 5.
    pub async fn fetch_batch_data<S>(
        &self,
        symbols: &[S],
        function: AlphaVantageFunction,
    ) -> Result<BatchResult, IngestError>
    where
        S: AsRef<str> + Sync,
    {
        fetch_batch(self, symbols, &function).await
    }

    fn is_rate_limit_message(msg: &str) -> bool {
        msg.contains("API call frequency") || msg.contains("rate limit")
    }
}

#[async_trait]
impl FetchAdapter for AlphaVantageFetcher {
    type Selector = AlphaVantageFunction;

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
        Ok(ApiRequest::new(BASE_URL, self.build_params(entity, *selector)?))
    }

    async fn perform(&self, request: &ApiRequest) -> Result<Value, IngestError> {
        self.http.get_json(PROVIDER_ID, request).await
    }

    fn validate(&self, raw: Value, entity: &str) -> Result<Validated, IngestError> {
        let body = expect_object(PROVIDER_ID, raw)?;

        if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
            error!("Error fetching data for {}: {}", entity, msg);
            return Ok(Validated::no_data(format!("Error Message: {}", msg)));
        }

        // "Note" usually indicates rate limiting
        if let Some(msg) = body.get("Note").and_then(Value::as_str) {
            warn!("Rate limit hit for {}: {}", entity, msg);
            return Ok(Validated::no_data(format!("Note: {}", msg)));
        }

        // "Information" is used both for rate limits and premium-only endpoints
        if let Some(msg) = body.get("Information").and_then(Value::as_str) {
            if Self::is_rate_limit_message(msg) {
                warn!("Rate limit hit for {}: {}", entity, msg);
            } else {
                warn!("Alpha Vantage info for {}: {}", entity, msg);
            }
            return Ok(Validated::no_data(format!("Information: {}", msg)));
        }

        if body.is_empty() {
            warn!("Alpha Vantage returned an empty object for {}", entity);
            return Ok(Validated::no_data("Empty response"));
        }

        // HISTORICAL_OPTIONS wraps rows in "data"
        if let Some(Value::Array(rows)) = body.get("data") {
            if rows.is_empty() {
                warn!("Alpha Vantage returned no rows for {}", entity);
                return Ok(Validated::no_data("Empty data list"));
            }
        }

        debug!("Alpha Vantage: validated response for {}", entity);
        Ok(Validated::Payload(Value::Object(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::{Reply, StubHttp};
    use serde_json::json;

    fn config() -> IngestConfig {
        IngestConfig {
            alpha_vantage_key: Some("alphakey".to_string()),
            rate_limit_delay: Some(Duration::ZERO),
            ..IngestConfig::default()
        }
    }

    fn fetcher(stub: Arc<StubHttp>) -> AlphaVantageFetcher {
        AlphaVantageFetcher::with_http(&config(), stub)
    }

    #[test]
    fn test_historical_options_params() {
        let fetcher = fetcher(Arc::new(StubHttp::new(vec![])));
        let params = fetcher
            .build_params("TEST", AlphaVantageFunction::HistoricalOptions)
            .unwrap();
        let expected = QueryParams::new()
            .with("function", "HISTORICAL_OPTIONS")
            .with("symbol", "TEST")
            .with("apikey", "alphakey")
            .with("outputsize", "full");
        assert_eq!(params, expected);
    }

    #[test]
    fn test_overview_params() {
        let fetcher = fetcher(Arc::new(StubHttp::new(vec![])));
        let params = fetcher
            .build_params("TEST", AlphaVantageFunction::Overview)
            .unwrap();
        let expected = QueryParams::new()
            .with("function", "OVERVIEW")
            .with("symbol", "TEST")
            .with("apikey", "alphakey");
        assert_eq!(params, expected);
    }

    #[test]
    fn test_every_function_carries_key_and_selector() {
        let fetcher = fetcher(Arc::new(StubHttp::new(vec![])));
        for function in AlphaVantageFunction::ALL {
            let params = fetcher.build_params("IBM", function).unwrap();
            assert_eq!(params.get("apikey"), Some("alphakey"));
            assert_eq!(params.get("function"), Some(function.as_str()));
        }
    }

    #[test]
    fn test_unsupported_function_is_invalid_argument() {
        let err = "TIME_SERIES_DAILY".parse::<AlphaVantageFunction>().unwrap_err();
        assert!(matches!(err, IngestError::InvalidArgument(_)));
        assert!(err.to_string().contains("HISTORICAL_OPTIONS"));

        assert_eq!(
            "OVERVIEW".parse::<AlphaVantageFunction>().unwrap(),
            AlphaVantageFunction::Overview
        );
    }

    #[test]
    fn test_missing_key_fails_on_first_use_only() {
        // Construction succeeds without a key.
        let fetcher = AlphaVantageFetcher::with_http(
            &IngestConfig::default(),
            Arc::new(StubHttp::new(vec![])),
        );
        let err = fetcher
            .build_params("IBM", AlphaVantageFunction::Overview)
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(ALPHA_VANTAGE_KEY_VAR));
    }

    #[test]
    fn test_rate_limit() {
        let fetcher = AlphaVantageFetcher::with_http(
            &IngestConfig::default(),
            Arc::new(StubHttp::new(vec![])),
        );
        assert_eq!(fetcher.rate_limit(), RateLimit::new(5, Duration::from_secs(15)));
    }

    #[tokio::test]
    async fn test_fetch_data_success_sends_expected_request() {
        let stub = Arc::new(StubHttp::new(vec![Reply::json(
            json!({"endpoint": "Historical Options", "message": "success", "data": [{"contractID": "IBM250117C00100000"}]}),
        )]));
        let fetcher = fetcher(stub.clone());

        let validated = fetcher
            .fetch_data("IBM", AlphaVantageFunction::HistoricalOptions)
            .await
            .unwrap();

        assert!(validated.is_payload());
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, BASE_URL);
        assert_eq!(
            requests[0].params,
            fetcher
                .build_params("IBM", AlphaVantageFunction::HistoricalOptions)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_soft_failures_are_no_data() {
        let cases = [
            json!({"Error Message": "Invalid API call."}),
            json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"}),
            json!({"Information": "This is a premium endpoint."}),
            json!({}),
            json!({"endpoint": "Historical Options", "message": "success", "data": []}),
        ];

        for body in cases {
            let fetcher = fetcher(Arc::new(StubHttp::new(vec![Reply::json(body.clone())])));
            let validated = fetcher
                .fetch_data("TEST", AlphaVantageFunction::HistoricalOptions)
                .await
                .unwrap();
            assert!(!validated.is_payload(), "{body}");
        }
    }

    #[tokio::test]
    async fn test_http_error_and_invalid_json_are_errors() {
        let fetcher = fetcher(Arc::new(StubHttp::new(vec![
            Reply::Status(404),
            Reply::Body("not json".to_string()),
            Reply::Timeout,
        ])));

        let err = fetcher
            .fetch_data("TEST", AlphaVantageFunction::Overview)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Http { status: 404, .. }));

        let err = fetcher
            .fetch_data("TEST", AlphaVantageFunction::Overview)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));

        let err = fetcher
            .fetch_data("TEST", AlphaVantageFunction::Overview)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_batch_records_partial_failure() {
        let stub = Arc::new(StubHttp::new(vec![
            Reply::json(json!({"Symbol": "AAPL", "Name": "Apple Inc"})),
            Reply::json(json!({"Error Message": "Invalid API call."})),
            Reply::Status(500),
        ]));
        let fetcher = fetcher(stub);

        let result = fetcher
            .fetch_batch_data(&["AAPL", "INVALID", "GOOG"], AlphaVantageFunction::Overview)
            .await
            .unwrap();

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["AAPL", "INVALID", "GOOG"]);
        assert_eq!(
            result.get("AAPL").unwrap().payload(),
            Some(&json!({"Symbol": "AAPL", "Name": "Apple Inc"}))
        );
        assert!(result.get("INVALID").unwrap().is_empty());
        assert!(result.get("GOOG").unwrap().is_failed());
    }

    #[tokio::test]
    async fn test_batch_without_key_aborts() {
        let stub = Arc::new(StubHttp::new(vec![]));
        let fetcher = AlphaVantageFetcher::with_http(&IngestConfig::default(), stub.clone());

        let err = fetcher
            .fetch_batch_data(&["AAPL", "MSFT"], AlphaVantageFunction::Overview)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::MissingCredential { .. }));
        assert!(stub.requests().is_empty());
    }
}
