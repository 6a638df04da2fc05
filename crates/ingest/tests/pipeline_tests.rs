//! End-to-end tests of the public fetchers over a fake HTTP layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bronze_ingest::provider::sec_edgar::ensure_download_dir;
use bronze_ingest::{
    aggregate_news, download_filings, AlphaVantageFetcher, AlphaVantageFunction, ApiRequest,
    FilingDownloader, FinnhubFetcher, FredFetcher, HttpFetch, IngestConfig, IngestError,
    NewsRequest, SeriesWindow,
};
use serde_json::json;

// =============================================================================
// Fake HTTP
// =============================================================================

/// Answers by the value of one query parameter; unknown values get a 500.
struct RoutedHttp {
    key: &'static str,
    routes: HashMap<String, String>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl RoutedHttp {
    fn new(key: &'static str, routes: &[(&str, serde_json::Value)]) -> Arc<Self> {
        Arc::new(Self {
            key,
            routes: routes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl HttpFetch for RoutedHttp {
    async fn get_text(&self, provider: &str, request: &ApiRequest) -> Result<String, IngestError> {
        self.seen.lock().unwrap().push(request.clone());
        let value = request.params.get(self.key).unwrap_or_default();
        self.routes
            .get(value)
            .cloned()
            .ok_or_else(|| IngestError::Http {
                provider: provider.to_string(),
                status: 500,
            })
    }
}

fn config() -> IngestConfig {
    IngestConfig::from_lookup(|name| match name {
        "API_ALPHA_VANTAGE_KEY" => Some("alphakey".to_string()),
        "API_FINHUB_NEWS_KEY" => Some("finnkey".to_string()),
        "API_FREDAPI_KEY" => Some("fredkey".to_string()),
        "BRONZE_RATE_LIMIT_DELAY_SECS" => Some("0".to_string()),
        _ => None,
    })
}

// =============================================================================
// Batches
// =============================================================================

#[tokio::test]
async fn alpha_vantage_batch_serializes_per_symbol_outcomes() {
    let http = RoutedHttp::new(
        "symbol",
        &[
            ("IBM", json!({"Symbol": "IBM", "Name": "International Business Machines"})),
            ("BAD", json!({"Error Message": "Invalid API call."})),
            ("LATE", json!({"Note": "Our standard API call frequency is 5 calls per minute"})),
        ],
    );
    let fetcher = AlphaVantageFetcher::with_http(&config(), http.clone());

    let result = fetcher
        .fetch_batch_data(&["IBM", "BAD", "LATE", "DOWN"], AlphaVantageFunction::Overview)
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["IBM"]["status"], "data");
    assert_eq!(value["IBM"]["payload"]["Symbol"], "IBM");
    assert_eq!(value["BAD"]["status"], "empty");
    assert_eq!(value["LATE"]["status"], "empty");
    assert_eq!(value["DOWN"]["status"], "failed");
    assert_eq!(value["DOWN"]["error"], "HTTP 500 from ALPHA_VANTAGE");

    let order: Vec<&str> = result.keys().collect();
    assert_eq!(order, vec!["IBM", "BAD", "LATE", "DOWN"]);

    for request in http.seen.lock().unwrap().iter() {
        assert_eq!(request.params.get("apikey"), Some("alphakey"));
        assert!(!request.to_string().contains("alphakey"));
    }
}

#[tokio::test(start_paused = true)]
async fn default_throttle_applies_without_override() {
    let config = IngestConfig::from_lookup(|name| {
        (name == "API_FREDAPI_KEY").then(|| "fredkey".to_string())
    });
    let body = json!({"observations": [{"date": "2020-01-01", "value": "1.0"}]});
    let ids = ["A", "B", "C", "D", "E", "F", "G"];
    let routes: Vec<(&str, serde_json::Value)> = ids.iter().map(|id| (*id, body.clone())).collect();
    let fetcher = FredFetcher::with_http(&config, RoutedHttp::new("series_id", &routes));

    let start = tokio::time::Instant::now();
    let result = fetcher
        .fetch_batch_series(&ids, &SeriesWindow::new())
        .await
        .unwrap();

    assert_eq!(result.succeeded(), 7);
    assert_eq!(result.throttle_pauses(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test]
async fn missing_key_aborts_only_when_used() {
    let config = IngestConfig::from_lookup(|_| None);
    let http = RoutedHttp::new("symbol", &[]);

    // Construction succeeds.
    let fetcher = AlphaVantageFetcher::with_http(&config, http.clone());
    let err = fetcher
        .fetch_batch_data(&["IBM"], AlphaVantageFunction::HistoricalOptions)
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("API_ALPHA_VANTAGE_KEY"));
    assert!(http.seen.lock().unwrap().is_empty());
}

// =============================================================================
// News
// =============================================================================

#[tokio::test]
async fn news_report_from_finnhub() {
    let long_summary = "s".repeat(700);
    let http = RoutedHttp::new(
        "symbol",
        &[(
            "AAPL",
            json!([
                {"id": 1, "headline": "Apple ships", "summary": long_summary, "datetime": 1_700_000_000, "sentiment": 0.456},
                {"id": 2, "headline": "", "summary": "dropped"}
            ]),
        )],
    );
    let fetcher = FinnhubFetcher::with_http(&config(), http);
    let request = NewsRequest::new(["AAPL", "TSLA"]).with_limits(10, 5);

    let report = aggregate_news(&fetcher, &request).await.unwrap();

    let aapl = report.company("AAPL").unwrap();
    assert_eq!(aapl.count, 1);
    assert_eq!(aapl.articles[0].summary.len(), 503);
    assert_eq!(aapl.articles[0].sentiment, 0.46);

    let tsla = report.company("TSLA").unwrap();
    assert_eq!(tsla.count, 0);
    assert!(tsla.error.as_deref().unwrap().contains("HTTP 500"));

    // The market feed request has no symbol and is routed to a 500 as well.
    assert!(report.market_news.is_empty());
    assert!(report.market_news_error.is_some());
    assert_eq!(report.metadata.symbol_count, 2);
}

// =============================================================================
// Filings
// =============================================================================

struct CountingDownloader {
    root: std::path::PathBuf,
    calls: Mutex<usize>,
}

#[async_trait]
impl FilingDownloader for CountingDownloader {
    async fn get(&self, form: &str, ticker: &str, limit: usize) -> Result<usize, IngestError> {
        *self.calls.lock().unwrap() += 1;
        if ticker == "GONE" {
            return Err(IngestError::Http {
                provider: "SEC_EDGAR".to_string(),
                status: 404,
            });
        }
        let dir = self.root.join(ticker).join(form);
        std::fs::create_dir_all(&dir)?;
        for i in 0..limit {
            std::fs::write(dir.join(format!("{i}.htm")), "<html></html>")?;
        }
        Ok(limit)
    }
}

#[tokio::test]
async fn filings_into_fresh_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let root = ensure_download_dir(&tmp.path().join("data/bronze/sec_filings")).unwrap();
    let downloader = CountingDownloader {
        root: root.clone(),
        calls: Mutex::new(0),
    };

    let report = download_filings(&downloader, &["AAPL", "GONE"], &["10-K", "10-Q"], 2)
        .await
        .unwrap();

    assert_eq!(*downloader.calls.lock().unwrap(), 4);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.documents, 4);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.ticker == "GONE"));
    assert!(root.join("AAPL/10-Q/1.htm").is_file());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["failures"][0]["form_type"], "10-K");
}
