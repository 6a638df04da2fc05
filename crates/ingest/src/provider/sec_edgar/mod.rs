//! SEC EDGAR.
//!
//! This module provides:
//! - Requester identity validation ([`SecEdgarCredentials`])
//! - Filing downloads ([`download_filings`], [`EdgarDownloader`])
//! - JSON endpoints keyed by CIK ([`SecEdgarFetcher`]): submissions and
//!   XBRL company facts
//!
//! SEC asks clients to stay under 10 requests per second and to identify
//! themselves in the User-Agent.

mod credentials;
mod downloader;

pub use credentials::{
    ensure_download_dir, validate_company_name, validate_email_address, SecEdgarCredentials,
};
pub use downloader::{
    download_filings, download_filings_with_config, EdgarDownloader, FilingDownloader,
    FILINGS_DIR,
};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::batch::fetch_batch;
use crate::config::IngestConfig;
use crate::errors::IngestError;
use crate::http::{HttpClient, HttpFetch};
use crate::models::{ApiRequest, BatchResult, Validated};
use crate::provider::{expect_object, FetchAdapter, RateLimit};

const PROVIDER_ID: &str = "SEC_EDGAR";
const SUBMISSIONS_URL: &str = "https://data.sec.gov/submissions";
const COMPANY_FACTS_URL: &str = "https://data.sec.gov/api/xbrl/companyfacts";

const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Zero-pad a CIK to the 10 digits EDGAR URLs use.
pub fn normalize_cik(cik: &str) -> Result<String, IngestError> {
    let cik = cik.trim();
    if cik.is_empty() || cik.len() > 10 || !cik.chars().all(|c| c.is_ascii_digit()) {
        return Err(IngestError::InvalidArgument(format!(
            "Invalid CIK: {:?} (expected 1-10 digits)",
            cik
        )));
    }
    Ok(format!("{:0>10}", cik))
}

/// EDGAR JSON endpoints keyed by CIK.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecEdgarEndpoint {
    Submissions,
    CompanyFacts,
}

impl SecEdgarEndpoint {
    pub const ALL: [SecEdgarEndpoint; 2] = [Self::Submissions, Self::CompanyFacts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submissions => "SUBMISSIONS",
            Self::CompanyFacts => "COMPANY_FACTS",
        }
    }

    fn url(&self, padded_cik: &str) -> String {
        let base = match self {
            Self::Submissions => SUBMISSIONS_URL,
            Self::CompanyFacts => COMPANY_FACTS_URL,
        };
        format!("{}/CIK{}.json", base, padded_cik)
    }
}

impl fmt::Display for SecEdgarEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecEdgarEndpoint {
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

/// Fetcher for EDGAR JSON endpoints.
///
/// The requester identity is validated when the first request is built; the
/// HTTP client carrying it as User-Agent is created on first use.
pub struct SecEdgarFetcher {
    name: Option<String>,
    email: Option<String>,
    timeout: Duration,
    http: OnceCell<Arc<dyn HttpFetch>>,
    rate_limit: RateLimit,
}

impl SecEdgarFetcher {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            name: config.sec_edgar_name.clone(),
            email: config.sec_edgar_email.clone(),
            timeout: config.request_timeout,
            http: OnceCell::new(),
            rate_limit: RateLimit::new(5, RATE_LIMIT_DELAY)
                .with_pause_override(config.rate_limit_delay),
        }
    }

    pub fn with_http(config: &IngestConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http: OnceCell::from(http),
            ..Self::new(config)
        }
    }

    fn credentials(&self) -> Result<SecEdgarCredentials, IngestError> {
        SecEdgarCredentials::new(self.name.as_deref(), self.email.as_deref())
    }

    async fn http(&self) -> Result<&Arc<dyn HttpFetch>, IngestError> {
        self.http
            .get_or_try_init(|| async move {
                let credentials = self.credentials()?;
                let client = HttpClient::with_user_agent(self.timeout, &credentials.user_agent())?;
                Ok::<Arc<dyn HttpFetch>, IngestError>(Arc::new(client))
            })
            .await
    }

    /// Fetch one endpoint for several CIKs.
    pub async fn fetch_batch_ciks<S>(
        &self,
        ciks: &[S],
        endpoint: SecEdgarEndpoint,
    ) -> Result<BatchResult, IngestError>
    where
        S: AsRef<str> + Sync,
    {
        fetch_batch(self, ciks, &endpoint).await
    }
}

#[async_trait]
impl FetchAdapter for SecEdgarFetcher {
    type Selector = SecEdgarEndpoint;

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
        self.credentials()?;
        Ok(ApiRequest::get(selector.url(&normalize_cik(entity)?)))
    }

    async fn perform(&self, request: &ApiRequest) -> Result<Value, IngestError> {
        self.http().await?.get_json(PROVIDER_ID, request).await
    }

    fn validate(&self, raw: Value, entity: &str) -> Result<Validated, IngestError> {
        let body = expect_object(PROVIDER_ID, raw)?;

        if body.is_empty() {
            warn!("SEC EDGAR returned an empty object for CIK {}", entity);
            return Ok(Validated::no_data("Empty response"));
        }

        if let Some(filings) = body.get("filings") {
            let recent = filings
                .pointer("/recent/accessionNumber")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            if recent == 0 {
                warn!("No recent filings for CIK {}", entity);
                return Ok(Validated::no_data("No recent filings"));
            }
        }

        if let Some(facts) = body.get("facts") {
            if facts.as_object().map_or(true, |f| f.is_empty()) {
                warn!("No XBRL facts for CIK {}", entity);
                return Ok(Validated::no_data("No facts"));
            }
        }

        debug!("SEC EDGAR: validated response for CIK {}", entity);
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
            sec_edgar_name: Some("Bronze Research".to_string()),
            sec_edgar_email: Some("ops@bronze.io".to_string()),
            rate_limit_delay: Some(Duration::ZERO),
            ..IngestConfig::default()
        }
    }

    #[test]
    fn test_normalize_cik() {
        assert_eq!(normalize_cik("320193").unwrap(), "0000320193");
        assert_eq!(normalize_cik("0000320193").unwrap(), "0000320193");
        assert_eq!(normalize_cik(" 1 ").unwrap(), "0000000001");

        for bad in ["", "AAPL", "12345678901", "-1", "32 0193"] {
            let err = normalize_cik(bad).unwrap_err();
            assert!(matches!(err, IngestError::InvalidArgument(_)), "{bad}");
        }
    }

    #[test]
    fn test_build_request_urls() {
        let fetcher = SecEdgarFetcher::with_http(&config(), Arc::new(StubHttp::new(vec![])));

        let request = fetcher
            .build_request("320193", &SecEdgarEndpoint::Submissions)
            .unwrap();
        assert_eq!(request.url, "https://data.sec.gov/submissions/CIK0000320193.json");
        assert!(request.params.is_empty());

        let request = fetcher
            .build_request("789019", &SecEdgarEndpoint::CompanyFacts)
            .unwrap();
        assert_eq!(
            request.url,
            "https://data.sec.gov/api/xbrl/companyfacts/CIK0000789019.json"
        );
    }

    #[test]
    fn test_missing_identity_fails_on_first_request() {
        let fetcher = SecEdgarFetcher::new(&IngestConfig::default());
        let err = fetcher
            .build_request("320193", &SecEdgarEndpoint::Submissions)
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingCredential { ref var } if var == "SEC_EDGAR_NAME"));
    }

    #[test]
    fn test_endpoint_parsing() {
        assert_eq!(
            "COMPANY_FACTS".parse::<SecEdgarEndpoint>().unwrap(),
            SecEdgarEndpoint::CompanyFacts
        );
        assert!("FILINGS".parse::<SecEdgarEndpoint>().is_err());
    }

    #[tokio::test]
    async fn test_batch_outcomes() {
        let stub = Arc::new(StubHttp::new(vec![
            Reply::json(json!({
                "cik": "320193",
                "filings": {"recent": {"accessionNumber": ["0000320193-24-000123"], "form": ["10-K"]}}
            })),
            Reply::json(json!({"cik": "1", "filings": {"recent": {"accessionNumber": []}}})),
            Reply::Status(404),
        ]));
        let fetcher = SecEdgarFetcher::with_http(&config(), stub);

        let result = fetcher
            .fetch_batch_ciks(&["320193", "1", "999"], SecEdgarEndpoint::Submissions)
            .await
            .unwrap();

        assert!(result.get("320193").unwrap().is_data());
        assert!(result.get("1").unwrap().is_empty());
        assert!(result.get("999").unwrap().is_failed());
    }

    #[tokio::test]
    async fn test_empty_facts_is_no_data() {
        let stub = Arc::new(StubHttp::new(vec![Reply::json(
            json!({"cik": 1, "entityName": "Shell Co", "facts": {}}),
        )]));
        let fetcher = SecEdgarFetcher::with_http(&config(), stub);

        let validated = fetcher
            .fetch("1", &SecEdgarEndpoint::CompanyFacts)
            .await
            .unwrap();
        assert!(!validated.is_payload());
    }

    #[tokio::test]
    async fn test_invalid_cik_aborts_batch() {
        let stub = Arc::new(StubHttp::always(json!({"cik": "1"})));
        let fetcher = SecEdgarFetcher::with_http(&config(), stub.clone());

        let err = fetcher
            .fetch_batch_ciks(&["AAPL"], SecEdgarEndpoint::Submissions)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::InvalidArgument(_)));
        assert!(stub.requests().is_empty());
    }
}
