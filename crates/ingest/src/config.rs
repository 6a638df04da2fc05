//! Process-wide configuration, resolved once at startup.
//!
//! Credentials are captured as `Option`s: a missing key is not an error until a
//! fetcher actually needs it, so loading configuration never fails.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::errors::IngestError;

pub const ALPHA_VANTAGE_KEY_VAR: &str = "API_ALPHA_VANTAGE_KEY";
pub const FINNHUB_KEY_VAR: &str = "API_FINHUB_NEWS_KEY";
pub const FRED_KEY_VAR: &str = "API_FREDAPI_KEY";
pub const SEC_EDGAR_NAME_VAR: &str = "SEC_EDGAR_NAME";
pub const SEC_EDGAR_EMAIL_VAR: &str = "SEC_EDGAR_EMAIL";
pub const SEC_EDGAR_DOWNLOAD_PATH_VAR: &str = "SEC_EDGAR_DOWNLOAD_PATH";
pub const REQUEST_TIMEOUT_VAR: &str = "BRONZE_REQUEST_TIMEOUT_SECS";
pub const RATE_LIMIT_DELAY_VAR: &str = "BRONZE_RATE_LIMIT_DELAY_SECS";

/// Timeout applied to every HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where SEC filings land when `SEC_EDGAR_DOWNLOAD_PATH` is unset.
pub const DEFAULT_DOWNLOAD_PATH: &str = "data/bronze/sec_filings";

#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub alpha_vantage_key: Option<String>,
    pub finnhub_key: Option<String>,
    pub fred_key: Option<String>,
    pub sec_edgar_name: Option<String>,
    pub sec_edgar_email: Option<String>,
    pub download_dir: PathBuf,
    pub request_timeout: Duration,
    /// Overrides every vendor's throttle pause when set.
    pub rate_limit_delay: Option<Duration>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_key: None,
            finnhub_key: None,
            fred_key: None,
            sec_edgar_name: None,
            sec_edgar_email: None,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_PATH),
            request_timeout: DEFAULT_TIMEOUT,
            rate_limit_delay: None,
        }
    }
}

impl IngestConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = parse_secs(REQUEST_TIMEOUT_VAR, non_blank(REQUEST_TIMEOUT_VAR))
            .unwrap_or(DEFAULT_TIMEOUT);
        let rate_limit_delay = parse_secs(RATE_LIMIT_DELAY_VAR, non_blank(RATE_LIMIT_DELAY_VAR));
        let download_dir = non_blank(SEC_EDGAR_DOWNLOAD_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_PATH));

        Self {
            alpha_vantage_key: non_blank(ALPHA_VANTAGE_KEY_VAR),
            finnhub_key: non_blank(FINNHUB_KEY_VAR),
            fred_key: non_blank(FRED_KEY_VAR),
            sec_edgar_name: non_blank(SEC_EDGAR_NAME_VAR),
            sec_edgar_email: non_blank(SEC_EDGAR_EMAIL_VAR),
            download_dir,
            request_timeout,
            rate_limit_delay,
        }
    }
}

/// Resolve an optional credential, failing with a configuration error naming
/// the variable.
pub(crate) fn require<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str, IngestError> {
    value.as_deref().ok_or_else(|| IngestError::MissingCredential {
        var: var.to_string(),
    })
}

fn parse_secs(var: &str, raw: Option<String>) -> Option<Duration> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!("Ignoring {}={:?}: expected whole seconds", var, raw);
            None
        }
    }
}
