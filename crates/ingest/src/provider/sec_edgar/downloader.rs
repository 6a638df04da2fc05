//! SEC filing downloads.
//!
//! [`download_filings`] drives any [`FilingDownloader`] over tickers × form
//! types, recording failures without stopping. [`EdgarDownloader`] is the
//! production implementation writing primary documents under
//! `<dir>/sec-edgar-filings/<TICKER>/<FORM>/<ACCESSION>/`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::errors::IngestError;
use crate::http::{HttpClient, HttpFetch};
use crate::models::{ApiRequest, FilingFailure, FilingReport};

use super::credentials::{ensure_download_dir, SecEdgarCredentials};
use super::{normalize_cik, PROVIDER_ID, SUBMISSIONS_URL};

const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
const ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Directory created under the download root.
pub const FILINGS_DIR: &str = "sec-edgar-filings";

/// SEC allows 10 requests per second.
const DOCUMENT_DELAY: Duration = Duration::from_millis(150);

/// Retrieves filings of one form type for one ticker.
#[async_trait]
pub trait FilingDownloader: Send + Sync {
    /// Download up to `limit` of the newest `form` filings for `ticker`.
    /// Returns the number of documents written.
    async fn get(&self, form: &str, ticker: &str, limit: usize) -> Result<usize, IngestError>;
}

/// Call the downloader for every ticker and form type.
///
/// Failures are logged and recorded per pair; iteration continues.
/// Configuration errors abort.
pub async fn download_filings<D, T, F>(
    downloader: &D,
    tickers: &[T],
    form_types: &[F],
    limit: usize,
) -> Result<FilingReport, IngestError>
where
    D: FilingDownloader + ?Sized,
    T: AsRef<str> + Sync,
    F: AsRef<str> + Sync,
{
    let mut report = FilingReport::default();

    for ticker in tickers {
        let ticker = ticker.as_ref();
        for form in form_types {
            let form = form.as_ref();
            report.attempted += 1;

            match downloader.get(form, ticker, limit).await {
                Ok(count) => {
                    info!("Downloaded {} {} filings for {}", count, form, ticker);
                    report.documents += count;
                }
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    error!("Error downloading {} filings for {}: {}", form, ticker, e);
                    report.failures.push(FilingFailure {
                        ticker: ticker.to_string(),
                        form_type: form.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(report)
}

/// Validate credentials, prepare the download directory and run the real
/// downloader.
pub async fn download_filings_with_config<T, F>(
    config: &IngestConfig,
    tickers: &[T],
    form_types: &[F],
    limit: usize,
) -> Result<FilingReport, IngestError>
where
    T: AsRef<str> + Sync,
    F: AsRef<str> + Sync,
{
    let credentials = SecEdgarCredentials::from_config(config)?;
    let download_dir = ensure_download_dir(&config.download_dir)?;
    let downloader = EdgarDownloader::new(&credentials, download_dir, config.request_timeout)?;
    download_filings(&downloader, tickers, form_types, limit).await
}

// ============================================================================
// SEC JSON structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

/// Column-oriented; newest first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct FilingRef {
    accession: String,
    document: String,
}

impl RecentFilings {
    fn newest(&self, form: &str, limit: usize) -> Vec<FilingRef> {
        self.form
            .iter()
            .zip(&self.accession_number)
            .zip(&self.primary_document)
            .filter(|((f, _), doc)| f.as_str() == form && !doc.is_empty())
            .take(limit)
            .map(|((_, accession), document)| FilingRef {
                accession: accession.clone(),
                document: document.clone(),
            })
            .collect()
    }
}

// ============================================================================
// EdgarDownloader
// ============================================================================

/// Downloads primary filing documents from EDGAR.
pub struct EdgarDownloader {
    http: Arc<dyn HttpFetch>,
    download_dir: PathBuf,
    /// Upper-cased ticker -> CIK, fetched once.
    ciks: OnceCell<HashMap<String, u64>>,
    document_delay: Duration,
}

impl EdgarDownloader {
    pub fn new(
        credentials: &SecEdgarCredentials,
        download_dir: PathBuf,
        timeout: Duration,
    ) -> Result<Self, IngestError> {
        let http = Arc::new(HttpClient::with_user_agent(timeout, &credentials.user_agent())?);
        Ok(Self::with_http(http, download_dir))
    }

    pub fn with_http(http: Arc<dyn HttpFetch>, download_dir: PathBuf) -> Self {
        Self {
            http,
            download_dir,
            ciks: OnceCell::new(),
            document_delay: DOCUMENT_DELAY,
        }
    }

    pub fn with_document_delay(mut self, delay: Duration) -> Self {
        self.document_delay = delay;
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    async fn ticker_map(&self) -> Result<&HashMap<String, u64>, IngestError> {
        self.ciks
            .get_or_try_init(|| async move {
                debug!("Loading SEC ticker map");
                let body = self
                    .http
                    .get_text(PROVIDER_ID, &ApiRequest::get(COMPANY_TICKERS_URL))
                    .await?;
                let entries: HashMap<String, TickerEntry> = serde_json::from_str(&body)
                    .map_err(|e| {
                        IngestError::parse(PROVIDER_ID, format!("Failed to parse ticker map: {}", e))
                    })?;
                Ok::<_, IngestError>(
                    entries
                        .into_values()
                        .map(|e| (e.ticker.to_uppercase(), e.cik_str))
                        .collect(),
                )
            })
            .await
    }

    /// Tickers that are all digits are taken as CIKs.
    async fn resolve_cik(&self, ticker: &str) -> Result<u64, IngestError> {
        if !ticker.is_empty() && ticker.chars().all(|c| c.is_ascii_digit()) {
            return normalize_cik(ticker)?
                .parse()
                .map_err(|_| IngestError::InvalidArgument(format!("Invalid CIK: {}", ticker)));
        }

        self.ticker_map()
            .await?
            .get(&ticker.to_uppercase())
            .copied()
            .ok_or_else(|| IngestError::provider(PROVIDER_ID, format!("Unknown ticker: {}", ticker)))
    }

    async fn recent_filings(&self, cik: u64) -> Result<RecentFilings, IngestError> {
        let url = format!("{}/CIK{:010}.json", SUBMISSIONS_URL, cik);
        let body = self.http.get_json(PROVIDER_ID, &ApiRequest::get(url)).await?;
        let submissions: Submissions = serde_json::from_value(body).map_err(|e| {
            IngestError::parse(PROVIDER_ID, format!("Failed to parse submissions: {}", e))
        })?;
        Ok(submissions.filings.recent)
    }
}

/// Join `parts` onto `root`. Each part must be made of plain names only (no
/// `..`, root or prefix); it may span directories (`xslF345X05/wk-form4_1.xml`).
fn contained_path(root: &Path, parts: &[&str]) -> Result<PathBuf, IngestError> {
    let mut path = root.to_path_buf();
    for part in parts {
        let relative = Path::new(part);
        let plain = relative.components().next().is_some()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(IngestError::provider(
                PROVIDER_ID,
                format!("Refusing unsafe filing path: {:?}", part),
            ));
        }
        path.push(relative);
    }
    Ok(path)
}

#[async_trait]
impl FilingDownloader for EdgarDownloader {
    async fn get(&self, form: &str, ticker: &str, limit: usize) -> Result<usize, IngestError> {
        if limit == 0 {
            return Ok(0);
        }

        let form_dir = contained_path(
            &self.download_dir.join(FILINGS_DIR),
            &[&ticker.to_uppercase(), &form.replace('/', "-")],
        )?;
        let cik = self.resolve_cik(ticker).await?;
        let filings = self.recent_filings(cik).await?.newest(form, limit);
        if filings.is_empty() {
            warn!("No {} filings found for {} (CIK {})", form, ticker, cik);
            return Ok(0);
        }

        for (idx, filing) in filings.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.document_delay).await;
            }

            let path = contained_path(&form_dir, &[&filing.accession, &filing.document])?;
            let url = format!(
                "{}/{}/{}/{}",
                ARCHIVES_URL,
                cik,
                filing.accession.replace('-', ""),
                filing.document
            );
            let body = self.http.get_bytes(PROVIDER_ID, &ApiRequest::get(url)).await?;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, body).await?;
            debug!("Saved {} {} {}", ticker, form, filing.accession);
        }

        Ok(filings.len())
    }
}
