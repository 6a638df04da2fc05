//! Company and market news aggregation.
//!
//! [`NewsSource`] is the narrow seam over Finnhub's news endpoints;
//! [`aggregate_news`] drives any source into a [`NewsReport`]. Per-symbol
//! failures and market-news failures are recorded in the report, only
//! configuration errors abort.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::errors::IngestError;
use crate::models::{
    ApiRequest, CompanyNews, DateRange, NewsArticle, NewsMetadata, NewsReport, NewsType,
    QueryParams,
};

use super::{FinnhubFetcher, PROVIDER_ID};

/// Summaries longer than this many characters are truncated.
const SUMMARY_MAX_CHARS: usize = 500;

// ============================================================================
// Raw article
// ============================================================================

/// Article as returned by Finnhub. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    /// Numeric on /company-news, sometimes a string elsewhere
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub datetime: Option<i64>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sentiment: Option<f64>,
    #[serde(default)]
    pub relevance: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    /// Comma-separated tickers
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub related_tickers: Option<Vec<String>>,
}

impl RawArticle {
    fn has_headline(&self) -> bool {
        self.headline.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// Convert a vendor article into the canonical record.
pub fn normalize_article(raw: RawArticle, news_type: NewsType) -> NewsArticle {
    let id = match raw.id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let symbols = match (raw.related_tickers, raw.related) {
        (Some(tickers), _) => tickers,
        (None, Some(related)) => related
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        (None, None) => Vec::new(),
    };

    NewsArticle {
        id,
        category: raw.category.unwrap_or_else(|| "general".to_string()),
        sector: raw.sector.unwrap_or_default(),
        published: raw
            .datetime
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        headline: raw.headline.unwrap_or_default(),
        summary: truncate_summary(raw.summary.as_deref().unwrap_or_default()),
        url: raw.url.unwrap_or_default(),
        sentiment: round2(raw.sentiment.unwrap_or(0.0)),
        relevance: round2(raw.relevance.unwrap_or(0.0)),
        source: raw.source.unwrap_or_default(),
        symbols,
        news_type,
    }
}

fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    let mut truncated: String = summary.chars().take(SUMMARY_MAX_CHARS).collect();
    truncated.push_str("...");
    truncated
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Take at most `max` raw articles, then drop those without a headline.
fn process(raw: Vec<RawArticle>, max: usize, news_type: NewsType) -> Vec<NewsArticle> {
    raw.into_iter()
        .take(max)
        .filter(RawArticle::has_headline)
        .map(|a| normalize_article(a, news_type))
        .collect()
}

// ============================================================================
// NewsSource
// ============================================================================

/// Source of raw company and market news.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawArticle>, IngestError>;

    async fn market_news(&self, category: &str) -> Result<Vec<RawArticle>, IngestError>;
}

impl FinnhubFetcher {
    async fn get_articles(&self, request: ApiRequest) -> Result<Vec<RawArticle>, IngestError> {
        let body = self.http.get_json(PROVIDER_ID, &request).await?;

        if let Some(msg) = body.get("error").and_then(Value::as_str) {
            return Err(IngestError::provider(PROVIDER_ID, msg));
        }
        if !body.is_array() {
            return Err(IngestError::parse(
                PROVIDER_ID,
                "Expected a JSON array of articles",
            ));
        }

        serde_json::from_value(body).map_err(|e| {
            IngestError::parse(PROVIDER_ID, format!("Failed to parse articles: {}", e))
        })
    }
}

#[async_trait]
impl NewsSource for FinnhubFetcher {
    async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawArticle>, IngestError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with("from", from.format("%Y-%m-%d").to_string())
            .with("to", to.format("%Y-%m-%d").to_string());
        let request = self.request("/company-news", params)?;
        self.get_articles(request).await
    }

    async fn market_news(&self, category: &str) -> Result<Vec<RawArticle>, IngestError> {
        let request = self.request("/news", QueryParams::new().with("category", category))?;
        self.get_articles(request).await
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Parameters for [`aggregate_news`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewsRequest {
    pub symbols: Vec<String>,
    pub max_company_articles: usize,
    pub max_market_articles: usize,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub category: String,
}

impl NewsRequest {
    pub const DEFAULT_MAX_COMPANY_ARTICLES: usize = 50;
    pub const DEFAULT_MAX_MARKET_ARTICLES: usize = 20;

    /// Defaults: 50 company articles, 20 market articles, 2016-01-01 to today,
    /// `general` market category.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            max_company_articles: Self::DEFAULT_MAX_COMPANY_ARTICLES,
            max_market_articles: Self::DEFAULT_MAX_MARKET_ARTICLES,
            from: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or(NaiveDate::MIN),
            to: Utc::now().date_naive(),
            category: "general".to_string(),
        }
    }

    pub fn with_limits(mut self, max_company_articles: usize, max_market_articles: usize) -> Self {
        self.max_company_articles = max_company_articles;
        self.max_market_articles = max_market_articles;
        self
    }

    pub fn with_window(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

/// Fetch company news for every symbol and the market feed once.
pub async fn aggregate_news<N>(source: &N, request: &NewsRequest) -> Result<NewsReport, IngestError>
where
    N: NewsSource + ?Sized,
{
    let mut company_news = Vec::with_capacity(request.symbols.len());

    for symbol in &request.symbols {
        match source.company_news(symbol, request.from, request.to).await {
            Ok(raw) => {
                let articles = process(raw, request.max_company_articles, NewsType::Company);
                info!("Fetched {} articles for {}", articles.len(), symbol);
                company_news.push(CompanyNews::fetched(symbol, articles));
            }
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                let msg = format!("Error fetching news for {}: {}", symbol, e);
                error!("{}", msg);
                company_news.push(CompanyNews::failed(symbol, msg));
            }
        }
    }

    let (market_news, market_news_error) = match source.market_news(&request.category).await {
        Ok(raw) => {
            let articles = process(raw, request.max_market_articles, NewsType::Market);
            info!("Fetched {} market articles", articles.len());
            (articles, None)
        }
        Err(e) if e.is_configuration() => return Err(e),
        Err(e) => {
            let msg = format!("Error fetching market news: {}", e);
            error!("{}", msg);
            (Vec::new(), Some(msg))
        }
    };

    Ok(NewsReport {
        company_news,
        market_news,
        market_news_error,
        metadata: NewsMetadata {
            last_updated: Utc::now(),
            symbol_count: request.symbols.len(),
            date_range: DateRange {
                start: request.from,
                end: request.to,
            },
        },
    })
}
