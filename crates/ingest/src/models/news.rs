use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Whether an article came from a company feed or the market-wide feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsType {
    Company,
    Market,
}

/// Canonical news record produced from a vendor article.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewsArticle {
    pub id: String,
    pub category: String,
    pub sector: String,
    pub published: Option<DateTime<Utc>>,
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub sentiment: f64,
    pub relevance: f64,
    pub source: String,
    pub symbols: Vec<String>,
    #[serde(rename = "type")]
    pub news_type: NewsType,
}

/// Company news for one symbol. `error` is set when the fetch failed, in which
/// case `count` is 0 and `articles` is empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompanyNews {
    #[serde(skip)]
    pub symbol: String,
    pub count: usize,
    pub articles: Vec<NewsArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompanyNews {
    pub fn fetched(symbol: impl Into<String>, articles: Vec<NewsArticle>) -> Self {
        Self {
            symbol: symbol.into(),
            count: articles.len(),
            articles,
            error: None,
        }
    }

    pub fn failed(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            count: 0,
            articles: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewsMetadata {
    pub last_updated: DateTime<Utc>,
    pub symbol_count: usize,
    pub date_range: DateRange,
}

/// Aggregated company and market news.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewsReport {
    #[serde(serialize_with = "serialize_company_news")]
    pub company_news: Vec<CompanyNews>,
    pub market_news: Vec<NewsArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_news_error: Option<String>,
    pub metadata: NewsMetadata,
}

impl NewsReport {
    pub fn company(&self, symbol: &str) -> Option<&CompanyNews> {
        self.company_news.iter().find(|c| c.symbol == symbol)
    }
}

fn serialize_company_news<S: Serializer>(
    company_news: &[CompanyNews],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(company_news.len()))?;
    for news in company_news {
        map.serialize_entry(&news.symbol, news)?;
    }
    map.end()
}
