//! Bronze Ingest Crate
//!
//! This crate pulls raw ("bronze layer") financial data from external vendors
//! and hands it back unmodified, together with a per-entity record of what
//! succeeded, what came back empty and what failed.
//!
//! # Overview
//!
//! Supported vendors:
//! - Alpha Vantage: historical options and company overviews
//! - Finnhub: market holidays, company profiles, company and market news
//! - FRED: economic series observations
//! - SEC EDGAR: filing documents, submissions and XBRL company facts
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   IngestConfig   | --> |   FetchAdapter   |  (one per vendor)
//! +------------------+     +------------------+
//!                                  |
//!                build_request -> perform -> validate
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   fetch_batch    |  (sequential, throttled)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   BatchResult    |  (entity -> FetchOutcome)
//!                          +------------------+
//! ```
//!
//! News aggregation ([`aggregate_news`]) and filing downloads
//! ([`download_filings`]) sit beside the batch path behind their own narrow
//! traits, [`NewsSource`] and [`FilingDownloader`].
//!
//! # Core Types
//!
//! - [`IngestConfig`] - Credentials and settings resolved once from the environment
//! - [`FetchAdapter`] - Per-vendor request building, execution and validation
//! - [`FetchOutcome`] - `Data`, `Empty` or `Failed` for one entity
//! - [`BatchResult`] - Ordered outcomes for a batch, plus throttle pause count
//! - [`NewsReport`] - Aggregated company and market news
//! - [`FilingReport`] - Summary of a filing download run
//! - [`IngestError`] - Error type; [`ErrorTier`] decides whether it aborts a batch

pub mod batch;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod provider;

pub use batch::fetch_batch;
pub use config::IngestConfig;
pub use errors::{ErrorTier, IngestError};
pub use http::{HttpClient, HttpFetch};

// Re-export all public types from models
pub use models::{
    ApiRequest, BatchResult, CompanyNews, DateRange, FetchOutcome, FilingFailure, FilingReport,
    NewsArticle, NewsMetadata, NewsReport, NewsType, QueryParams, Validated,
};

// Re-export provider types
pub use provider::alpha_vantage::{AlphaVantageFetcher, AlphaVantageFunction};
pub use provider::finnhub::{
    aggregate_news, FinnhubEndpoint, FinnhubFetcher, NewsRequest, NewsSource, RawArticle,
};
pub use provider::fred::{FredFetcher, SeriesWindow};
pub use provider::sec_edgar::{
    download_filings, download_filings_with_config, EdgarDownloader, FilingDownloader,
    SecEdgarCredentials, SecEdgarEndpoint, SecEdgarFetcher,
};
pub use provider::{FetchAdapter, RateLimit};
