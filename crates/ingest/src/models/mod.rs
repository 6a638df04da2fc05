//! Ingestion models
//!
//! This module contains the data types that flow through a fetch:
//! - `request` - Query parameters and the request handed to the HTTP layer
//! - `outcome` - Validation result, per-entity outcome and ordered batch result
//! - `news` - Normalised news articles and the aggregated news report
//! - `filing` - Summary of a filing download run

mod filing;
mod news;
mod outcome;
mod request;

pub use filing::{FilingFailure, FilingReport};
pub use news::{CompanyNews, DateRange, NewsArticle, NewsMetadata, NewsReport, NewsType};
pub use outcome::{BatchResult, FetchOutcome, Validated};
pub use request::{ApiRequest, QueryParams};
