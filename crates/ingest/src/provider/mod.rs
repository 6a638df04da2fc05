//! Vendor adapters and the abstractions they share.
//!
//! This module contains:
//! - The [`FetchAdapter`] trait every per-entity fetcher implements
//! - Rate limiting configuration ([`RateLimit`])
//! - Concrete adapters: Alpha Vantage, Finnhub, FRED, SEC EDGAR

mod capabilities;
mod traits;

pub mod alpha_vantage;
pub mod finnhub;
pub mod fred;
pub mod sec_edgar;

pub use capabilities::RateLimit;
pub use traits::FetchAdapter;

use serde_json::{Map, Value};

use crate::errors::IngestError;

/// Require a JSON object at the top level of a response.
pub(crate) fn expect_object(provider: &str, raw: Value) -> Result<Map<String, Value>, IngestError> {
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(IngestError::parse(
            provider,
            format!("Expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
