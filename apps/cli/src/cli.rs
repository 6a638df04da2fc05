use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bronze")]
#[command(about = "Bronze-layer financial data ingestion", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Write the JSON result to this file instead of stdout
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Alpha Vantage data per symbol
    AlphaVantage {
        /// HISTORICAL_OPTIONS or OVERVIEW
        #[arg(long, short, default_value = "OVERVIEW")]
        function: String,

        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// FRED series observations
    Fred {
        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,

        /// FRED frequency code (d, w, m, q, a, ...)
        #[arg(long)]
        frequency: Option<String>,

        #[arg(required = true)]
        series: Vec<String>,
    },

    /// Finnhub market holidays (per exchange) or company profiles (per symbol)
    Finnhub {
        /// MARKET_HOLIDAY or COMPANY_PROFILE
        #[arg(long, short, default_value = "MARKET_HOLIDAY")]
        endpoint: String,

        #[arg(required = true)]
        entities: Vec<String>,
    },

    /// Company and market news from Finnhub
    News {
        #[arg(long, default_value_t = 50)]
        max_company_articles: usize,

        #[arg(long, default_value_t = 20)]
        max_market_articles: usize,

        /// Window start (default 2016-01-01)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Window end (default today)
        #[arg(long)]
        to: Option<NaiveDate>,

        symbols: Vec<String>,
    },

    /// SEC EDGAR JSON endpoints per CIK
    Edgar {
        /// SUBMISSIONS or COMPANY_FACTS
        #[arg(long, short, default_value = "SUBMISSIONS")]
        endpoint: String,

        #[arg(required = true)]
        ciks: Vec<String>,
    },

    /// Download SEC filings into SEC_EDGAR_DOWNLOAD_PATH
    Filings {
        /// Comma-separated tickers
        #[arg(long, value_delimiter = ',', required = true)]
        tickers: Vec<String>,

        /// Comma-separated form types
        #[arg(long, value_delimiter = ',', default_value = "10-K")]
        forms: Vec<String>,

        /// Filings per ticker and form type
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}
