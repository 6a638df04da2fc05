use std::path::Path;

use anyhow::Context;
use bronze_ingest::provider::sec_edgar::download_filings_with_config;
use bronze_ingest::{
    aggregate_news, AlphaVantageFetcher, AlphaVantageFunction, BatchResult, FilingReport,
    FinnhubEndpoint, FinnhubFetcher, FredFetcher, IngestConfig, NewsReport, NewsRequest,
    SecEdgarEndpoint, SecEdgarFetcher, SeriesWindow,
};
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Command;

/// Logs go to stderr so stdout carries only the JSON result.
pub fn init_tracing() {
    let log_format = std::env::var("BRONZE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Typed result of one subcommand, serialised as-is so batch entries keep
/// their input order.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RunOutput {
    Batch(BatchResult),
    News(NewsReport),
    Filings(FilingReport),
}

pub async fn run(command: Command, config: &IngestConfig) -> anyhow::Result<RunOutput> {
    let output = match command {
        Command::AlphaVantage { function, symbols } => {
            let function: AlphaVantageFunction = function.parse()?;
            let fetcher = AlphaVantageFetcher::new(config)?;
            RunOutput::Batch(fetcher.fetch_batch_data(&symbols, function).await?)
        }
        Command::Fred {
            start,
            end,
            frequency,
            series,
        } => {
            let window = SeriesWindow {
                observation_start: start,
                observation_end: end,
                frequency,
            };
            let fetcher = FredFetcher::new(config)?;
            RunOutput::Batch(fetcher.fetch_batch_series(&series, &window).await?)
        }
        Command::Finnhub { endpoint, entities } => {
            let endpoint: FinnhubEndpoint = endpoint.parse()?;
            let fetcher = FinnhubFetcher::new(config)?;
            RunOutput::Batch(match endpoint {
                FinnhubEndpoint::MarketHoliday => fetcher.market_holidays(&entities).await?,
                FinnhubEndpoint::CompanyProfile => fetcher.company_profiles(&entities).await?,
            })
        }
        Command::News {
            max_company_articles,
            max_market_articles,
            from,
            to,
            symbols,
        } => {
            let mut request =
                NewsRequest::new(symbols).with_limits(max_company_articles, max_market_articles);
            request.from = from.unwrap_or(request.from);
            request.to = to.unwrap_or(request.to);
            let fetcher = FinnhubFetcher::new(config)?;
            RunOutput::News(aggregate_news(&fetcher, &request).await?)
        }
        Command::Edgar { endpoint, ciks } => {
            let endpoint: SecEdgarEndpoint = endpoint.parse()?;
            let fetcher = SecEdgarFetcher::new(config);
            RunOutput::Batch(fetcher.fetch_batch_ciks(&ciks, endpoint).await?)
        }
        Command::Filings {
            tickers,
            forms,
            limit,
        } => {
            let report = download_filings_with_config(config, &tickers, &forms, limit).await?;
            tracing::info!(
                "Filings: {} attempted, {} documents, {} failed",
                report.attempted,
                report.documents,
                report.failures.len()
            );
            RunOutput::Filings(report)
        }
    };

    Ok(output)
}

/// Pretty-print `value` to `path`, or to stdout when no path is given.
pub fn write_output<T: Serialize + ?Sized>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
