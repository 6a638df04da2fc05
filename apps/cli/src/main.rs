mod cli;
mod main_lib;

use bronze_ingest::IngestConfig;
use clap::Parser;

use cli::Cli;
use main_lib::{init_tracing, run, write_output};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = IngestConfig::from_env();

    let value = run(cli.command, &config).await?;
    write_output(&value, cli.output.as_deref())?;
    Ok(())
}
