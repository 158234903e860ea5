mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting CIForecast - CI Pipeline Duration Dashboard");
    cli.execute().await?;

    Ok(())
}
