use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use ciforecast::analytics::{self, OUTLIER_THRESHOLD_SECONDS};
use ciforecast::dataset::DatasetSource;
use ciforecast::server::{self, ServerConfig};

#[derive(Parser)]
#[command(name = "ciforecast")]
#[command(author, version, about = "CI Pipeline Duration Dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 5001)]
        port: u16,

        /// Historical telemetry CSV
        #[arg(short, long, env = "DASHBOARD_DATA", default_value = "dashboard_data.csv")]
        data: PathBuf,

        /// Base URL of the prediction service
        #[arg(long, env = "PREDICTOR_URL", default_value = "http://localhost:5000")]
        predictor_url: String,

        /// Seconds to wait for the prediction service
        #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
        upstream_timeout_secs: u64,

        /// Durations at or above this many seconds are left out of the correlation view
        #[arg(long, default_value_t = OUTLIER_THRESHOLD_SECONDS)]
        outlier_threshold: f64,
    },

    /// Compute dashboard insights from a dataset and print them as JSON
    Analyze {
        /// Historical telemetry CSV
        #[arg(short, long, env = "DASHBOARD_DATA", default_value = "dashboard_data.csv")]
        data: PathBuf,

        /// Durations at or above this many seconds are left out of the correlation view
        #[arg(long, default_value_t = OUTLIER_THRESHOLD_SECONDS)]
        outlier_threshold: f64,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Serve {
                host,
                port,
                data,
                predictor_url,
                upstream_timeout_secs,
                outlier_threshold,
            } => {
                let config = ServerConfig {
                    host: host.clone(),
                    port: *port,
                    data_path: data.clone(),
                    predictor_url: predictor_url.clone(),
                    upstream_timeout: Duration::from_secs(*upstream_timeout_secs),
                    outlier_threshold: *outlier_threshold,
                };

                server::serve(config, server::shutdown_signal()).await?;
                Ok(())
            }
            Commands::Analyze {
                data,
                outlier_threshold,
            } => {
                info!("Analyzing dataset: {}", data.display());

                let source = DatasetSource::new(data);
                let threshold = *outlier_threshold;
                let insights = tokio::task::spawn_blocking(move || {
                    analytics::analyze_source(&source, threshold)
                })
                .await??;

                let json_output = if self.pretty {
                    serde_json::to_string_pretty(&insights)?
                } else {
                    serde_json::to_string(&insights)?
                };

                if let Some(output_path) = &self.output {
                    std::fs::write(output_path, json_output)?;
                    info!("Insights written to: {}", output_path.display());
                } else {
                    println!("{}", json_output);
                }

                Ok(())
            }
        }
    }
}
