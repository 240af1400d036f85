use anyhow::Result;
use clap::Parser;

use kpi_bootstrap::{lifecycle, telemetry, Args};
use kpi_infrastructure::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var("KPI_CONFIG", config);
    }

    let config = AppConfig::load().await?;
    let _guard = telemetry::init_tracing(&config);

    lifecycle::run(config, args).await
}
