use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use reverie::{
    args::{Args, Command},
    config::Config,
    infrastructure::{database, datadog::Metrics},
    processor::Processor,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Arc::new(Config::from_env()?);

    tracing::info!("---------------------------------------------------");
    tracing::info!("---- pp processor for gamemode {}", args.mode.name());
    tracing::info!("---------------------------------------------------");

    let db = database::create_pool(&config.database).await?;
    let db_slave = database::create_pool(&config.database_slave).await?;
    let metrics = Metrics::new(&config.datadog, args.mode)?;

    let processor = Processor::new(args.mode, config, db, db_slave, metrics).await?;
    processor.spawn_shutdown_listener();

    match args.command.unwrap_or(Command::Monitor) {
        Command::Monitor => processor.monitor_new_scores().await?,
        Command::All { reprocess, threads } => {
            processor.process_all_users(reprocess, threads).await?
        },
        Command::Users { users } => processor.process_users(&users).await?,
    }

    processor.finish().await;
    tracing::info!("shutting down");

    Ok(())
}
