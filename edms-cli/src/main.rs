//! edms - reconcile classified document metadata into mayan-edms

mod analyzer;
mod commands;
mod config;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyzer::AnalyzerClient;
use config::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let connection = args.mayan.connection();
    match args.command {
        Command::Decorate {
            document,
            document_type,
            metadata,
        } => {
            let report = commands::decorate(connection, document, document_type, &metadata).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Reanalyze { ids } => {
            let analyzer = AnalyzerClient::new(&args.analyzer_url)?;
            for reply in commands::reanalyze(&connection, &analyzer, &ids).await? {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            }
        }
        Command::Text { id, source } => {
            println!("{}", commands::text(&connection, id, source).await?);
        }
    }

    Ok(())
}
