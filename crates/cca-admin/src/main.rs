//! # CCA Admin CLI
//!
//! Binary entry point for the administration client.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cca_admin::cli::Cli;
use cca_admin::commands::{self, Context};
use cca_admin::{Config, LogFormat};
use cca_client::{ApiClient, FileTokenStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration, flags win over the environment
    let mut config = Config::from_env();
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }
    if let Some(path) = cli.session_file.clone() {
        config.session_file = path;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    let tokens = FileTokenStore::open(&config.session_file)?;
    tracing::debug!(
        version = cca_admin::VERSION,
        api_url = %config.api_url,
        session_file = %tokens.path().display(),
        "Starting cca-admin"
    );

    let client = ApiClient::new(config.client_config(), Arc::new(tokens))?;
    let ctx = Context::new(client, &config);

    commands::run(cli.command, &ctx).await?;
    Ok(())
}
