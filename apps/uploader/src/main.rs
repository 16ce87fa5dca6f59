//! pixdrop uploader entry point.

mod adapters;
mod app;
mod cli;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Logs go to stderr; stdout carries the progress view.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting pixdrop uploader"
    );

    let config = cli.apply(config::Config::load(cli.config.as_deref())?);
    tracing::info!(
        endpoint = %config.endpoint,
        max_width = config.max_width,
        max_height = config.max_height,
        quality = config.quality,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(app::run(config, cli.paths, interrupt()))?;

    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "some uploads failed");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
