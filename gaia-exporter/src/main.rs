// gaia-exporter/src/main.rs

//! Exporter binary.
//!
//! Polls a Gaia/Tendermint node's `/status` and `/net_info` endpoints at a
//! fixed interval and serves the derived gauges on `/metrics`:
//!
//! - `latest_block_height`
//! - `latest_block_time_lag`
//! - `number_of_peers`
//!
//! Runs until SIGINT/SIGTERM, then stops the polling loop and the scrape
//! server and exits with status 0. Startup failures exit with status 1.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use exporter::{
    ExporterConfig, HttpStatusClient, MetricsRegistry, StartupError, bind_metrics_listener,
    scheduler, serve_metrics,
};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "gaia_exporter=info,exporter=info".to_string()),
        )
        .init();

    let cfg = ExporterConfig::from(Cli::parse());

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal error: {e}");
            eprintln!("fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: ExporterConfig) -> Result<(), StartupError> {
    cfg.validate()?;

    tracing::info!(
        target = %cfg.target.base_url(),
        polling_interval = ?cfg.polling_interval,
        listen = %cfg.metrics.listen_addr,
        "starting exporter"
    );

    // ---------------------------
    // Metrics registry + exporter
    // ---------------------------

    let metrics = Arc::new(MetricsRegistry::with_namespace(cfg.metrics.namespace.clone())?);
    let listener = bind_metrics_listener(cfg.metrics.listen_addr).await?;

    // ---------------------------
    // Node status client
    // ---------------------------

    let client = HttpStatusClient::from_config(&cfg.target)?;

    let shutdown = CancellationToken::new();

    let mut server = tokio::spawn(serve_metrics(
        listener,
        metrics.clone(),
        shutdown.clone(),
    ));

    // ---------------------------
    // Polling loop
    // ---------------------------

    let poller = {
        let metrics = metrics.clone();
        let shutdown = shutdown.clone();
        let interval = cfg.polling_interval;
        tokio::spawn(async move { scheduler::run(interval, &client, &metrics, shutdown).await })
    };

    tokio::select! {
        _ = shutdown_signal() => {}
        res = &mut server => {
            // The server only returns early on an unrecoverable error.
            match res {
                Ok(Ok(())) => tracing::warn!("metrics exporter exited unexpectedly"),
                Ok(Err(e)) => tracing::error!("metrics exporter error: {e}"),
                Err(e) => tracing::error!("metrics exporter task failed: {e}"),
            }
        }
    }

    shutdown.cancel();

    if let Err(e) = poller.await {
        tracing::error!("polling task failed: {e}");
    }
    if !server.is_finished() {
        if let Ok(Err(e)) = server.await {
            tracing::error!("metrics exporter error: {e}");
        }
    }

    tracing::info!("exporter stopped");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM, used for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
