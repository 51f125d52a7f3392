//! Exporter main entry point.
//!
//! Loads settings, verifies store connectivity, and either runs exactly
//! one scrape cycle (single-run mode) or spawns the scrape loop alongside
//! the metrics/health endpoint (daemon mode). Every fatal error is logged
//! and terminates the process with a non-zero status; restart is the
//! recovery mechanism.

use std::env;
use std::process::ExitCode;

use dotenv::dotenv;
use pagerduty2es::{server, Dependencies, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pagerduty2es=info,pagerduty2es_repository=info"));

    let log_json = env::var("LOG_JSON")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    info!(
        service_name = "pagerduty2es",
        service_version = env!("CARGO_PKG_VERSION"),
        "Starting PagerDuty to Elasticsearch exporter"
    );

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let server_bind = settings.server_bind;
    let daemon = settings.scrape_interval.is_some();

    let deps = match Dependencies::new(settings).await {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return ExitCode::FAILURE;
        }
    };

    if daemon {
        let scheduler = deps.scheduler;
        let scheduler_handle = tokio::spawn(async move { scheduler.run().await });
        let app = server::create_app(deps.metrics.clone());

        tokio::select! {
            result = scheduler_handle => {
                match result {
                    Ok(Err(e)) => error!(error = %e, "Scrape loop failed"),
                    Ok(Ok(())) => error!("Scrape loop ended unexpectedly"),
                    Err(e) => error!(error = %e, "Scrape task panicked"),
                }
                ExitCode::FAILURE
            }
            result = server::run_server(app, server_bind) => {
                match result {
                    Ok(()) => error!("Metrics server ended unexpectedly"),
                    Err(e) => error!(error = %e, "Metrics server failed"),
                }
                ExitCode::FAILURE
            }
        }
    } else {
        match deps.scheduler.run().await {
            Ok(()) => {
                info!("Scrape completed");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Scrape failed");
                ExitCode::FAILURE
            }
        }
    }
}
