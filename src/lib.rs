pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod forms;
pub mod models;
pub mod services;
pub mod web;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, UserCommands};
pub use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config);

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let prometheus_handle = install_metrics_recorder(&config)?;
            run_server(config, prometheus_handle).await
        }

        Commands::Init => cli::cmd_init(),

        Commands::Users { command } => match command {
            UserCommands::List => cli::cmd_user_list(&config).await,
            UserCommands::Delete { username, yes } => {
                cli::cmd_user_delete(&config, &username, yes).await
            }
        },
    }
}

/// Runs `f` with a plain stderr subscriber at INFO. Used for work that logs
/// before the configured subscriber exists, such as loading the config.
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn install_metrics_recorder(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Learning Log v{} starting...", env!("CARGO_PKG_VERSION"));

    let addr = config.listen_addr();
    let state = web::create_app_state(config, prometheus_handle).await?;
    let app = web::router(state).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_logging_enables_info() {
        assert!(with_bootstrap_logging(|| tracing::enabled!(tracing::Level::INFO)));
        assert!(!with_bootstrap_logging(|| tracing::enabled!(tracing::Level::DEBUG)));
    }
}
