use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use tokio::{net::TcpListener, signal};
use tracing::info;
use weather_core::{Config, OpenWeatherClient, ProvinceDirectory, WeatherService};
use weather_server::{AppState, create_app};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "OpenWeatherMap proxy API")]
pub struct Cli {
    /// Path to the config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key in the config file.
    Configure {
        /// API key; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Serve the HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// JSON file mapping provinces to cities.
        #[arg(long)]
        cities_file: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(self.config, api_key),
            Command::Serve { host, port, cities_file } => {
                let mut config = Config::load(self.config.as_deref())?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                if let Some(cities_file) = cities_file {
                    config.server.cities_file = cities_file;
                }
                serve(config).await
            }
        }
    }
}

fn configure(path: Option<PathBuf>, api_key: Option<String>) -> anyhow::Result<()> {
    let mut config = match &path {
        Some(p) if !p.exists() => Config::default(),
        _ => Config::load(path.as_deref())?,
    };

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeatherMap API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    config.override_api_key(Some(api_key));
    config.api_key()?;

    let saved = config.save(path.as_deref())?;
    println!("Configuration saved to {}", saved.display());
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let api_key = config.api_key()?;
    let client = OpenWeatherClient::new(api_key, &config.openweather)?;

    let provinces = ProvinceDirectory::load(&config.server.cities_file)?;
    info!(
        provinces = provinces.len(),
        file = %config.server.cities_file.display(),
        "Province table loaded"
    );

    let state = AppState::new(WeatherService::new(Arc::new(client)), provinces);
    let app = create_app(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        %addr,
        timeout_secs = config.openweather.timeout_secs,
        "Server listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
