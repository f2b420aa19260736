//! ClientPulse server binary.

use anyhow::{Context, Result};
use clap::Parser;
use clientpulse_core::config::AppConfig;
use clientpulse_server::{AppState, create_router};
use clientpulse_storage::ScreenshotStore;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ClientPulse - customer satisfaction feedback API
#[derive(Parser, Debug)]
#[command(name = "clientpulsed")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "CLIENTPULSE_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

/// Merge the optional config file with `CLIENTPULSE_` environment variables.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if std::path::Path::new(path).exists() {
        figment = figment.merge(Toml::file(path));
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("CLIENTPULSE_").ignore(&["CONFIG"]).split("__"))
        .extract()
        .context(
            "failed to load configuration \
             (set database.url and auth.secret_key, e.g. CLIENTPULSE_DATABASE__URL \
             and CLIENTPULSE_AUTH__SECRET_KEY; see config/server.example.toml)",
        )?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    // RUST_LOG wins; otherwise server.debug picks the default level
    let default_filter = if config.server.debug {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        app_name = %config.server.app_name,
        environment = %config.server.environment,
        "{} v{}",
        config.server.app_name,
        env!("CARGO_PKG_VERSION")
    );
    if std::path::Path::new(&args.config).exists() {
        tracing::info!(config_path = %args.config, "Loaded configuration file");
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let metadata = clientpulse_metadata::from_config(&config.database)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    let screenshots = ScreenshotStore::from_config(&config.s3).await;
    if !screenshots.is_enabled() {
        tracing::info!("Screenshot uploads disabled");
    }

    let state = AppState::new(config.clone(), metadata, screenshots)
        .context("failed to initialize token service")?;
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    // ConnectInfo supplies the peer address for client IP resolution
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
