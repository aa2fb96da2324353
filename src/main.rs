use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use marketplace_api as api;

const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Marketplace order-management API server
#[derive(Debug, Parser)]
#[command(name = "marketplace-api", version, about)]
struct Cli {
    /// Apply database migrations and exit
    #[arg(long)]
    migrate_only: bool,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = api::config::load_config().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    if cfg.auto_migrate || cli.migrate_only {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    if cli.migrate_only {
        info!("Migrations applied; exiting");
        api::db::close_pool(db_pool).await?;
        return Ok(());
    }

    let db_arc = Arc::new(db_pool);
    let app_state = api::AppState::new(db_arc.clone(), cfg.clone());

    // Expired limiter windows are dropped in the background
    tokio::spawn(api::rate_limiter::start_cleanup_task(
        app_state.api_limiter.clone(),
        LIMITER_CLEANUP_INTERVAL,
    ));
    tokio::spawn(api::rate_limiter::start_cleanup_task(
        app_state.login_limiter.clone(),
        LIMITER_CLEANUP_INTERVAL,
    ));

    let app = api::build_router(app_state);

    // Bind and serve
    let host: std::net::IpAddr = cfg
        .host
        .parse()
        .with_context(|| format!("invalid listen host '{}'", cfg.host))?;
    let addr = SocketAddr::from((host, cfg.port));
    info!(
        environment = %cfg.environment,
        metrics = %cfg.prometheus_endpoint,
        "marketplace-api listening on http://{}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
