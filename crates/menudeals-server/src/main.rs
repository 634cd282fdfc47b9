mod api;
mod middleware;

use std::{net::SocketAddr, sync::Arc};

use menudeals_core::{load_featured, Clock, SystemClock};
use menudeals_db::PgDealStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState, DealDiscovery},
    middleware::ClientRateLimiter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = menudeals_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting menudeals-server");

    let pool_config = menudeals_db::PoolConfig::from_app_config(&config);
    let pool = menudeals_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = menudeals_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let schedule = load_featured(&config.featured_path)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset));
    let discovery = DealDiscovery::new(PgDealStore::new(pool.clone()), clock, Arc::new(schedule));

    let limiter = ClientRateLimiter::per_minute(config.rate_limit_per_minute);
    let state = AppState {
        pool,
        discovery: Arc::new(discovery),
        default_radius_km: config.default_radius_km,
    };
    let app = build_app(state, limiter);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
