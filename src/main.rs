use anyhow::Context;
use dotenvy::dotenv;
use registrar::logging::init_tracing;
use registrar::metrics::{init_metrics, metrics_app, set_observability_enabled};
use registrar::router::init_router;
use registrar::state::init_app_state;
use registrar_config::{DatabaseConfig, ServerConfig};
use registrar_db::{init_db_pool, run_migrations};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;

    let server_config = ServerConfig::from_env();
    set_observability_enabled(server_config.observability_enabled);

    let db_config = DatabaseConfig::from_env()?;
    let db = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    if let Some(handle) = init_metrics().context("Failed to install metrics recorder")? {
        let metrics_addr = server_config.metrics_addr();
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {metrics_addr}"))?;
        info!(addr = %metrics_addr, "Metrics endpoint listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let state = init_app_state(db);
    let app = init_router(state);

    let bind_addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    info!(addr = %bind_addr, "Server running");
    info!("Scalar UI available at http://{bind_addr}/scalar");

    axum::serve(listener, app).await?;
    Ok(())
}
