#![warn(clippy::all)]

use anyhow::Context;
use recipe_book::api::{create_router, AppState};
use recipe_book::config::ServerConfig;
use recipe_book::database::{create_tables, establish_pooled_connection, seed, DbPool};
use recipe_book::logging;
use tokio::net::TcpListener;
use tracing::{error, info, trace_span};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("Unable to read configuration")?;

    logging::init(config.log_level).context("Unable to set global subscriber")?;

    let pool = establish_pooled_connection(&config.database).context("Failed to create pool")?;
    prepare_database(&pool, config.seed_on_startup)?;

    let app = create_router(AppState::new(pool));

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Unable to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

fn prepare_database(pool: &DbPool, seed_on_startup: bool) -> anyhow::Result<()> {
    let span = trace_span!("preparing database");
    let _guard = span.enter();

    let mut connection = pool.get().context("Unable to get a connection")?;

    create_tables(&mut connection).context("Unable to create tables")?;

    if seed_on_startup {
        seed::populate_if_empty(&mut connection).context("Unable to seed the catalog")?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "unable to listen for shutdown signal");
        return;
    }

    info!("shutdown requested");
}
