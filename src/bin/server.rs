use anyhow::Context;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load().context("Invalid configuration")?;

    let db_path = &settings.database.path;
    tracing::info!("Opening database at {}", db_path.display());
    let pool = establish_connection(db_path, settings.database.max_connections)
        .await
        .with_context(|| format!("Cannot open database {}", db_path.display()))?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool).await?;

    run_server(pool, settings.server, settings.quiz).await
}
