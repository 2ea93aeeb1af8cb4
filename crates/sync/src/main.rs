//! Rebuild the routes file from the `routes` table once and print the
//! write report. Exits non-zero when the file could not be written.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nodealias_sync::{PgRouteStore, RouteSynchronizer, SyncConfig, ViewCacheDir};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nodealias_sync=debug,nodealias_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = SyncConfig::from_env().expect("Invalid configuration");
    let routes_file = config.routes_file_path();
    tracing::info!(routes_file = %routes_file.display(), "Loaded configuration");

    // --- Database ---
    let pool = nodealias_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    nodealias_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    nodealias_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Regenerate ---
    let cache = config.view_cache_dir.clone().map(ViewCacheDir::new);
    let synchronizer = RouteSynchronizer::new(PgRouteStore::new(pool), cache, routes_file);

    let (cache_error, report) = synchronizer.refresh().await;
    if let Some(error) = cache_error {
        tracing::warn!(%error, "View cache was not cleared");
    }

    println!("{}", report.diagnostics);
    if !report.written {
        std::process::exit(1);
    }
}
