use std::path::PathBuf;

use nodealias_core::routes_file::ROUTES_FILE_NAME;

use crate::error::SyncError;

/// Synchronizer configuration loaded from environment variables.
///
/// Defaults suit a local checkout of the host application; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Root directory of the host application (default: `app`).
    pub app_dir: PathBuf,
    /// Explicit routes file location, overriding the derived default.
    pub routes_file_override: Option<PathBuf>,
    /// Directory of cached rendered views, cleared after route changes.
    pub view_cache_dir: Option<PathBuf>,
    /// Maximum pool connections (default: `5`).
    pub db_max_connections: u32,
}

impl SyncConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                                |
    /// |----------------------|----------------------------------------|
    /// | `DATABASE_URL`       | required                               |
    /// | `APP_DIR`            | `app`                                  |
    /// | `ROUTES_FILE_PATH`   | `$APP_DIR/Plugin/Route/Config/routes.php` |
    /// | `VIEW_CACHE_DIR`     | unset (no cache invalidation)          |
    /// | `DB_MAX_CONNECTIONS` | `5`                                    |
    pub fn from_env() -> Result<Self, SyncError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| SyncError::Config("DATABASE_URL must be set".into()))?;

        let app_dir = std::env::var("APP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("app"));

        let routes_file_override = non_empty_var("ROUTES_FILE_PATH").map(PathBuf::from);
        let view_cache_dir = non_empty_var("VIEW_CACHE_DIR").map(PathBuf::from);

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .map_err(|_| SyncError::Config("DB_MAX_CONNECTIONS must be a valid u32".into()))?;

        Ok(Self {
            database_url,
            app_dir,
            routes_file_override,
            view_cache_dir,
            db_max_connections,
        })
    }

    /// Where the generated routes file lives.
    pub fn routes_file_path(&self) -> PathBuf {
        match &self.routes_file_override {
            Some(path) => path.clone(),
            None => self
                .app_dir
                .join("Plugin")
                .join("Route")
                .join("Config")
                .join(ROUTES_FILE_NAME),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
