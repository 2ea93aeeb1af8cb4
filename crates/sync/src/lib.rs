//! Route alias synchronization for content nodes.
//!
//! Call [`RouteSynchronizer::on_content_saved`] after a node save commits
//! and [`RouteSynchronizer::on_content_deleted`] after a node delete
//! commits. Run [`AliasValidator::validate`] before the save to enforce the
//! alias rules. The synchronizer keeps the `routes` table in step with the
//! node and regenerates the routes file the host router loads at boot.

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod reporter;
pub mod store;
pub mod synchronizer;
pub mod validator;

pub use cache::{CacheInvalidator, ViewCacheDir};
pub use config::SyncConfig;
pub use error::SyncError;
pub use generator::RouteFileGenerator;
pub use reporter::{FileDiagnostics, FileWriteReporter, WriteReport};
pub use store::{MemoryRouteStore, PgRouteStore, RouteStore};
pub use synchronizer::{RouteSynchronizer, SyncAction, SyncResult};
pub use validator::AliasValidator;
