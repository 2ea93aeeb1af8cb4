use nodealias_core::alias::AliasRejected;
use nodealias_core::route_body::RouteBodyError;

/// Errors surfaced by route synchronization.
///
/// File generation and write problems are not errors: they are reported
/// through [`crate::WriteReport`] because the content change has already
/// committed by the time the routes file is rebuilt.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The route store could not be queried or written.
    #[error("Route store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The submitted alias failed one or more rules.
    #[error(transparent)]
    Validation(#[from] AliasRejected),

    /// A route body could not be encoded for storage.
    #[error(transparent)]
    Body(#[from] RouteBodyError),

    /// A save was reported for a node that has no id yet.
    #[error("Content submission has no id")]
    MissingContentId,

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}
