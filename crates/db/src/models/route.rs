//! Route entity model and DTOs.

use nodealias_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A route row from the `routes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Route {
    pub id: DbId,
    pub alias: String,
    pub node_id: DbId,
    pub status: bool,
    /// Encoded `RouteBody`; see `nodealias_core::route_body`.
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoute {
    pub alias: String,
    pub node_id: DbId,
    pub status: bool,
    pub body: String,
}

/// DTO for updating an existing route. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoute {
    pub alias: Option<String>,
    pub status: Option<bool>,
    pub body: Option<String>,
}
