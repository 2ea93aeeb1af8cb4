//! Repository for the `routes` table.

use nodealias_core::types::DbId;
use sqlx::PgPool;

use crate::models::route::{CreateRoute, Route, UpdateRoute};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, alias, node_id, status, body, created_at, updated_at";

/// Provides CRUD operations for routes.
pub struct RouteRepo;

impl RouteRepo {
    /// Insert a new route, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRoute) -> Result<Route, sqlx::Error> {
        let query = format!(
            "INSERT INTO routes (alias, node_id, status, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Route>(&query)
            .bind(&input.alias)
            .bind(input.node_id)
            .bind(input.status)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Find a route by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Route>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM routes WHERE id = $1");
        sqlx::query_as::<_, Route>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the route owned by a node. If several exist, the oldest wins.
    pub async fn find_by_node_id(
        pool: &PgPool,
        node_id: DbId,
    ) -> Result<Option<Route>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM routes WHERE node_id = $1 ORDER BY id ASC LIMIT 1");
        sqlx::query_as::<_, Route>(&query)
            .bind(node_id)
            .fetch_optional(pool)
            .await
    }

    /// Count routes using `alias`, ignoring those owned by `exclude_node_id`.
    ///
    /// Status is not considered: a disabled route still reserves its alias.
    pub async fn count_alias_conflicts(
        pool: &PgPool,
        alias: &str,
        exclude_node_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM routes
             WHERE alias = $1 AND ($2::BIGINT IS NULL OR node_id <> $2)",
        )
        .bind(alias)
        .bind(exclude_node_id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// List enabled routes in insertion order.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<Route>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM routes WHERE status ORDER BY id ASC");
        sqlx::query_as::<_, Route>(&query).fetch_all(pool).await
    }

    /// Update a route in place. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRoute,
    ) -> Result<Option<Route>, sqlx::Error> {
        let query = format!(
            "UPDATE routes SET
                alias = COALESCE($2, alias),
                status = COALESCE($3, status),
                body = COALESCE($4, body)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Route>(&query)
            .bind(id)
            .bind(&input.alias)
            .bind(input.status)
            .bind(&input.body)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a route by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
