//! Route persistence seam.
//!
//! [`RouteStore`] is the interface the validator, generator and
//! synchronizer are constructed with. [`PgRouteStore`] forwards to
//! [`RouteRepo`]; [`MemoryRouteStore`] keeps rows in process for tests and
//! for hosts that persist routes elsewhere.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use nodealias_core::types::DbId;
use nodealias_db::models::route::{CreateRoute, Route, UpdateRoute};
use nodealias_db::repositories::RouteRepo;
use nodealias_db::DbPool;
use tokio::sync::Mutex;

/// Operations the route synchronizer needs from storage.
///
/// A lookup that finds nothing is `Ok(None)`; `Err` always means the store
/// itself failed.
pub trait RouteStore: Send + Sync {
    /// The route owned by `node_id`, oldest first if several exist.
    fn find_by_node(
        &self,
        node_id: DbId,
    ) -> impl Future<Output = Result<Option<Route>, sqlx::Error>> + Send;

    /// Number of routes using `alias` whose node differs from `exclude_node_id`.
    fn count_alias_conflicts(
        &self,
        alias: &str,
        exclude_node_id: Option<DbId>,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Enabled routes in insertion order.
    fn list_enabled(&self) -> impl Future<Output = Result<Vec<Route>, sqlx::Error>> + Send;

    fn create(
        &self,
        input: &CreateRoute,
    ) -> impl Future<Output = Result<Route, sqlx::Error>> + Send;

    fn update(
        &self,
        id: DbId,
        input: &UpdateRoute,
    ) -> impl Future<Output = Result<Option<Route>, sqlx::Error>> + Send;

    /// Returns `true` if a row was removed.
    fn delete(&self, id: DbId) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`RouteStore`] backed by the `routes` table.
#[derive(Clone)]
pub struct PgRouteStore {
    pool: DbPool,
}

impl PgRouteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RouteStore for PgRouteStore {
    async fn find_by_node(&self, node_id: DbId) -> Result<Option<Route>, sqlx::Error> {
        RouteRepo::find_by_node_id(&self.pool, node_id).await
    }

    async fn count_alias_conflicts(
        &self,
        alias: &str,
        exclude_node_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        RouteRepo::count_alias_conflicts(&self.pool, alias, exclude_node_id).await
    }

    async fn list_enabled(&self) -> Result<Vec<Route>, sqlx::Error> {
        RouteRepo::list_enabled(&self.pool).await
    }

    async fn create(&self, input: &CreateRoute) -> Result<Route, sqlx::Error> {
        RouteRepo::create(&self.pool, input).await
    }

    async fn update(&self, id: DbId, input: &UpdateRoute) -> Result<Option<Route>, sqlx::Error> {
        RouteRepo::update(&self.pool, id, input).await
    }

    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        RouteRepo::delete(&self.pool, id).await
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    rows: Vec<Route>,
    next_id: DbId,
    unavailable: bool,
}

impl MemoryState {
    fn check(&self) -> Result<(), sqlx::Error> {
        if self.unavailable {
            Err(sqlx::Error::PoolClosed)
        } else {
            Ok(())
        }
    }
}

/// [`RouteStore`] holding rows in memory, ordered by id.
///
/// Clones share the same rows.
#[derive(Clone, Default)]
pub struct MemoryRouteStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`sqlx::Error::PoolClosed`],
    /// or recover when `false`.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// Snapshot of every row, enabled or not.
    pub async fn all(&self) -> Vec<Route> {
        self.state.lock().await.rows.clone()
    }

    /// Insert a row verbatim, e.g. one carrying a legacy or broken body.
    pub async fn insert_raw(&self, alias: &str, node_id: DbId, status: bool, body: &str) -> Route {
        let mut state = self.state.lock().await;
        insert(
            &mut state,
            &CreateRoute {
                alias: alias.to_string(),
                node_id,
                status,
                body: body.to_string(),
            },
        )
    }
}

fn insert(state: &mut MemoryState, input: &CreateRoute) -> Route {
    state.next_id += 1;
    let now = Utc::now();
    let route = Route {
        id: state.next_id,
        alias: input.alias.clone(),
        node_id: input.node_id,
        status: input.status,
        body: input.body.clone(),
        created_at: now,
        updated_at: now,
    };
    state.rows.push(route.clone());
    route
}

impl RouteStore for MemoryRouteStore {
    async fn find_by_node(&self, node_id: DbId) -> Result<Option<Route>, sqlx::Error> {
        let state = self.state.lock().await;
        state.check()?;
        Ok(state.rows.iter().find(|r| r.node_id == node_id).cloned())
    }

    async fn count_alias_conflicts(
        &self,
        alias: &str,
        exclude_node_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let state = self.state.lock().await;
        state.check()?;
        let count = state
            .rows
            .iter()
            .filter(|r| r.alias == alias && exclude_node_id != Some(r.node_id))
            .count();
        Ok(count as i64)
    }

    async fn list_enabled(&self) -> Result<Vec<Route>, sqlx::Error> {
        let state = self.state.lock().await;
        state.check()?;
        Ok(state.rows.iter().filter(|r| r.status).cloned().collect())
    }

    async fn create(&self, input: &CreateRoute) -> Result<Route, sqlx::Error> {
        let mut state = self.state.lock().await;
        state.check()?;
        Ok(insert(&mut state, input))
    }

    async fn update(&self, id: DbId, input: &UpdateRoute) -> Result<Option<Route>, sqlx::Error> {
        let mut state = self.state.lock().await;
        state.check()?;
        let Some(route) = state.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(alias) = &input.alias {
            route.alias = alias.clone();
        }
        if let Some(status) = input.status {
            route.status = status;
        }
        if let Some(body) = &input.body {
            route.body = body.clone();
        }
        route.updated_at = Utc::now();
        Ok(Some(route.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().await;
        state.check()?;
        let before = state.rows.len();
        state.rows.retain(|r| r.id != id);
        Ok(state.rows.len() < before)
    }
}
