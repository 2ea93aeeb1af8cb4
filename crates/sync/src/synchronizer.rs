//! Keeps a node's route in step with its latest save or delete.
//!
//! | existing route | submitted alias | action                          |
//! |----------------|-----------------|---------------------------------|
//! | none           | empty           | nothing                         |
//! | none           | non-empty       | create                          |
//! | exists         | empty           | delete                          |
//! | exists         | non-empty       | update alias, status and body   |
//!
//! Every mutation clears the response cache and rebuilds the routes file.
//! Both steps run after the node change has committed; their failures are
//! logged and reported in the [`SyncResult`], never returned as errors.

use std::path::{Path, PathBuf};

use nodealias_core::content::{AliasRequest, ContentSubmission};
use nodealias_core::route_body::RouteBody;
use nodealias_core::types::DbId;
use nodealias_db::models::route::{CreateRoute, UpdateRoute};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::CacheInvalidator;
use crate::error::SyncError;
use crate::generator::RouteFileGenerator;
use crate::reporter::{FileWriteReporter, WriteReport};
use crate::store::RouteStore;

/// What happened to the node's route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// The save carried no `route_alias` field; routes were not consulted.
    Skipped,
    /// Routes were consulted and already matched the node.
    Unchanged,
    Created { route_id: DbId },
    Updated { route_id: DbId },
    Deleted { route_id: DbId },
}

impl SyncAction {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Updated { .. } | Self::Deleted { .. }
        )
    }
}

/// Outcome of one synchronization call.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    /// `None` only for a skipped save of a node that has no id yet.
    pub node_id: Option<DbId>,
    pub action: SyncAction,
    /// Set when the response cache could not be cleared.
    pub cache_error: Option<String>,
    /// Present whenever the routes file was rebuilt.
    pub report: Option<WriteReport>,
}

impl SyncResult {
    fn untouched(node_id: Option<DbId>, action: SyncAction) -> Self {
        Self {
            node_id,
            action,
            cache_error: None,
            report: None,
        }
    }
}

fn node_body(content: &ContentSubmission) -> Result<String, SyncError> {
    Ok(RouteBody::for_node(&content.content_type, &content.slug).encode()?)
}

/// Applies node saves and deletes to the route store.
pub struct RouteSynchronizer<S, C> {
    store: S,
    cache: C,
    routes_file: PathBuf,
    /// Serializes generate-and-write so concurrent saves cannot interleave
    /// partial files.
    publish_lock: Mutex<()>,
}

impl<S, C> RouteSynchronizer<S, C>
where
    S: RouteStore + Clone,
    C: CacheInvalidator,
{
    pub fn new(store: S, cache: C, routes_file: impl Into<PathBuf>) -> Self {
        Self {
            store,
            cache,
            routes_file: routes_file.into(),
            publish_lock: Mutex::new(()),
        }
    }

    pub fn routes_file(&self) -> &Path {
        &self.routes_file
    }

    /// Call after a node save has committed.
    ///
    /// A save without a `route_alias` field is skipped before anything
    /// else, so a fresh node without an id is not an error in that case.
    /// An absent `route_status` is stored as disabled. A store failure is
    /// returned as [`SyncError::Store`], never mistaken for "no route".
    pub async fn on_content_saved(
        &self,
        content: &ContentSubmission,
    ) -> Result<SyncResult, SyncError> {
        let alias = match content.alias_request() {
            AliasRequest::Absent => {
                tracing::debug!(node_id = ?content.id, "No route alias submitted, skipping");
                return Ok(SyncResult::untouched(content.id, SyncAction::Skipped));
            }
            AliasRequest::Empty => None,
            AliasRequest::Alias(alias) => Some(alias),
        };
        let node_id = content.id.ok_or(SyncError::MissingContentId)?;

        let existing = self.store.find_by_node(node_id).await?;

        let action = match (existing, alias) {
            (None, None) => {
                return Ok(SyncResult::untouched(Some(node_id), SyncAction::Unchanged));
            }
            (None, Some(alias)) => self.create_route(node_id, alias, content).await?,
            (Some(route), None) => {
                self.store.delete(route.id).await?;
                tracing::info!(node_id, route_id = route.id, alias = %route.alias, "Route deleted");
                SyncAction::Deleted { route_id: route.id }
            }
            (Some(route), Some(alias)) => {
                let status = content.status_enabled();
                let input = UpdateRoute {
                    alias: Some(alias.to_string()),
                    status: Some(status),
                    body: Some(node_body(content)?),
                };
                match self.store.update(route.id, &input).await? {
                    Some(_) => {
                        tracing::info!(node_id, route_id = route.id, alias, status, "Route updated");
                        SyncAction::Updated { route_id: route.id }
                    }
                    None => {
                        // Removed between lookup and update by a concurrent delete.
                        tracing::warn!(node_id, route_id = route.id, "Route vanished before update");
                        self.create_route(node_id, alias, content).await?
                    }
                }
            }
        };

        Ok(self.after_mutation(node_id, action).await)
    }

    async fn create_route(
        &self,
        node_id: DbId,
        alias: &str,
        content: &ContentSubmission,
    ) -> Result<SyncAction, SyncError> {
        let status = content.status_enabled();
        let route = self
            .store
            .create(&CreateRoute {
                alias: alias.to_string(),
                node_id,
                status,
                body: node_body(content)?,
            })
            .await?;
        tracing::info!(node_id, route_id = route.id, alias, status, "Route created");
        Ok(SyncAction::Created { route_id: route.id })
    }

    /// Call after a node delete has committed. Deleting a node without a
    /// route, or deleting twice, is a no-op.
    pub async fn on_content_deleted(&self, node_id: DbId) -> Result<SyncResult, SyncError> {
        let Some(route) = self.store.find_by_node(node_id).await? else {
            return Ok(SyncResult::untouched(Some(node_id), SyncAction::Unchanged));
        };

        self.store.delete(route.id).await?;
        tracing::info!(node_id, route_id = route.id, alias = %route.alias, "Route deleted with node");

        Ok(self
            .after_mutation(node_id, SyncAction::Deleted { route_id: route.id })
            .await)
    }

    /// Clear the cache and rebuild the routes file without touching any
    /// route, e.g. after fixing file permissions.
    pub async fn refresh(&self) -> (Option<String>, WriteReport) {
        let cache_error = self.invalidate_cache().await;
        (cache_error, self.publish().await)
    }

    /// Regenerate the routes file from the current table and write it.
    pub async fn publish(&self) -> WriteReport {
        let _guard = self.publish_lock.lock().await;

        let content = match RouteFileGenerator::new(self.store.clone()).generate().await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %self.routes_file.display(), error = %e, "Routes file generation failed");
                return WriteReport::generation_failed(&self.routes_file, e);
            }
        };

        let path = self.routes_file.clone();
        match tokio::task::spawn_blocking(move || FileWriteReporter::write_generated(&path, &content))
            .await
        {
            Ok(report) => report,
            Err(e) => WriteReport::generation_failed(
                &self.routes_file,
                format!("write task failed: {e}"),
            ),
        }
    }

    async fn after_mutation(&self, node_id: DbId, action: SyncAction) -> SyncResult {
        let cache_error = self.invalidate_cache().await;
        let report = self.publish().await;
        SyncResult {
            node_id: Some(node_id),
            action,
            cache_error,
            report: Some(report),
        }
    }

    async fn invalidate_cache(&self) -> Option<String> {
        match self.cache.invalidate().await {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Response cache invalidation failed");
                Some(e.to_string())
            }
        }
    }
}
