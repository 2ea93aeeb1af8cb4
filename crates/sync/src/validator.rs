use nodealias_core::alias::{self as rules, ValidationResult};
use nodealias_core::types::DbId;

use crate::error::SyncError;
use crate::store::RouteStore;

/// Runs the `route_alias` rules before a content save.
#[derive(Clone)]
pub struct AliasValidator<S> {
    store: S,
}

impl<S: RouteStore> AliasValidator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Evaluate both rules for `alias` as submitted by `owner_id`.
    ///
    /// `owner_id` is `None` for a node that has not been inserted yet, in
    /// which case any existing route with the alias is a conflict. The
    /// store is only consulted for non-empty aliases.
    pub async fn validate(
        &self,
        alias: &str,
        owner_id: Option<DbId>,
    ) -> Result<ValidationResult, SyncError> {
        let uniqueness = if rules::needs_uniqueness_lookup(alias) {
            let conflicts = self.store.count_alias_conflicts(alias, owner_id).await?;
            rules::is_unique(alias, conflicts)
        } else {
            true
        };

        let result = ValidationResult {
            uniqueness,
            charset: rules::is_charset_valid(alias),
        };
        if !result.is_valid() {
            tracing::debug!(alias, ?owner_id, ?result, "Alias rejected");
        }
        Ok(result)
    }

    /// Like [`validate`](Self::validate), but fails with
    /// [`SyncError::Validation`] when any rule fails.
    pub async fn ensure_valid(&self, alias: &str, owner_id: Option<DbId>) -> Result<(), SyncError> {
        self.validate(alias, owner_id).await?.into_result()?;
        Ok(())
    }
}
