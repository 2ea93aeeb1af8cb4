use nodealias_core::route_body::RouteBody;
use nodealias_core::routes_file::render_routes_file;

use crate::error::SyncError;
use crate::store::RouteStore;

/// Builds the routes file text from the enabled routes.
///
/// Output depends only on the current table contents, so generating twice
/// without intervening changes yields identical text.
#[derive(Clone)]
pub struct RouteFileGenerator<S> {
    store: S,
}

impl<S: RouteStore> RouteFileGenerator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Render one registration per enabled route, in store order.
    ///
    /// Routes whose body cannot be decoded are skipped and logged; they
    /// never abort generation of the others.
    pub async fn generate(&self) -> Result<String, SyncError> {
        let routes = self.store.list_enabled().await?;

        let mut entries = Vec::with_capacity(routes.len());
        for route in &routes {
            match RouteBody::decode(&route.body) {
                Ok(body) => entries.push((route.alias.as_str(), body)),
                Err(e) => {
                    tracing::warn!(
                        route_id = route.id,
                        node_id = route.node_id,
                        alias = %route.alias,
                        error = %e,
                        "Skipping route with unreadable body",
                    );
                }
            }
        }

        tracing::debug!(
            enabled = routes.len(),
            rendered = entries.len(),
            "Routes file generated"
        );
        Ok(render_routes_file(
            entries.iter().map(|(alias, body)| (*alias, body)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRouteStore;

    fn json_body(content_type: &str, slug: &str) -> String {
        RouteBody::for_node(content_type, slug).encode().unwrap()
    }

    #[tokio::test]
    async fn only_enabled_routes_are_rendered() {
        let store = MemoryRouteStore::new();
        store
            .insert_raw("about-us", 5, true, &json_body("page", "about"))
            .await;
        store
            .insert_raw("draft", 6, false, &json_body("page", "draft"))
            .await;

        let text = RouteFileGenerator::new(store).generate().await.unwrap();
        assert!(text.contains("CroogoRouter::connect('/about-us'"));
        assert!(!text.contains("draft"));
    }

    #[tokio::test]
    async fn malformed_bodies_are_skipped() {
        let store = MemoryRouteStore::new();
        store.insert_raw("broken", 1, true, "phpinfo()").await;
        store
            .insert_raw("legacy", 2, true, "array('plugin' => 'nodes', 'controller' => 'nodes', 'action' => 'view', 'type' => 'blog', 'slug' => 'hello')")
            .await;
        store.insert_raw("empty", 3, true, "").await;
        store
            .insert_raw("good", 4, true, &json_body("page", "about"))
            .await;

        let text = RouteFileGenerator::new(store).generate().await.unwrap();
        assert!(!text.contains("'/broken'"));
        assert!(!text.contains("'/empty'"));
        assert!(text.contains("'/legacy'"));
        assert!(text.contains("'type' => 'blog', 'slug' => 'hello'"));
        assert!(text.contains("'/good'"));
    }

    #[tokio::test]
    async fn generation_is_idempotent() {
        let store = MemoryRouteStore::new();
        store.insert_raw("b", 1, true, &json_body("page", "b")).await;
        store.insert_raw("a", 2, true, &json_body("page", "a")).await;
        let generator = RouteFileGenerator::new(store);

        let first = generator.generate().await.unwrap();
        let second = generator.generate().await.unwrap();
        assert_eq!(first, second);
        assert!(first.find("'/b'").unwrap() < first.find("'/a'").unwrap());
    }
}
