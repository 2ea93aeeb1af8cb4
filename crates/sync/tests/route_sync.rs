//! End-to-end tests for route synchronization.
//!
//! Drives the synchronizer through node saves and deletes over the
//! in-memory store, writing a real routes file in a temp directory:
//! - Create, update in place, delete on blank alias, delete with node
//! - Disabled and status-less routes stay out of the file
//! - Regeneration is idempotent and serialized
//! - The view cache is cleared after every mutation

use std::path::PathBuf;

use assert_matches::assert_matches;
use futures::future::join_all;
use nodealias_core::content::ContentSubmission;
use nodealias_sync::{
    AliasValidator, MemoryRouteStore, RouteFileGenerator, RouteSynchronizer, SyncAction,
    ViewCacheDir,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    _dir: TempDir,
    routes_file: PathBuf,
    cache_dir: PathBuf,
    store: MemoryRouteStore,
    sync: RouteSynchronizer<MemoryRouteStore, Option<ViewCacheDir>>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let routes_file = dir.path().join("routes.php");
        std::fs::write(&routes_file, "").expect("seed routes file");
        let cache_dir = dir.path().join("views");
        std::fs::create_dir(&cache_dir).expect("cache dir");

        let store = MemoryRouteStore::new();
        let sync = RouteSynchronizer::new(
            store.clone(),
            Some(ViewCacheDir::new(&cache_dir)),
            &routes_file,
        );
        Self {
            _dir: dir,
            routes_file,
            cache_dir,
            store,
            sync,
        }
    }

    fn routes_text(&self) -> String {
        std::fs::read_to_string(&self.routes_file).expect("read routes file")
    }
}

fn about_page(alias: &str) -> ContentSubmission {
    ContentSubmission::new(5, "page", "about")
        .with_alias(alias)
        .with_status(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_with_alias_creates_route_and_writes_file() {
    let fx = Fixture::new();

    let result = fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();

    assert_matches!(result.action, SyncAction::Created { .. });
    let routes = fx.store.all().await;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].alias, "about-us");
    assert_eq!(routes[0].node_id, 5);
    assert!(routes[0].status);

    let report = result.report.expect("report");
    assert!(report.written, "{}", report.diagnostics);
    assert!(fx.routes_text().contains(
        "CroogoRouter::connect('/about-us', array('plugin' => 'nodes', 'controller' => 'nodes', \
         'action' => 'view', 'type' => 'page', 'slug' => 'about'));"
    ));
}

#[tokio::test]
async fn blank_alias_deletes_existing_route() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();

    let result = fx.sync.on_content_saved(&about_page("")).await.unwrap();

    assert_matches!(result.action, SyncAction::Deleted { .. });
    assert!(fx.store.all().await.is_empty());
    assert!(!fx.routes_text().contains("about-us"));
}

#[tokio::test]
async fn whitespace_alias_counts_as_blank() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();

    let result = fx.sync.on_content_saved(&about_page("   ")).await.unwrap();

    assert_matches!(result.action, SyncAction::Deleted { .. });
}

#[tokio::test]
async fn resave_updates_route_in_place() {
    let fx = Fixture::new();
    let created = fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();
    let SyncAction::Created { route_id } = created.action else {
        panic!("expected create, got {:?}", created.action);
    };

    let moved = ContentSubmission::new(5, "page", "company")
        .with_alias("company")
        .with_status(true);
    let result = fx.sync.on_content_saved(&moved).await.unwrap();

    assert_eq!(result.action, SyncAction::Updated { route_id });
    let routes = fx.store.all().await;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].id, route_id);
    assert_eq!(routes[0].alias, "company");

    let text = fx.routes_text();
    assert!(!text.contains("'/about-us'"));
    assert!(text.contains("'/company'"));
    assert!(text.contains("'slug' => 'company'"));
}

#[tokio::test]
async fn absent_status_stores_disabled_route_outside_file() {
    let fx = Fixture::new();
    let content = ContentSubmission::new(7, "blog", "hello").with_alias("hello");

    fx.sync.on_content_saved(&content).await.unwrap();

    let routes = fx.store.all().await;
    assert_eq!(routes.len(), 1);
    assert!(!routes[0].status);
    assert!(!fx.routes_text().contains("'/hello'"));
}

#[tokio::test]
async fn unchecking_status_removes_route_from_file() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();

    let disabled = about_page("about-us").with_status(false);
    fx.sync.on_content_saved(&disabled).await.unwrap();

    assert_eq!(fx.store.all().await.len(), 1);
    assert!(!fx.routes_text().contains("about-us"));
}

#[tokio::test]
async fn deleting_node_deletes_route_once() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();

    let first = fx.sync.on_content_deleted(5).await.unwrap();
    assert_matches!(first.action, SyncAction::Deleted { .. });
    assert!(fx.store.all().await.is_empty());
    assert!(!fx.routes_text().contains("about-us"));

    let second = fx.sync.on_content_deleted(5).await.unwrap();
    assert_eq!(second.action, SyncAction::Unchanged);
    assert!(second.report.is_none());
}

#[tokio::test]
async fn deleting_node_leaves_other_routes() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();
    let contact = ContentSubmission::new(6, "page", "contact")
        .with_alias("contact")
        .with_status(true);
    fx.sync.on_content_saved(&contact).await.unwrap();

    fx.sync.on_content_deleted(5).await.unwrap();

    let text = fx.routes_text();
    assert!(!text.contains("about-us"));
    assert!(text.contains("'/contact'"));
}

#[tokio::test]
async fn mutations_clear_view_cache() {
    let fx = Fixture::new();
    let cached = fx.cache_dir.join("pages_about.php");
    std::fs::write(&cached, "stale").unwrap();

    let result = fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();

    assert!(result.cache_error.is_none());
    assert!(!cached.exists());
}

#[tokio::test]
async fn publishing_twice_is_byte_identical() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("about-us")).await.unwrap();
    let first = fx.routes_text();

    let report = fx.sync.publish().await;
    assert!(report.written);
    assert_eq!(fx.routes_text(), first);

    let generated = RouteFileGenerator::new(fx.store.clone()).generate().await.unwrap();
    assert_eq!(generated, first);
}

#[tokio::test]
async fn concurrent_saves_converge_on_table_state() {
    let fx = Fixture::new();
    let pages: Vec<ContentSubmission> = (1..=8)
        .map(|id| {
            ContentSubmission::new(id, "page", format!("p{id}"))
                .with_alias(format!("page-{id}"))
                .with_status(true)
        })
        .collect();

    let saves = pages.iter().map(|page| fx.sync.on_content_saved(page));
    for result in join_all(saves).await {
        result.unwrap();
    }

    let expected = RouteFileGenerator::new(fx.store.clone()).generate().await.unwrap();
    assert_eq!(fx.routes_text(), expected);
    for id in 1..=8 {
        assert!(expected.contains(&format!("'/page-{id}'")));
    }
}

#[tokio::test]
async fn validate_then_save_blocks_duplicate_alias() {
    let fx = Fixture::new();
    fx.sync.on_content_saved(&about_page("foo")).await.unwrap();
    let validator = AliasValidator::new(fx.store.clone());

    let other = validator.validate("foo", Some(2)).await.unwrap();
    assert!(!other.uniqueness);

    let owner = validator.validate("foo", Some(5)).await.unwrap();
    assert!(owner.is_valid());

    let slashed = validator.validate("/foo", Some(5)).await.unwrap();
    assert!(!slashed.charset);
}
