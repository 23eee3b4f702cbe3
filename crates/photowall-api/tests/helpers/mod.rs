//! Test helpers: build AppState and router for integration tests.
//!
//! The app runs on `InMemoryCatalog` and a recording storage double, so these
//! tests need neither Docker nor network access.
//! Run from workspace root: `cargo test -p photowall-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum::Router;
use axum_test::TestServer;
use photowall_api::setup::routes::setup_routes;
use photowall_api::state::AppState;
use photowall_core::{BaseConfig, Config, LogFormat, PhotoWallConfig, StorageBackend};
use photowall_db::{InMemoryCatalog, PhotoCatalog};
use std::sync::Arc;

use self::storage::RecordingStorage;

/// Configuration tweaks for a test app.
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub thumbnail_enabled: bool,
    pub max_file_size_bytes: usize,
    pub stream_heartbeat_secs: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            thumbnail_enabled: false,
            max_file_size_bytes: 5 * 1024 * 1024,
            stream_heartbeat_secs: 60,
        }
    }
}

pub fn create_test_config(options: &TestOptions) -> Config {
    Config(Box::new(PhotoWallConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 5,
            environment: "test".to_string(),
            log_format: LogFormat::Compact,
            http_concurrency_limit: 64,
        },
        database_url: "postgres://unused".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        storage_public_url: None,
        local_storage_path: None,
        local_storage_base_url: None,
        images_account_id: None,
        images_api_token: None,
        images_account_hash: None,
        max_file_size_bytes: options.max_file_size_bytes,
        allowed_content_types: [
            "image/jpeg",
            "image/jpg",
            "image/png",
            "image/webp",
            "image/heic",
            "image/heif",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        thumbnail_enabled: options.thumbnail_enabled,
        thumbnail_max_dimension: 800,
        thumbnail_quality: 80,
        stream_heartbeat_secs: options.stream_heartbeat_secs,
        stream_buffer_size: 64,
        stream_snapshot_size: 10,
        photos_default_limit: 100,
        photos_max_limit: 10_000,
    }))
}

/// Test application: server plus direct handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub router: Router,
    pub state: Arc<AppState>,
    pub catalog: Arc<InMemoryCatalog>,
    pub storage: Arc<RecordingStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default())
}

pub fn setup_test_app_with(options: TestOptions) -> TestApp {
    let config = create_test_config(&options);
    let catalog = Arc::new(InMemoryCatalog::new());
    let storage = Arc::new(RecordingStorage::new());

    let state = Arc::new(AppState::new(
        config.clone(),
        catalog.clone(),
        storage.clone(),
    ));
    let router = setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router.clone()).expect("Failed to start test server");

    TestApp {
        server,
        router,
        state,
        catalog,
        storage,
    }
}

/// Create a batch through the API and assert it succeeded.
pub async fn create_batch(client: &TestServer, batch_id: &str, uploader: &str) {
    let response = client
        .post("/batch")
        .json(&serde_json::json!({
            "batchId": batch_id,
            "uploaderName": uploader,
            "comment": "Wedding table 4",
        }))
        .await;
    response.assert_status_ok();
}

/// Upload a small JPEG through the API and return the response body.
pub async fn upload_jpeg(
    client: &TestServer,
    batch_id: &str,
    file_id: &str,
) -> serde_json::Value {
    let response = client
        .post("/upload")
        .multipart(fixtures::jpeg_form(batch_id, Some(file_id), "party.jpg"))
        .await;
    response.assert_status_ok();
    response.json::<serde_json::Value>()
}

pub async fn visible_count(catalog: &InMemoryCatalog) -> i64 {
    catalog
        .get_total_photo_count(false)
        .await
        .expect("count photos")
}
