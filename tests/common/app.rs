use std::sync::Arc;

use axum_test::TestServer;
use api_catalog::build_router;
use api_catalog::config::Config;
use api_catalog::repositories::InMemoryStore;
use api_catalog::state::AppState;

/// Test application wrapper
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application on a fresh in-memory store
    pub fn new() -> Self {
        let state = AppState::with_store(Config::in_memory(), Arc::new(InMemoryStore::new()));

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state }
    }
}
