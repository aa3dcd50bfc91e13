use std::sync::Arc;

use tempfile::TempDir;

use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::state::AppState;

/// Application state over a fresh in-memory store. Images land in a temporary
/// directory that lives as long as the context.
pub struct TestContext {
    pub state: AppState,
    pub image_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let image_dir = tempfile::tempdir().expect("create temp image dir");
        let image_path = image_dir.path().to_string_lossy().into_owned();

        let config = AppConfig::from_lookup(|key| match key {
            "APP_ENV" => Some("development".to_string()),
            "DATABASE_BACKEND" => Some("memory".to_string()),
            "JWT_SECRET" => Some("test-secret".to_string()),
            "BCRYPT_COST" => Some("4".to_string()),
            "IMAGE_DIR" => Some(image_path.clone()),
            "WEB_DOMAIN" => Some("http://localhost:8080".to_string()),
            _ => None,
        })
        .expect("test config");

        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        Self { state, image_dir }
    }
}
