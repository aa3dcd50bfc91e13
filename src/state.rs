use std::sync::Arc;

use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::{AppConfig, DatabaseBackend};
use crate::database::{DatabaseError, DatabaseManager, MemoryStore, MongoStore, SharedStore};
use crate::services::{
    AdminService, ImageService, ImportService, KnowledgeService, StudentService,
    StudyProgramService, UniversityService,
};

/// Everything a handler can reach. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub admins: Arc<AdminService>,
    pub students: Arc<StudentService>,
    pub universities: Arc<UniversityService>,
    pub study_programs: Arc<StudyProgramService>,
    pub knowledge: Arc<KnowledgeService>,
    pub images: Arc<ImageService>,
    pub imports: Arc<ImportService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        let issuer = TokenIssuer::from_config(&config.security);

        Self {
            admins: Arc::new(AdminService::new(
                store.clone(),
                issuer,
                config.security.bcrypt_cost,
            )),
            students: Arc::new(StudentService::new(store.clone())),
            universities: Arc::new(UniversityService::new(store.clone())),
            study_programs: Arc::new(StudyProgramService::new(store.clone())),
            knowledge: Arc::new(KnowledgeService::new(store.clone())),
            images: Arc::new(ImageService::from_config(&config.storage)),
            imports: Arc::new(ImportService::new(
                store.clone(),
                config.storage.upload_dir.clone(),
            )),
            config: Arc::new(config),
            store,
        }
    }

    /// Open the configured backend and wire the services onto it.
    pub async fn connect(config: AppConfig) -> Result<Self, DatabaseError> {
        let store = open_store(&config).await?;
        Ok(Self::new(config, store))
    }
}

pub async fn open_store(config: &AppConfig) -> Result<SharedStore, DatabaseError> {
    match config.database.backend {
        DatabaseBackend::MongoDb => {
            let manager = DatabaseManager::connect(&config.database).await?;
            manager.ensure_indexes().await?;
            Ok(Arc::new(MongoStore::new(manager)))
        }
        DatabaseBackend::Memory => {
            info!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
