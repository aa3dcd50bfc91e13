use std::time::Duration;

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::database::models::collections;

/// Name of the student full-text index, shared with existing deployments.
pub const SEARCH_INDEX: &str = "SearchIndex";

const DUPLICATE_KEY: i32 = 11000;
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A unique index rejected the write.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Mongo(mongodb::error::Error),
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(err: mongodb::error::Error) -> Self {
        if error_code(&err) == Some(DUPLICATE_KEY) {
            DatabaseError::DuplicateKey(err.to_string())
        } else {
            DatabaseError::Mongo(err)
        }
    }
}

/// Server error code of a failed command or single write.
fn error_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => Some(e.code),
        ErrorKind::Command(e) => Some(e.code),
        _ => None,
    }
}

impl From<bson::ser::Error> for DatabaseError {
    fn from(err: bson::ser::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for DatabaseError {
    fn from(err: bson::de::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

/// Owns the MongoDB client and database handle.
#[derive(Clone, Debug)]
pub struct DatabaseManager {
    client: Client,
    database: Database,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let uri = config
            .uri
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("MONGODB_URI"))?;

        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        let timeout = Duration::from_secs(config.connection_timeout);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("elible-api".to_string());

        let client = Client::with_options(options)?;
        let database = client.database(&config.name);
        let manager = Self { client, database };

        // Fail at boot rather than on the first request
        manager
            .health_check()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Connected to MongoDB database: {}", config.name);
        Ok(manager)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Pings the server to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Create the indexes lookups and full-text search depend on. Indexes
    /// that already exist, including a text index created by an earlier
    /// deployment, are left alone.
    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        let students = self.collection(collections::STUDENTS);
        if has_text_index(&existing_indexes(&students).await?) {
            info!("Student text index already present");
        } else {
            let text_index = IndexModel::builder()
                .keys(doc! {
                    "name": "text",
                    "email": "text",
                    "school": "text",
                    "interest": "text",
                    "phone": "text",
                    "category": "text",
                })
                .options(
                    IndexOptions::builder()
                        .name(SEARCH_INDEX.to_string())
                        .weights(doc! {
                            "name": 10,
                            "email": 5,
                            "school": 5,
                            "interest": 3,
                            "phone": 3,
                            "category": 1,
                        })
                        .build(),
                )
                .build();
            students.create_index(text_index, None).await?;
        }

        self.ensure_unique(collections::ADMINS, "username").await?;
        self.ensure_unique(collections::TOKENS, "access_uuid").await?;
        self.ensure_unique(collections::KNOWLEDGE_BASES, "year").await?;

        info!("Ensured MongoDB indexes");
        Ok(())
    }

    async fn ensure_unique(&self, name: &str, field: &str) -> Result<(), DatabaseError> {
        let collection = self.collection(name);
        let existing = existing_indexes(&collection).await?;
        match single_field_index(&existing, field) {
            Some(index) if !is_unique(index) => {
                warn!("{}.{} has a non-unique index; leaving it in place", name, field);
                Ok(())
            }
            Some(_) => Ok(()),
            None => {
                let mut keys = Document::new();
                keys.insert(field, 1);
                let model = IndexModel::builder()
                    .keys(keys)
                    .options(IndexOptions::builder().unique(true).build())
                    .build();
                collection.create_index(model, None).await?;
                Ok(())
            }
        }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("Closed MongoDB client");
    }
}

/// Indexes on `collection`. A collection that does not exist yet has none.
async fn existing_indexes(collection: &Collection<Document>) -> Result<Vec<IndexModel>, DatabaseError> {
    match collection.list_indexes(None).await {
        Ok(cursor) => Ok(cursor.try_collect().await?),
        Err(e) if error_code(&e) == Some(NAMESPACE_NOT_FOUND) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// MongoDB allows one text index per collection, whatever its name or keys.
pub(crate) fn has_text_index(indexes: &[IndexModel]) -> bool {
    indexes.iter().any(|index| {
        index_name(index) == Some(SEARCH_INDEX)
            || index.keys.values().any(|v| matches!(v, Bson::String(s) if s == "text"))
    })
}

fn index_name(index: &IndexModel) -> Option<&str> {
    index.options.as_ref().and_then(|o| o.name.as_deref())
}

fn single_field_index<'a>(indexes: &'a [IndexModel], field: &str) -> Option<&'a IndexModel> {
    indexes
        .iter()
        .find(|index| index.keys.len() == 1 && index.keys.contains_key(field))
}

fn is_unique(index: &IndexModel) -> bool {
    index.options.as_ref().and_then(|o| o.unique).unwrap_or(false)
}
