//! MongoDB-backed implementation of the store traits.

mod admin;
mod knowledge_base;
mod school;
mod student;
mod study_program;
mod university;

use async_trait::async_trait;
use bson::Document;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::repository::{Store, StoreResult};

#[derive(Clone, Debug)]
pub struct MongoStore {
    manager: DatabaseManager,
}

impl MongoStore {
    pub fn new(manager: DatabaseManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &DatabaseManager {
        &self.manager
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.manager.database().collection(name)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn health_check(&self) -> StoreResult<()> {
        self.manager.health_check().await
    }
}

/// `$set` body for a patch, always stamping `updated_at`.
fn set_document<P: Serialize>(
    patch: &P,
    updated_at: Option<DateTime<Utc>>,
) -> Result<Document, DatabaseError> {
    let mut set = bson::to_document(patch)?;
    set.insert("updated_at", now_bson(updated_at));
    Ok(set)
}

fn now_bson(at: Option<DateTime<Utc>>) -> bson::DateTime {
    bson::DateTime::from_chrono(at.unwrap_or_else(Utc::now))
}

async fn find_all<T>(
    collection: &Collection<T>,
    filter: Document,
    options: impl Into<Option<FindOptions>>,
) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection.find(filter, options).await?;
    Ok(cursor.try_collect().await?)
}

fn page_options(page: crate::filter::Page) -> FindOptions {
    FindOptions::builder()
        .skip(page.skip())
        .limit(page.size as i64)
        .sort(bson::doc! { "_id": 1 })
        .build()
}
