use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Collection;

use super::{set_document, MongoStore};
use crate::database::models::{collections, School, SchoolPatch};
use crate::database::repository::{SchoolStore, StoreResult};
use crate::filter::equals_ci;

impl MongoStore {
    fn schools(&self) -> Collection<School> {
        self.collection(collections::SCHOOLS)
    }
}

#[async_trait]
impl SchoolStore for MongoStore {
    async fn insert_school(&self, school: &School) -> StoreResult<()> {
        self.schools().insert_one(school, None).await?;
        Ok(())
    }

    async fn find_school_by_name(&self, name: &str) -> StoreResult<Option<School>> {
        Ok(self.schools().find_one(doc! { "name": equals_ci(name) }, None).await?)
    }

    async fn update_school(&self, id: &ObjectId, patch: &SchoolPatch) -> StoreResult<bool> {
        let result = self
            .schools()
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": set_document(patch, patch.updated_at)? },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
