use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Collection;

use super::{find_all, set_document, MongoStore};
use crate::database::models::{collections, University, UniversityPatch};
use crate::database::repository::{StoreResult, UniversityStore};
use crate::filter::equals_ci;

impl MongoStore {
    fn universities(&self) -> Collection<University> {
        self.collection(collections::UNIVERSITIES)
    }
}

#[async_trait]
impl UniversityStore for MongoStore {
    async fn insert_university(&self, university: &University) -> StoreResult<()> {
        self.universities().insert_one(university, None).await?;
        Ok(())
    }

    async fn find_university(&self, id: &ObjectId) -> StoreResult<Option<University>> {
        Ok(self.universities().find_one(doc! { "_id": *id }, None).await?)
    }

    async fn find_university_by_name(&self, name: &str) -> StoreResult<Option<University>> {
        Ok(self
            .universities()
            .find_one(doc! { "name": equals_ci(name) }, None)
            .await?)
    }

    async fn find_universities(&self, ids: &[ObjectId]) -> StoreResult<Vec<University>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        find_all(&self.universities(), doc! { "_id": { "$in": ids.to_vec() } }, None).await
    }

    async fn list_universities(&self) -> StoreResult<Vec<University>> {
        find_all(&self.universities(), doc! {}, None).await
    }

    async fn update_university(&self, id: &ObjectId, patch: &UniversityPatch) -> StoreResult<bool> {
        let result = self
            .universities()
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": set_document(patch, patch.updated_at)? },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_university(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.universities().delete_one(doc! { "_id": *id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
