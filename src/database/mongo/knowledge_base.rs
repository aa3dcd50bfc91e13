use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::UpdateOptions;
use mongodb::Collection;

use super::{find_all, now_bson, set_document, MongoStore};
use crate::database::models::{collections, KnowledgeBase, KnowledgeBasePatch, KnowledgeProgram};
use crate::database::repository::{KnowledgeBaseStore, StoreResult};

impl MongoStore {
    fn knowledge_bases(&self) -> Collection<KnowledgeBase> {
        self.collection(collections::KNOWLEDGE_BASES)
    }
}

#[async_trait]
impl KnowledgeBaseStore for MongoStore {
    async fn insert_knowledge_base(&self, kb: &KnowledgeBase) -> StoreResult<()> {
        self.knowledge_bases().insert_one(kb, None).await?;
        Ok(())
    }

    async fn find_knowledge_base(&self, id: &ObjectId) -> StoreResult<Option<KnowledgeBase>> {
        Ok(self.knowledge_bases().find_one(doc! { "_id": *id }, None).await?)
    }

    async fn find_knowledge_base_by_year(&self, year: &str) -> StoreResult<Option<KnowledgeBase>> {
        Ok(self.knowledge_bases().find_one(doc! { "year": year }, None).await?)
    }

    async fn list_knowledge_bases(&self) -> StoreResult<Vec<KnowledgeBase>> {
        find_all(&self.knowledge_bases(), doc! {}, None).await
    }

    async fn update_knowledge_base(
        &self,
        id: &ObjectId,
        patch: &KnowledgeBasePatch,
    ) -> StoreResult<bool> {
        let result = self
            .knowledge_bases()
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": set_document(patch, patch.updated_at)? },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_knowledge_base(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.knowledge_bases().delete_one(doc! { "_id": *id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn push_knowledge_program(
        &self,
        id: &ObjectId,
        program: &KnowledgeProgram,
    ) -> StoreResult<bool> {
        let result = self
            .knowledge_bases()
            .update_one(
                doc! { "_id": *id },
                doc! {
                    "$push": { "programs": bson::to_bson(program)? },
                    "$set": { "updated_at": now_bson(None) },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn replace_knowledge_program(
        &self,
        id: &ObjectId,
        old_name: &str,
        program: &KnowledgeProgram,
    ) -> StoreResult<bool> {
        let options = UpdateOptions::builder()
            .array_filters(vec![doc! { "elem.name": old_name }])
            .build();
        let result = self
            .knowledge_bases()
            .update_one(
                doc! { "_id": *id, "programs.name": old_name },
                doc! {
                    "$set": {
                        "programs.$[elem]": bson::to_bson(program)?,
                        "updated_at": now_bson(None),
                    },
                },
                options,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn pull_knowledge_program(&self, id: &ObjectId, name: &str) -> StoreResult<bool> {
        let result = self
            .knowledge_bases()
            .update_one(
                doc! { "_id": *id, "programs.name": name },
                doc! {
                    "$pull": { "programs": { "name": name } },
                    "$set": { "updated_at": now_bson(None) },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// A single `$addToSet` replaces a read-then-push: linking an id that is
    /// already present is a no-op instead of a second query.
    async fn link_study_program(
        &self,
        year: &str,
        program_name: &str,
        study_program: &ObjectId,
    ) -> StoreResult<bool> {
        let result = self
            .knowledge_bases()
            .update_one(
                doc! { "year": year, "programs.name": program_name },
                doc! { "$addToSet": { "programs.$.study_programs": *study_program } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn unlink_study_program(&self, study_program: &ObjectId) -> StoreResult<u64> {
        let result = self
            .knowledge_bases()
            .update_many(
                doc! { "programs.study_programs": *study_program },
                doc! { "$pull": { "programs.$[].study_programs": *study_program } },
                None,
            )
            .await?;
        Ok(result.modified_count)
    }
}
