use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Collection;

use super::{find_all, page_options, set_document, MongoStore};
use crate::database::models::{collections, StudyProgram, StudyProgramPatch};
use crate::database::repository::{StoreResult, StudyProgramStore};
use crate::filter::{Page, StudyProgramFilter};

impl MongoStore {
    fn study_programs(&self) -> Collection<StudyProgram> {
        self.collection(collections::STUDY_PROGRAMS)
    }
}

#[async_trait]
impl StudyProgramStore for MongoStore {
    async fn insert_study_program(&self, program: &StudyProgram) -> StoreResult<()> {
        self.study_programs().insert_one(program, None).await?;
        Ok(())
    }

    async fn find_study_program(&self, id: &ObjectId) -> StoreResult<Option<StudyProgram>> {
        Ok(self.study_programs().find_one(doc! { "_id": *id }, None).await?)
    }

    async fn find_study_program_by_key(
        &self,
        name: &str,
        university: &ObjectId,
        program: &str,
    ) -> StoreResult<Option<StudyProgram>> {
        let filter = doc! {
            "name": name,
            "program_details.university": *university,
            "program_details.program": program,
        };
        Ok(self.study_programs().find_one(filter, None).await?)
    }

    async fn list_study_programs(
        &self,
        ids: &[ObjectId],
        filter: &StudyProgramFilter,
        page: Page,
    ) -> StoreResult<(Vec<StudyProgram>, u64)> {
        let query = filter.to_document(ids);
        let total = self.study_programs().count_documents(query.clone(), None).await?;
        let records = find_all(&self.study_programs(), query, page_options(page)).await?;
        Ok((records, total))
    }

    async fn update_study_program(
        &self,
        id: &ObjectId,
        patch: &StudyProgramPatch,
    ) -> StoreResult<bool> {
        let result = self
            .study_programs()
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": set_document(patch, patch.updated_at)? },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_study_program(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.study_programs().delete_one(doc! { "_id": *id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
