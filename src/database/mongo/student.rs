use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Collection;

use super::{find_all, now_bson, page_options, set_document, MongoStore};
use crate::database::models::{collections, Student, StudentPatch, TrackLobby, TrackRecord};
use crate::database::repository::{StoreResult, StudentStore};
use crate::filter::{equals_ci, Page, StudentFilter};

impl MongoStore {
    fn students(&self) -> Collection<Student> {
        self.collection(collections::STUDENTS)
    }
}

#[async_trait]
impl StudentStore for MongoStore {
    async fn insert_student(&self, student: &Student) -> StoreResult<()> {
        self.students().insert_one(student, None).await?;
        Ok(())
    }

    async fn find_student(&self, id: &ObjectId) -> StoreResult<Option<Student>> {
        Ok(self.students().find_one(doc! { "_id": *id }, None).await?)
    }

    async fn find_student_by_name(&self, name: &str) -> StoreResult<Option<Student>> {
        Ok(self.students().find_one(doc! { "name": name }, None).await?)
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        Ok(self.students().find_one(doc! { "email": email }, None).await?)
    }

    async fn find_student_by_key(
        &self,
        name: &str,
        school: &str,
        phone: &str,
    ) -> StoreResult<Option<Student>> {
        let filter = doc! {
            "name": name,
            "school": equals_ci(school),
            "phone": phone,
        };
        Ok(self.students().find_one(filter, None).await?)
    }

    async fn list_students(
        &self,
        filter: &StudentFilter,
        page: Page,
    ) -> StoreResult<(Vec<Student>, u64)> {
        let query = filter.to_document();
        let total = self.students().count_documents(query.clone(), None).await?;
        let records = find_all(&self.students(), query, page_options(page)).await?;
        Ok((records, total))
    }

    async fn update_student(&self, id: &ObjectId, patch: &StudentPatch) -> StoreResult<bool> {
        let result = self
            .students()
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": set_document(patch, patch.updated_at)? },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_student(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.students().delete_one(doc! { "_id": *id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn activate_all_students(&self) -> StoreResult<u64> {
        let result = self
            .students()
            .update_many(
                doc! { "is_active": { "$ne": true } },
                doc! { "$set": { "is_active": true, "updated_at": now_bson(None) } },
                None,
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn push_track_record(&self, id: &ObjectId, record: &TrackRecord) -> StoreResult<bool> {
        let result = self
            .students()
            .update_one(
                doc! { "_id": *id },
                doc! {
                    "$push": { "track_records": bson::to_bson(record)? },
                    "$set": { "updated_at": now_bson(None) },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn replace_track_record(
        &self,
        id: &ObjectId,
        service_name: &str,
        record: &TrackRecord,
    ) -> StoreResult<bool> {
        let result = self
            .students()
            .update_one(
                doc! { "_id": *id, "track_records.service_name": service_name },
                doc! {
                    "$set": {
                        "track_records.$": bson::to_bson(record)?,
                        "updated_at": now_bson(None),
                    },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn pull_track_record(&self, id: &ObjectId, service_name: &str) -> StoreResult<bool> {
        let result = self
            .students()
            .update_one(
                doc! { "_id": *id, "track_records.service_name": service_name },
                doc! {
                    "$pull": { "track_records": { "service_name": service_name } },
                    "$set": { "updated_at": now_bson(None) },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn push_track_lobby(&self, id: &ObjectId, lobby: &TrackLobby) -> StoreResult<bool> {
        let result = self
            .students()
            .update_one(
                doc! { "_id": *id },
                doc! {
                    "$push": { "track_lobby": bson::to_bson(lobby)? },
                    "$set": {
                        "progress": lobby.progress.as_str(),
                        "updated_at": now_bson(None),
                    },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
