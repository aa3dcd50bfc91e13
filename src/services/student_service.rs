use bson::oid::ObjectId;
use chrono::Utc;
use tracing::info;

use super::{found, ServiceError, ServiceResult};
use crate::database::models::{
    NewTrackRecord, School, Student, StudentPatch, TrackLobby, TrackRecord,
};
use crate::database::SharedStore;
use crate::filter::{Page, Paged, StudentFilter};

pub struct StudentService {
    store: SharedStore,
}

impl StudentService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, mut patch: StudentPatch) -> ServiceResult<Student> {
        let name = patch.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ServiceError::validation("student name is required"));
        }
        if self.store.find_student_by_name(name).await?.is_some() {
            return Err(ServiceError::duplicate("student already exists"));
        }
        if let Some(email) = patch.email.as_deref().filter(|e| !e.is_empty()) {
            if self.store.find_student_by_email(email).await?.is_some() {
                return Err(ServiceError::duplicate("a user with this email already exists"));
            }
        }

        if let Some(school) = patch.school.as_deref() {
            patch.school_id = self.ensure_school(school).await?;
        }

        let student = Student::from_patch(patch, Utc::now());
        self.store.insert_student(&student).await?;
        info!("Created student {}", student.id);
        Ok(student)
    }

    pub async fn list(&self, filter: &StudentFilter, page: Page) -> ServiceResult<Paged<Student>> {
        let (records, total) = self.store.list_students(filter, page).await?;
        Ok(Paged::new(page, total, records))
    }

    pub async fn get(&self, id: &ObjectId) -> ServiceResult<Student> {
        self.store
            .find_student(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("student not found"))
    }

    pub async fn update(&self, id: &ObjectId, mut patch: StudentPatch) -> ServiceResult<Student> {
        if let Some(email) = patch.email.as_deref().filter(|e| !e.is_empty()) {
            if let Some(other) = self.store.find_student_by_email(email).await? {
                if other.id != *id {
                    return Err(ServiceError::duplicate("a user with this email already exists"));
                }
            }
        }
        if let Some(school) = patch.school.as_deref() {
            patch.school_id = self.ensure_school(school).await?;
        }
        patch.updated_at = Some(Utc::now());

        found(self.store.update_student(id, &patch).await?, "student")?;
        self.get(id).await
    }

    pub async fn delete(&self, id: &ObjectId) -> ServiceResult<()> {
        found(self.store.delete_student(id).await?, "student")?;
        info!("Deleted student {}", id);
        Ok(())
    }

    pub async fn deactivate(&self, id: &ObjectId) -> ServiceResult<()> {
        let patch = StudentPatch {
            is_active: Some(false),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        found(self.store.update_student(id, &patch).await?, "student")
    }

    /// Returns how many students were reactivated.
    pub async fn activate_all(&self) -> ServiceResult<u64> {
        let count = self.store.activate_all_students().await?;
        info!("Activated {} students", count);
        Ok(count)
    }

    pub async fn add_service(&self, id: &ObjectId, fields: NewTrackRecord) -> ServiceResult<TrackRecord> {
        if fields.service_name.trim().is_empty() {
            return Err(ServiceError::validation("service_name is required"));
        }
        let student = self.get(id).await?;
        if student.has_service(&fields.service_name) {
            return Err(ServiceError::duplicate("service already exists"));
        }

        let record = TrackRecord::new(fields, Utc::now());
        found(self.store.push_track_record(id, &record).await?, "student")?;
        Ok(record)
    }

    pub async fn update_service(
        &self,
        id: &ObjectId,
        old_name: &str,
        fields: NewTrackRecord,
    ) -> ServiceResult<TrackRecord> {
        let student = self.get(id).await?;
        let existing = student
            .track_records
            .iter()
            .find(|r| r.service_name == old_name)
            .ok_or_else(|| ServiceError::not_found("service not found"))?;
        if fields.service_name != old_name && student.has_service(&fields.service_name) {
            return Err(ServiceError::duplicate("service already exists"));
        }

        let record = existing.revised(fields, Utc::now());
        found(self.store.replace_track_record(id, old_name, &record).await?, "service")?;
        Ok(record)
    }

    pub async fn delete_service(&self, id: &ObjectId, service_name: &str) -> ServiceResult<()> {
        self.get(id).await?;
        found(self.store.pull_track_record(id, service_name).await?, "service")
    }

    pub async fn add_lobby(&self, id: &ObjectId, progress: &str) -> ServiceResult<TrackLobby> {
        if progress.trim().is_empty() {
            return Err(ServiceError::validation("progress is required"));
        }
        let lobby = TrackLobby::new(progress, Utc::now());
        found(self.store.push_track_lobby(id, &lobby).await?, "student")?;
        Ok(lobby)
    }

    /// Find a school by name (case-insensitive) or create it.
    async fn ensure_school(&self, name: &str) -> ServiceResult<Option<ObjectId>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(school) = self.store.find_school_by_name(name).await? {
            return Ok(Some(school.id));
        }
        let school = School::named(name, Utc::now());
        self.store.insert_school(&school).await?;
        info!("Created school {}", school.name);
        Ok(Some(school.id))
    }
}
