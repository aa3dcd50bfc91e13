use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Admin, KnowledgeBase, KnowledgeBasePatch, KnowledgeProgram, School, SchoolPatch, Student,
    StudentPatch, StudyProgram, StudyProgramPatch, TokenRecord, TrackLobby, TrackRecord, University,
    UniversityPatch,
};
use crate::filter::{Page, StudentFilter, StudyProgramFilter};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Admin accounts and their access tokens.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()>;
    async fn find_admin_by_username(&self, username: &str) -> StoreResult<Option<Admin>>;
    async fn find_admin(&self, id: &ObjectId) -> StoreResult<Option<Admin>>;

    /// Drop any live token for the same `access_uuid`, store `token`, and append
    /// it to the token history.
    async fn replace_token(&self, token: &TokenRecord) -> StoreResult<()>;
    async fn find_token(&self, access_token: &str) -> StoreResult<Option<TokenRecord>>;
    async fn delete_token(&self, access_uuid: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait SchoolStore: Send + Sync {
    async fn insert_school(&self, school: &School) -> StoreResult<()>;
    /// Case-insensitive exact match on the name.
    async fn find_school_by_name(&self, name: &str) -> StoreResult<Option<School>>;
    async fn update_school(&self, id: &ObjectId, patch: &SchoolPatch) -> StoreResult<bool>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn insert_student(&self, student: &Student) -> StoreResult<()>;
    async fn find_student(&self, id: &ObjectId) -> StoreResult<Option<Student>>;
    async fn find_student_by_name(&self, name: &str) -> StoreResult<Option<Student>>;
    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>>;
    /// Import key lookup. The school name is compared case-insensitively.
    async fn find_student_by_key(
        &self,
        name: &str,
        school: &str,
        phone: &str,
    ) -> StoreResult<Option<Student>>;
    async fn list_students(
        &self,
        filter: &StudentFilter,
        page: Page,
    ) -> StoreResult<(Vec<Student>, u64)>;
    async fn update_student(&self, id: &ObjectId, patch: &StudentPatch) -> StoreResult<bool>;
    async fn delete_student(&self, id: &ObjectId) -> StoreResult<bool>;
    async fn activate_all_students(&self) -> StoreResult<u64>;

    async fn push_track_record(&self, id: &ObjectId, record: &TrackRecord) -> StoreResult<bool>;
    async fn replace_track_record(
        &self,
        id: &ObjectId,
        service_name: &str,
        record: &TrackRecord,
    ) -> StoreResult<bool>;
    async fn pull_track_record(&self, id: &ObjectId, service_name: &str) -> StoreResult<bool>;
    /// Append a lobby entry and set the student's current progress to match.
    async fn push_track_lobby(&self, id: &ObjectId, lobby: &TrackLobby) -> StoreResult<bool>;
}

#[async_trait]
pub trait UniversityStore: Send + Sync {
    async fn insert_university(&self, university: &University) -> StoreResult<()>;
    async fn find_university(&self, id: &ObjectId) -> StoreResult<Option<University>>;
    /// Case-insensitive exact match on the name.
    async fn find_university_by_name(&self, name: &str) -> StoreResult<Option<University>>;
    async fn find_universities(&self, ids: &[ObjectId]) -> StoreResult<Vec<University>>;
    async fn list_universities(&self) -> StoreResult<Vec<University>>;
    async fn update_university(&self, id: &ObjectId, patch: &UniversityPatch) -> StoreResult<bool>;
    async fn delete_university(&self, id: &ObjectId) -> StoreResult<bool>;
}

#[async_trait]
pub trait StudyProgramStore: Send + Sync {
    async fn insert_study_program(&self, program: &StudyProgram) -> StoreResult<()>;
    async fn find_study_program(&self, id: &ObjectId) -> StoreResult<Option<StudyProgram>>;
    /// Import key lookup on `{name, university, program}`.
    async fn find_study_program_by_key(
        &self,
        name: &str,
        university: &ObjectId,
        program: &str,
    ) -> StoreResult<Option<StudyProgram>>;
    async fn list_study_programs(
        &self,
        ids: &[ObjectId],
        filter: &StudyProgramFilter,
        page: Page,
    ) -> StoreResult<(Vec<StudyProgram>, u64)>;
    async fn update_study_program(
        &self,
        id: &ObjectId,
        patch: &StudyProgramPatch,
    ) -> StoreResult<bool>;
    async fn delete_study_program(&self, id: &ObjectId) -> StoreResult<bool>;
}

#[async_trait]
pub trait KnowledgeBaseStore: Send + Sync {
    async fn insert_knowledge_base(&self, kb: &KnowledgeBase) -> StoreResult<()>;
    async fn find_knowledge_base(&self, id: &ObjectId) -> StoreResult<Option<KnowledgeBase>>;
    async fn find_knowledge_base_by_year(&self, year: &str) -> StoreResult<Option<KnowledgeBase>>;
    async fn list_knowledge_bases(&self) -> StoreResult<Vec<KnowledgeBase>>;
    async fn update_knowledge_base(
        &self,
        id: &ObjectId,
        patch: &KnowledgeBasePatch,
    ) -> StoreResult<bool>;
    async fn delete_knowledge_base(&self, id: &ObjectId) -> StoreResult<bool>;

    async fn push_knowledge_program(
        &self,
        id: &ObjectId,
        program: &KnowledgeProgram,
    ) -> StoreResult<bool>;
    /// Replace the program currently named `old_name`.
    async fn replace_knowledge_program(
        &self,
        id: &ObjectId,
        old_name: &str,
        program: &KnowledgeProgram,
    ) -> StoreResult<bool>;
    async fn pull_knowledge_program(&self, id: &ObjectId, name: &str) -> StoreResult<bool>;

    /// Reference `study_program` from the named program of the `year` catalog.
    /// Idempotent: an id already present is not added twice. Returns whether the
    /// catalog entry was found.
    async fn link_study_program(
        &self,
        year: &str,
        program_name: &str,
        study_program: &ObjectId,
    ) -> StoreResult<bool>;
    /// Remove every reference to `study_program` across all catalogs.
    async fn unlink_study_program(&self, study_program: &ObjectId) -> StoreResult<u64>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store:
    AdminStore + SchoolStore + StudentStore + UniversityStore + StudyProgramStore + KnowledgeBaseStore
{
    async fn health_check(&self) -> StoreResult<()>;
}

pub type SharedStore = Arc<dyn Store>;
