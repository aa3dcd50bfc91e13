//! In-process store used by the test harness and by `DATABASE_BACKEND=memory`.
//! Mirrors the query semantics of the MongoDB store closely enough for the
//! services to behave the same on either backend.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Admin, KnowledgeBase, KnowledgeBasePatch, KnowledgeProgram, School, SchoolPatch, Student,
    StudentPatch, StudyProgram, StudyProgramPatch, TokenRecord, TrackLobby, TrackRecord, University,
    UniversityPatch,
};
use crate::database::repository::{
    AdminStore, KnowledgeBaseStore, SchoolStore, Store, StoreResult, StudentStore,
    StudyProgramStore, UniversityStore,
};
use crate::filter::{Page, StudentFilter, StudyProgramFilter};

#[derive(Debug, Default)]
struct Collections {
    admins: Vec<Admin>,
    tokens: HashMap<String, TokenRecord>,
    token_history: Vec<TokenRecord>,
    schools: Vec<School>,
    students: Vec<Student>,
    universities: Vec<University>,
    study_programs: Vec<StudyProgram>,
    knowledge_bases: Vec<KnowledgeBase>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens ever issued, including replaced ones.
    pub async fn token_history_len(&self) -> usize {
        self.inner.read().await.token_history.len()
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn find_by_id<'a, T>(items: &'a mut [T], id: &ObjectId, key: fn(&T) -> ObjectId) -> Option<&'a mut T> {
    items.iter_mut().find(|item| key(item) == *id)
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &ObjectId, key: fn(&T) -> ObjectId) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != *id);
    items.len() != before
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.admins.iter().any(|a| a.username == admin.username) {
            return Err(DatabaseError::DuplicateKey(format!("username {}", admin.username)));
        }
        inner.admins.push(admin.clone());
        Ok(())
    }

    async fn find_admin_by_username(&self, username: &str) -> StoreResult<Option<Admin>> {
        let inner = self.inner.read().await;
        Ok(inner.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn find_admin(&self, id: &ObjectId) -> StoreResult<Option<Admin>> {
        let inner = self.inner.read().await;
        Ok(inner.admins.iter().find(|a| a.id == *id).cloned())
    }

    async fn replace_token(&self, token: &TokenRecord) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.tokens.insert(token.access_uuid.clone(), token.clone());
        inner.token_history.push(token.clone());
        Ok(())
    }

    async fn find_token(&self, access_token: &str) -> StoreResult<Option<TokenRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .values()
            .find(|t| t.access_token == access_token)
            .cloned())
    }

    async fn delete_token(&self, access_uuid: &str) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        Ok(inner.tokens.remove(access_uuid).map_or(0, |_| 1))
    }
}

#[async_trait]
impl SchoolStore for MemoryStore {
    async fn insert_school(&self, school: &School) -> StoreResult<()> {
        self.inner.write().await.schools.push(school.clone());
        Ok(())
    }

    async fn find_school_by_name(&self, name: &str) -> StoreResult<Option<School>> {
        let inner = self.inner.read().await;
        Ok(inner.schools.iter().find(|s| eq_ci(&s.name, name)).cloned())
    }

    async fn update_school(&self, id: &ObjectId, patch: &SchoolPatch) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(school) = find_by_id(&mut inner.schools, id, |s| s.id) else {
            return Ok(false);
        };
        school.apply(patch);
        if patch.updated_at.is_none() {
            school.updated_at = Utc::now();
        }
        Ok(true)
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn insert_student(&self, student: &Student) -> StoreResult<()> {
        self.inner.write().await.students.push(student.clone());
        Ok(())
    }

    async fn find_student(&self, id: &ObjectId) -> StoreResult<Option<Student>> {
        let inner = self.inner.read().await;
        Ok(inner.students.iter().find(|s| s.id == *id).cloned())
    }

    async fn find_student_by_name(&self, name: &str) -> StoreResult<Option<Student>> {
        let inner = self.inner.read().await;
        Ok(inner.students.iter().find(|s| s.name == name).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let inner = self.inner.read().await;
        Ok(inner.students.iter().find(|s| s.email == email).cloned())
    }

    async fn find_student_by_key(
        &self,
        name: &str,
        school: &str,
        phone: &str,
    ) -> StoreResult<Option<Student>> {
        let inner = self.inner.read().await;
        Ok(inner
            .students
            .iter()
            .find(|s| s.name == name && eq_ci(&s.school, school) && s.phone == phone)
            .cloned())
    }

    async fn list_students(
        &self,
        filter: &StudentFilter,
        page: Page,
    ) -> StoreResult<(Vec<Student>, u64)> {
        let inner = self.inner.read().await;
        let matched: Vec<Student> = inner
            .students
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        Ok((page.slice(&matched), matched.len() as u64))
    }

    async fn update_student(&self, id: &ObjectId, patch: &StudentPatch) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(student) = find_by_id(&mut inner.students, id, |s| s.id) else {
            return Ok(false);
        };
        student.apply(patch);
        if patch.updated_at.is_none() {
            student.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn delete_student(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.inner.write().await.students, id, |s| s.id))
    }

    async fn activate_all_students(&self) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let mut modified = 0;
        for student in inner.students.iter_mut().filter(|s| !s.is_active) {
            student.is_active = true;
            student.updated_at = now;
            modified += 1;
        }
        Ok(modified)
    }

    async fn push_track_record(&self, id: &ObjectId, record: &TrackRecord) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(student) = find_by_id(&mut inner.students, id, |s| s.id) else {
            return Ok(false);
        };
        student.track_records.push(record.clone());
        student.updated_at = Utc::now();
        Ok(true)
    }

    async fn replace_track_record(
        &self,
        id: &ObjectId,
        service_name: &str,
        record: &TrackRecord,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(student) = find_by_id(&mut inner.students, id, |s| s.id) else {
            return Ok(false);
        };
        let Some(existing) = student
            .track_records
            .iter_mut()
            .find(|r| r.service_name == service_name)
        else {
            return Ok(false);
        };
        *existing = record.clone();
        student.updated_at = Utc::now();
        Ok(true)
    }

    async fn pull_track_record(&self, id: &ObjectId, service_name: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(student) = find_by_id(&mut inner.students, id, |s| s.id) else {
            return Ok(false);
        };
        if !student.has_service(service_name) {
            return Ok(false);
        }
        student.track_records.retain(|r| r.service_name != service_name);
        student.updated_at = Utc::now();
        Ok(true)
    }

    async fn push_track_lobby(&self, id: &ObjectId, lobby: &TrackLobby) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(student) = find_by_id(&mut inner.students, id, |s| s.id) else {
            return Ok(false);
        };
        student.progress = lobby.progress.clone();
        student.track_lobby.push(lobby.clone());
        student.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl UniversityStore for MemoryStore {
    async fn insert_university(&self, university: &University) -> StoreResult<()> {
        self.inner.write().await.universities.push(university.clone());
        Ok(())
    }

    async fn find_university(&self, id: &ObjectId) -> StoreResult<Option<University>> {
        let inner = self.inner.read().await;
        Ok(inner.universities.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_university_by_name(&self, name: &str) -> StoreResult<Option<University>> {
        let inner = self.inner.read().await;
        Ok(inner.universities.iter().find(|u| eq_ci(&u.name, name)).cloned())
    }

    async fn find_universities(&self, ids: &[ObjectId]) -> StoreResult<Vec<University>> {
        let inner = self.inner.read().await;
        Ok(inner
            .universities
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_universities(&self) -> StoreResult<Vec<University>> {
        Ok(self.inner.read().await.universities.clone())
    }

    async fn update_university(&self, id: &ObjectId, patch: &UniversityPatch) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(university) = find_by_id(&mut inner.universities, id, |u| u.id) else {
            return Ok(false);
        };
        university.apply(patch);
        if patch.updated_at.is_none() {
            university.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn delete_university(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.inner.write().await.universities, id, |u| u.id))
    }
}

#[async_trait]
impl StudyProgramStore for MemoryStore {
    async fn insert_study_program(&self, program: &StudyProgram) -> StoreResult<()> {
        self.inner.write().await.study_programs.push(program.clone());
        Ok(())
    }

    async fn find_study_program(&self, id: &ObjectId) -> StoreResult<Option<StudyProgram>> {
        let inner = self.inner.read().await;
        Ok(inner.study_programs.iter().find(|p| p.id == *id).cloned())
    }

    async fn find_study_program_by_key(
        &self,
        name: &str,
        university: &ObjectId,
        program: &str,
    ) -> StoreResult<Option<StudyProgram>> {
        let inner = self.inner.read().await;
        Ok(inner
            .study_programs
            .iter()
            .find(|p| {
                p.name == name
                    && p.program_details.university.as_ref() == Some(university)
                    && p.program_details.program == program
            })
            .cloned())
    }

    async fn list_study_programs(
        &self,
        ids: &[ObjectId],
        filter: &StudyProgramFilter,
        page: Page,
    ) -> StoreResult<(Vec<StudyProgram>, u64)> {
        let inner = self.inner.read().await;
        let matched: Vec<StudyProgram> = inner
            .study_programs
            .iter()
            .filter(|p| ids.contains(&p.id) && filter.matches(p))
            .cloned()
            .collect();
        Ok((page.slice(&matched), matched.len() as u64))
    }

    async fn update_study_program(
        &self,
        id: &ObjectId,
        patch: &StudyProgramPatch,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(program) = find_by_id(&mut inner.study_programs, id, |p| p.id) else {
            return Ok(false);
        };
        program.apply(patch);
        if patch.updated_at.is_none() {
            program.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn delete_study_program(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.inner.write().await.study_programs, id, |p| p.id))
    }
}

#[async_trait]
impl KnowledgeBaseStore for MemoryStore {
    async fn insert_knowledge_base(&self, kb: &KnowledgeBase) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.knowledge_bases.iter().any(|other| other.year == kb.year) {
            return Err(DatabaseError::DuplicateKey(format!("year {}", kb.year)));
        }
        inner.knowledge_bases.push(kb.clone());
        Ok(())
    }

    async fn find_knowledge_base(&self, id: &ObjectId) -> StoreResult<Option<KnowledgeBase>> {
        let inner = self.inner.read().await;
        Ok(inner.knowledge_bases.iter().find(|kb| kb.id == *id).cloned())
    }

    async fn find_knowledge_base_by_year(&self, year: &str) -> StoreResult<Option<KnowledgeBase>> {
        let inner = self.inner.read().await;
        Ok(inner.knowledge_bases.iter().find(|kb| kb.year == year).cloned())
    }

    async fn list_knowledge_bases(&self) -> StoreResult<Vec<KnowledgeBase>> {
        Ok(self.inner.read().await.knowledge_bases.clone())
    }

    async fn update_knowledge_base(
        &self,
        id: &ObjectId,
        patch: &KnowledgeBasePatch,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(kb) = find_by_id(&mut inner.knowledge_bases, id, |kb| kb.id) else {
            return Ok(false);
        };
        kb.apply(patch);
        if patch.updated_at.is_none() {
            kb.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn delete_knowledge_base(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.inner.write().await.knowledge_bases, id, |kb| kb.id))
    }

    async fn push_knowledge_program(
        &self,
        id: &ObjectId,
        program: &KnowledgeProgram,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(kb) = find_by_id(&mut inner.knowledge_bases, id, |kb| kb.id) else {
            return Ok(false);
        };
        kb.programs.push(program.clone());
        kb.updated_at = Utc::now();
        Ok(true)
    }

    async fn replace_knowledge_program(
        &self,
        id: &ObjectId,
        old_name: &str,
        program: &KnowledgeProgram,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(kb) = find_by_id(&mut inner.knowledge_bases, id, |kb| kb.id) else {
            return Ok(false);
        };
        if kb.program(old_name).is_none() {
            return Ok(false);
        }
        for existing in kb.programs.iter_mut().filter(|p| p.name == old_name) {
            *existing = program.clone();
        }
        kb.updated_at = Utc::now();
        Ok(true)
    }

    async fn pull_knowledge_program(&self, id: &ObjectId, name: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(kb) = find_by_id(&mut inner.knowledge_bases, id, |kb| kb.id) else {
            return Ok(false);
        };
        if kb.program(name).is_none() {
            return Ok(false);
        }
        kb.programs.retain(|p| p.name != name);
        kb.updated_at = Utc::now();
        Ok(true)
    }

    async fn link_study_program(
        &self,
        year: &str,
        program_name: &str,
        study_program: &ObjectId,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(program) = inner
            .knowledge_bases
            .iter_mut()
            .find(|kb| kb.year == year && kb.program(program_name).is_some())
            .and_then(|kb| kb.program_mut(program_name))
        else {
            return Ok(false);
        };
        program.link(*study_program);
        Ok(true)
    }

    async fn unlink_study_program(&self, study_program: &ObjectId) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let mut modified = 0;
        for kb in inner.knowledge_bases.iter_mut() {
            let mut touched = false;
            for program in kb.programs.iter_mut() {
                let before = program.study_programs.len();
                program.study_programs.retain(|id| id != study_program);
                touched |= program.study_programs.len() != before;
            }
            if touched {
                modified += 1;
            }
        }
        Ok(modified)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb_with_program(year: &str, name: &str) -> KnowledgeBase {
        KnowledgeBase::new(
            year,
            vec![KnowledgeProgram { name: name.into(), ..Default::default() }],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn replacing_a_token_keeps_one_live_record() {
        let store = MemoryStore::new();
        let record = |token: &str| TokenRecord {
            id: ObjectId::new(),
            access_token: token.into(),
            access_uuid: "admin-1".into(),
            at_expires: Utc::now().timestamp() + 900,
            created_at: Utc::now(),
        };

        store.replace_token(&record("first")).await.unwrap();
        store.replace_token(&record("second")).await.unwrap();

        assert!(store.find_token("first").await.unwrap().is_none());
        assert!(store.find_token("second").await.unwrap().is_some());
        assert_eq!(store.token_history_len().await, 2);
    }

    #[tokio::test]
    async fn link_is_idempotent_and_unlink_clears_every_catalog() {
        let store = MemoryStore::new();
        store.insert_knowledge_base(&kb_with_program("2024", "saintek")).await.unwrap();
        store.insert_knowledge_base(&kb_with_program("2025", "saintek")).await.unwrap();
        let id = ObjectId::new();

        assert!(store.link_study_program("2024", "saintek", &id).await.unwrap());
        assert!(store.link_study_program("2024", "saintek", &id).await.unwrap());
        assert!(store.link_study_program("2025", "saintek", &id).await.unwrap());
        assert!(!store.link_study_program("2024", "soshum", &id).await.unwrap());

        let kb = store.find_knowledge_base_by_year("2024").await.unwrap().unwrap();
        assert_eq!(kb.program("saintek").unwrap().study_programs, vec![id]);

        assert_eq!(store.unlink_study_program(&id).await.unwrap(), 2);
        let kb = store.find_knowledge_base_by_year("2025").await.unwrap().unwrap();
        assert!(kb.program("saintek").unwrap().study_programs.is_empty());
    }

    #[tokio::test]
    async fn unique_fields_reject_a_second_insert() {
        let store = MemoryStore::new();
        let admin = |id: ObjectId| Admin {
            id,
            username: "root".into(),
            password: "hash".into(),
            email: String::new(),
            full_name: String::new(),
        };
        store.insert_admin(&admin(ObjectId::new())).await.unwrap();
        let again = store.insert_admin(&admin(ObjectId::new())).await;
        assert!(matches!(again, Err(DatabaseError::DuplicateKey(_))));

        store.insert_knowledge_base(&kb_with_program("2024", "saintek")).await.unwrap();
        let again = store.insert_knowledge_base(&kb_with_program("2024", "soshum")).await;
        assert!(matches!(again, Err(DatabaseError::DuplicateKey(_))));
        assert_eq!(store.list_knowledge_bases().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn activate_all_counts_only_inactive_students() {
        let store = MemoryStore::new();
        let mut inactive = Student::from_patch(
            StudentPatch { name: Some("Budi".into()), ..Default::default() },
            Utc::now(),
        );
        inactive.is_active = false;
        let active = Student::from_patch(
            StudentPatch { name: Some("Sari".into()), ..Default::default() },
            Utc::now(),
        );
        store.insert_student(&inactive).await.unwrap();
        store.insert_student(&active).await.unwrap();

        assert_eq!(store.activate_all_students().await.unwrap(), 1);
        assert_eq!(store.activate_all_students().await.unwrap(), 0);
    }
}
