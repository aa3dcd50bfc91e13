use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{info, warn};

use super::{found, ServiceError, ServiceResult};
use crate::database::models::{KnowledgeProgram, StudyProgram, StudyProgramPatch, University};
use crate::database::SharedStore;
use crate::filter::{Page, Paged, StudyProgramFilter};

/// A study program with the university it belongs to, when that still exists.
#[derive(Debug, Clone)]
pub struct StudyProgramWithUniversity {
    pub study_program: StudyProgram,
    pub university: Option<University>,
}

pub struct StudyProgramService {
    store: SharedStore,
}

impl StudyProgramService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Insert the program and reference it from `kp_name` in the `kb_year` catalog.
    pub async fn create(
        &self,
        patch: StudyProgramPatch,
        kb_year: &str,
        kp_name: &str,
    ) -> ServiceResult<StudyProgram> {
        let name = patch.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ServiceError::validation("study program name is required"));
        }
        self.catalog_program(kb_year, kp_name).await?;

        let program = StudyProgram::new(
            name,
            patch.program_details.unwrap_or_default(),
            Utc::now(),
        );
        self.store.insert_study_program(&program).await?;
        self.store.link_study_program(kb_year, kp_name, &program.id).await?;

        info!("Created study program {} in {}/{}", program.id, kb_year, kp_name);
        Ok(program)
    }

    pub async fn update(&self, id: &ObjectId, mut patch: StudyProgramPatch) -> ServiceResult<StudyProgram> {
        patch.updated_at = Some(Utc::now());
        found(self.store.update_study_program(id, &patch).await?, "study program")?;
        self.store
            .find_study_program(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("study program not found"))
    }

    /// Delete, then drop every catalog reference. A failure after the delete
    /// leaves dangling references behind.
    pub async fn delete(&self, id: &ObjectId) -> ServiceResult<()> {
        found(self.store.delete_study_program(id).await?, "study program")?;
        let unlinked = self.store.unlink_study_program(id).await?;
        info!("Deleted study program {} ({} catalogs updated)", id, unlinked);
        Ok(())
    }

    pub async fn get(&self, id: &ObjectId) -> ServiceResult<StudyProgramWithUniversity> {
        let study_program = self
            .store
            .find_study_program(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("study program not found"))?;
        let university = match study_program.program_details.university {
            Some(uid) => self.store.find_university(&uid).await?,
            None => None,
        };
        Ok(StudyProgramWithUniversity { study_program, university })
    }

    pub async fn list(
        &self,
        filter: &StudyProgramFilter,
        page: Page,
    ) -> ServiceResult<Paged<StudyProgramWithUniversity>> {
        filter.validate()?;
        let program = self.catalog_program(&filter.kb_year, &filter.kp_name).await?;

        let (records, total) = self
            .store
            .list_study_programs(&program.study_programs, filter, page)
            .await?;

        let university_ids: Vec<ObjectId> = records
            .iter()
            .filter_map(|p| p.program_details.university)
            .collect();
        let universities: HashMap<ObjectId, University> = self
            .store
            .find_universities(&university_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let joined = records
            .into_iter()
            .map(|study_program| {
                let university = study_program
                    .program_details
                    .university
                    .and_then(|uid| universities.get(&uid).cloned());
                if university.is_none() {
                    warn!("Study program {} has no matching university", study_program.id);
                }
                StudyProgramWithUniversity { study_program, university }
            })
            .collect();

        Ok(Paged::new(page, total, joined))
    }

    /// The named program of the catalog for `year`. Missing either is NotFound.
    pub(crate) async fn catalog_program(&self, year: &str, name: &str) -> ServiceResult<KnowledgeProgram> {
        let kb = self
            .store
            .find_knowledge_base_by_year(year)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("knowledge base {} not found", year)))?;
        kb.program(name)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(format!("knowledge program {} not found", name)))
    }
}
