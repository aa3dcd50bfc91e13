use bson::oid::ObjectId;
use chrono::Utc;
use tracing::info;

use super::{found, ServiceError, ServiceResult};
use crate::database::models::{University, UniversityPatch};
use crate::database::SharedStore;

pub struct UniversityService {
    store: SharedStore,
}

impl UniversityService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, patch: UniversityPatch) -> ServiceResult<University> {
        let name = patch.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ServiceError::validation("university name is required"));
        }
        if self.store.find_university_by_name(name).await?.is_some() {
            return Err(ServiceError::duplicate(
                "university with the same name already exists",
            ));
        }

        let university = University::from_patch(patch, Utc::now());
        self.store.insert_university(&university).await?;
        info!("Created university {}", university.name);
        Ok(university)
    }

    pub async fn update(&self, id: &ObjectId, mut patch: UniversityPatch) -> ServiceResult<University> {
        if let Some(name) = patch.name.as_deref() {
            if let Some(other) = self.store.find_university_by_name(name).await? {
                if other.id != *id {
                    return Err(ServiceError::duplicate(
                        "university with the same name already exists",
                    ));
                }
            }
        }
        patch.updated_at = Some(Utc::now());
        found(self.store.update_university(id, &patch).await?, "university")?;
        self.get(id).await
    }

    pub async fn delete(&self, id: &ObjectId) -> ServiceResult<()> {
        found(self.store.delete_university(id).await?, "university")?;
        info!("Deleted university {}", id);
        Ok(())
    }

    pub async fn get(&self, id: &ObjectId) -> ServiceResult<University> {
        self.store
            .find_university(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("university not found"))
    }

    pub async fn by_name(&self, name: &str) -> ServiceResult<University> {
        self.store
            .find_university_by_name(name.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("university not found"))
    }

    pub async fn list(&self) -> ServiceResult<Vec<University>> {
        Ok(self.store.list_universities().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn named(name: &str) -> UniversityPatch {
        UniversityPatch { name: Some(name.into()), ..Default::default() }
    }

    #[tokio::test]
    async fn names_are_unique_ignoring_case() {
        let ctx = TestContext::new();
        let universities = &ctx.state.universities;

        universities.create(named("Universitas Indonesia")).await.unwrap();
        let again = universities.create(named("universitas indonesia")).await;
        assert!(matches!(again, Err(ServiceError::Duplicate(_))));

        let found = universities.by_name("UNIVERSITAS INDONESIA").await.unwrap();
        assert_eq!(found.name, "Universitas Indonesia");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let ctx = TestContext::new();
        let result = ctx.state.universities.get(&ObjectId::new()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_then_delete() {
        let ctx = TestContext::new();
        let universities = &ctx.state.universities;
        let ui = universities.create(named("UI")).await.unwrap();

        let updated = universities
            .update(&ui.id, UniversityPatch { alias: Some("UI Depok".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.alias, "UI Depok");
        assert_eq!(updated.name, "UI");

        universities.delete(&ui.id).await.unwrap();
        assert!(universities.list().await.unwrap().is_empty());
        assert!(matches!(universities.delete(&ui.id).await, Err(ServiceError::NotFound(_))));
    }
}
