use bson::oid::ObjectId;
use chrono::Utc;
use tracing::info;

use super::{found, on_conflict, ServiceError, ServiceResult};
use crate::database::models::{KnowledgeBase, KnowledgeBasePatch, KnowledgeProgram};
use crate::database::SharedStore;

/// Yearly catalogs and the named program groups inside them.
pub struct KnowledgeService {
    store: SharedStore,
}

impl KnowledgeService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, year: &str, programs: Vec<KnowledgeProgram>) -> ServiceResult<KnowledgeBase> {
        let year = year.trim();
        if year.is_empty() {
            return Err(ServiceError::validation("year is required"));
        }
        if self.store.find_knowledge_base_by_year(year).await?.is_some() {
            return Err(ServiceError::duplicate("knowledge base for this year already exists"));
        }

        let kb = KnowledgeBase::new(year, programs, Utc::now());
        self.store
            .insert_knowledge_base(&kb)
            .await
            .map_err(on_conflict("knowledge base for this year already exists"))?;
        info!("Created knowledge base {}", kb.year);
        Ok(kb)
    }

    pub async fn update(&self, id: &ObjectId, mut patch: KnowledgeBasePatch) -> ServiceResult<KnowledgeBase> {
        patch.updated_at = Some(Utc::now());
        found(self.store.update_knowledge_base(id, &patch).await?, "knowledge base")?;
        self.get(id).await
    }

    pub async fn delete(&self, id: &ObjectId) -> ServiceResult<()> {
        found(self.store.delete_knowledge_base(id).await?, "knowledge base")?;
        info!("Deleted knowledge base {}", id);
        Ok(())
    }

    pub async fn get(&self, id: &ObjectId) -> ServiceResult<KnowledgeBase> {
        self.store
            .find_knowledge_base(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("knowledge base not found"))
    }

    pub async fn list(&self) -> ServiceResult<Vec<KnowledgeBase>> {
        Ok(self.store.list_knowledge_bases().await?)
    }

    pub async fn add_program(&self, id: &ObjectId, program: KnowledgeProgram) -> ServiceResult<()> {
        if program.name.trim().is_empty() {
            return Err(ServiceError::validation("program name is required"));
        }
        let kb = self.get(id).await?;
        if kb.program(&program.name).is_some() {
            return Err(ServiceError::duplicate("knowledge program already exists"));
        }
        found(self.store.push_knowledge_program(id, &program).await?, "knowledge base")
    }

    /// Replace the program currently called `old_name`.
    pub async fn update_program(
        &self,
        id: &ObjectId,
        old_name: &str,
        program: KnowledgeProgram,
    ) -> ServiceResult<()> {
        let kb = self.get(id).await?;
        if program.name != old_name && kb.program(&program.name).is_some() {
            return Err(ServiceError::duplicate("knowledge program already exists"));
        }
        found(
            self.store.replace_knowledge_program(id, old_name, &program).await?,
            "knowledge program",
        )
    }

    pub async fn remove_program(&self, id: &ObjectId, name: &str) -> ServiceResult<()> {
        self.get(id).await?;
        found(self.store.pull_knowledge_program(id, name).await?, "knowledge program")
    }

    pub async fn programs(&self, id: &ObjectId) -> ServiceResult<Vec<KnowledgeProgram>> {
        Ok(self.get(id).await?.programs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn program(name: &str) -> KnowledgeProgram {
        KnowledgeProgram { name: name.into(), display_name: name.to_uppercase(), ..Default::default() }
    }

    #[tokio::test]
    async fn program_lifecycle() {
        let ctx = TestContext::new();
        let kbs = &ctx.state.knowledge;
        let kb = kbs.create("2024", vec![program("saintek")]).await.unwrap();

        kbs.add_program(&kb.id, program("soshum")).await.unwrap();
        let dup = kbs.add_program(&kb.id, program("soshum")).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        kbs.update_program(&kb.id, "soshum", program("campuran")).await.unwrap();
        let names: Vec<_> = kbs.programs(&kb.id).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["saintek", "campuran"]);

        kbs.remove_program(&kb.id, "saintek").await.unwrap();
        let missing = kbs.remove_program(&kb.id, "saintek").await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn one_catalog_per_year() {
        let ctx = TestContext::new();
        ctx.state.knowledge.create("2024", vec![]).await.unwrap();
        let again = ctx.state.knowledge.create("2024", vec![]).await;
        assert!(matches!(again, Err(ServiceError::Duplicate(_))));
    }
}
