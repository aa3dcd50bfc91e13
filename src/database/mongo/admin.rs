use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Collection;

use super::MongoStore;
use crate::database::models::{collections, Admin, TokenRecord};
use crate::database::repository::{AdminStore, StoreResult};

impl MongoStore {
    fn admins(&self) -> Collection<Admin> {
        self.collection(collections::ADMINS)
    }

    fn tokens(&self) -> Collection<TokenRecord> {
        self.collection(collections::TOKENS)
    }

    fn token_history(&self) -> Collection<TokenRecord> {
        self.collection(collections::TOKEN_HISTORY)
    }
}

#[async_trait]
impl AdminStore for MongoStore {
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        self.admins().insert_one(admin, None).await?;
        Ok(())
    }

    async fn find_admin_by_username(&self, username: &str) -> StoreResult<Option<Admin>> {
        Ok(self.admins().find_one(doc! { "username": username }, None).await?)
    }

    async fn find_admin(&self, id: &ObjectId) -> StoreResult<Option<Admin>> {
        Ok(self.admins().find_one(doc! { "_id": *id }, None).await?)
    }

    async fn replace_token(&self, token: &TokenRecord) -> StoreResult<()> {
        self.tokens()
            .delete_many(doc! { "access_uuid": token.access_uuid.as_str() }, None)
            .await?;
        self.tokens().insert_one(token, None).await?;
        self.token_history().insert_one(token, None).await?;
        Ok(())
    }

    async fn find_token(&self, access_token: &str) -> StoreResult<Option<TokenRecord>> {
        Ok(self
            .tokens()
            .find_one(doc! { "access_token": access_token }, None)
            .await?)
    }

    async fn delete_token(&self, access_uuid: &str) -> StoreResult<u64> {
        let result = self
            .tokens()
            .delete_many(doc! { "access_uuid": access_uuid }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
