pub mod attributes;
pub mod recipes;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{Error, QueryError},
    schema::{
        Attribute, AttributeKind, AttributePatch, Id, NewUser, Recipe, RecipeDraft, RecipeFilter,
        RecipePatch, User,
    },
    store::ResourceStore,
};

/// PostgreSQL-backed store. Table layout lives in `sql/schema.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        users::register_user(user, &self.pool).await
    }

    async fn get_user_by_id(&self, id: Id) -> Result<Option<User>, Error> {
        users::get_user_by_id(&self.pool, id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        users::get_user(&self.pool, email).await
    }

    async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: Id,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, Error> {
        attributes::list_attributes(kind, owner, assigned_only, &self.pool).await
    }

    async fn get_or_create_attribute(
        &self,
        kind: AttributeKind,
        owner: Id,
        name: &str,
    ) -> Result<Attribute, Error> {
        let mut tr = self
            .pool
            .begin()
            .await
            .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

        let attribute = attributes::get_or_create_attribute(kind, owner, name, &mut *tr).await?;

        tr.commit()
            .await
            .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
        Ok(attribute)
    }

    async fn update_attribute(
        &self,
        kind: AttributeKind,
        owner: Id,
        id: Id,
        patch: AttributePatch,
    ) -> Result<Attribute, Error> {
        attributes::update_attribute(kind, owner, id, patch, &self.pool).await
    }

    async fn delete_attribute(&self, kind: AttributeKind, owner: Id, id: Id) -> Result<(), Error> {
        attributes::delete_attribute(kind, owner, id, &self.pool).await
    }

    async fn find_attribute(&self, kind: AttributeKind, id: Id) -> Result<Option<Attribute>, Error> {
        attributes::find_attribute(kind, id, &self.pool).await
    }

    async fn list_recipes(&self, owner: Id, filter: &RecipeFilter) -> Result<Vec<Recipe>, Error> {
        recipes::fetch_recipes(owner, filter, &self.pool).await
    }

    async fn get_recipe(&self, owner: Id, id: Id) -> Result<Recipe, Error> {
        recipes::get_recipe(owner, id, &self.pool).await
    }

    async fn create_recipe(&self, owner: Id, draft: RecipeDraft) -> Result<Recipe, Error> {
        recipes::create_recipe(owner, draft, &self.pool).await
    }

    async fn update_recipe(&self, owner: Id, id: Id, patch: RecipePatch) -> Result<Recipe, Error> {
        recipes::update_recipe(owner, id, patch, &self.pool).await
    }

    async fn delete_recipe(&self, owner: Id, id: Id) -> Result<(), Error> {
        recipes::delete_recipe(owner, id, &self.pool).await
    }

    async fn recipe_exists(&self, id: Id) -> Result<bool, Error> {
        recipes::recipe_exists(id, &self.pool).await
    }
}
