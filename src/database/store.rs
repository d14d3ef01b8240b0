use async_trait::async_trait;

use crate::{
    error::{Error, ErrorKind},
    schema::{
        Attribute, AttributeKind, AttributePatch, Id, NewUser, Recipe, RecipeDraft, RecipeFilter,
        RecipePatch, User,
    },
};

/// Persistence for users and their resources.
///
/// Every operation that takes an `owner` is scoped to that user inside the
/// query itself: a record owned by someone else behaves exactly like a
/// record that does not exist and yields a `NotFound` error. Each call is
/// atomic, a failed write leaves no partial state behind.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Inserts a user whose password is already hashed. Fails with a
    /// validation error when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    async fn get_user_by_id(&self, id: Id) -> Result<Option<User>, Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Lists the owner's attributes, name descending. With `assigned_only`
    /// only attributes referenced by at least one recipe are returned, each once.
    async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: Id,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, Error>;

    /// Returns the owner's attribute with this exact name, creating it if missing.
    async fn get_or_create_attribute(
        &self,
        kind: AttributeKind,
        owner: Id,
        name: &str,
    ) -> Result<Attribute, Error>;

    /// Renaming onto a name the owner already uses is a validation error.
    async fn update_attribute(
        &self,
        kind: AttributeKind,
        owner: Id,
        id: Id,
        patch: AttributePatch,
    ) -> Result<Attribute, Error>;

    async fn delete_attribute(&self, kind: AttributeKind, owner: Id, id: Id) -> Result<(), Error>;

    /// Unscoped lookup. Never reachable from a request path.
    async fn find_attribute(&self, kind: AttributeKind, id: Id) -> Result<Option<Attribute>, Error>;

    async fn attribute_exists(&self, kind: AttributeKind, id: Id) -> Result<bool, Error> {
        Ok(self.find_attribute(kind, id).await?.is_some())
    }

    /// Lists the owner's recipes, newest first. Non-empty filter lists keep
    /// recipes linked to any of the given ids; both lists must match when both are set.
    async fn list_recipes(&self, owner: Id, filter: &RecipeFilter) -> Result<Vec<Recipe>, Error>;

    async fn get_recipe(&self, owner: Id, id: Id) -> Result<Recipe, Error>;

    async fn create_recipe(&self, owner: Id, draft: RecipeDraft) -> Result<Recipe, Error>;

    async fn update_recipe(&self, owner: Id, id: Id, patch: RecipePatch) -> Result<Recipe, Error>;

    /// Removes the recipe and its links. Linked tags and ingredients stay.
    async fn delete_recipe(&self, owner: Id, id: Id) -> Result<(), Error>;

    async fn recipe_exists(&self, id: Id) -> Result<bool, Error>;
}

/// Names are unique per owner and kind.
pub fn duplicate_name(kind: AttributeKind) -> Error {
    ErrorKind::Validation.new(&format!("{} with this name already exists.", kind.label()))
}
