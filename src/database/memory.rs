use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    error::{Error, ErrorKind},
    schema::{
        Attribute, AttributeKind, AttributePatch, Id, NewUser, Recipe, RecipeDraft, RecipeFilter,
        RecipePatch, RecipeRow, User,
    },
    store::{duplicate_name, ResourceStore},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<Id, User>,
    tags: BTreeMap<Id, Attribute>,
    ingredients: BTreeMap<Id, Attribute>,
    recipes: BTreeMap<Id, RecipeRow>,
    // (recipe_id, attribute_id)
    recipe_tags: BTreeSet<(Id, Id)>,
    recipe_ingredients: BTreeSet<(Id, Id)>,
    last_id: Id,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn attributes(&self, kind: AttributeKind) -> &BTreeMap<Id, Attribute> {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }

    fn attributes_mut(&mut self, kind: AttributeKind) -> &mut BTreeMap<Id, Attribute> {
        match kind {
            AttributeKind::Tag => &mut self.tags,
            AttributeKind::Ingredient => &mut self.ingredients,
        }
    }

    fn links(&self, kind: AttributeKind) -> &BTreeSet<(Id, Id)> {
        match kind {
            AttributeKind::Tag => &self.recipe_tags,
            AttributeKind::Ingredient => &self.recipe_ingredients,
        }
    }

    fn links_mut(&mut self, kind: AttributeKind) -> &mut BTreeSet<(Id, Id)> {
        match kind {
            AttributeKind::Tag => &mut self.recipe_tags,
            AttributeKind::Ingredient => &mut self.recipe_ingredients,
        }
    }

    fn get_or_create_attribute(&mut self, kind: AttributeKind, owner: Id, name: &str) -> Attribute {
        if let Some(existing) = self
            .attributes(kind)
            .values()
            .find(|a| a.user_id == owner && a.name == name)
        {
            return existing.clone();
        }

        let attribute = Attribute {
            id: self.next_id(),
            name: name.to_string(),
            user_id: owner,
        };
        self.attributes_mut(kind)
            .insert(attribute.id, attribute.clone());
        log::debug!("Created {} {} for user {}", kind.label(), attribute.id, owner);
        attribute
    }

    fn set_recipe_attributes(&mut self, kind: AttributeKind, owner: Id, recipe_id: Id, names: &[String]) {
        self.links_mut(kind).retain(|(recipe, _)| *recipe != recipe_id);

        for name in names {
            let attribute = self.get_or_create_attribute(kind, owner, name);
            self.links_mut(kind).insert((recipe_id, attribute.id));
        }
    }

    fn linked_attributes(&self, kind: AttributeKind, recipe_id: Id) -> Vec<Attribute> {
        let attributes = self.attributes(kind);
        self.links(kind)
            .range((recipe_id, Id::MIN)..=(recipe_id, Id::MAX))
            .filter_map(|(_, id)| attributes.get(id).cloned())
            .collect()
    }

    fn recipe(&self, row: &RecipeRow) -> Recipe {
        Recipe::from_row(
            row.clone(),
            self.linked_attributes(AttributeKind::Tag, row.id),
            self.linked_attributes(AttributeKind::Ingredient, row.id),
        )
    }

    fn owned_recipe(&self, owner: Id, id: Id) -> Result<&RecipeRow, Error> {
        self.recipes
            .get(&id)
            .filter(|row| row.user_id == owner)
            .ok_or_else(|| ErrorKind::NotFound.default())
    }

    fn matches(&self, kind: AttributeKind, recipe_id: Id, ids: &[Id]) -> bool {
        ids.is_empty()
            || ids
                .iter()
                .any(|id| self.links(kind).contains(&(recipe_id, *id)))
    }
}

/// Keeps every table in process memory behind one lock. Each trait call
/// holds the lock for its whole duration, which makes it atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, Error> {
        self.tables
            .lock()
            .map_err(|_| ErrorKind::Internal.new("Store lock poisoned"))
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let mut tables = self.lock()?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(ErrorKind::Validation.new("user with this email already exists."));
        }

        let user = User {
            id: tables.next_id(),
            email: user.email,
            name: user.name,
            password: user.password,
            is_active: true,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Id) -> Result<Option<User>, Error> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: Id,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, Error> {
        let tables = self.lock()?;

        let assigned: BTreeSet<Id> = tables.links(kind).iter().map(|(_, id)| *id).collect();

        let mut rows: Vec<Attribute> = tables
            .attributes(kind)
            .values()
            .filter(|a| a.user_id == owner)
            .filter(|a| !assigned_only || assigned.contains(&a.id))
            .cloned()
            .collect();

        // Byte order, as `COLLATE "C"` in PostgreSQL.
        rows.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get_or_create_attribute(
        &self,
        kind: AttributeKind,
        owner: Id,
        name: &str,
    ) -> Result<Attribute, Error> {
        Ok(self.lock()?.get_or_create_attribute(kind, owner, name))
    }

    async fn update_attribute(
        &self,
        kind: AttributeKind,
        owner: Id,
        id: Id,
        patch: AttributePatch,
    ) -> Result<Attribute, Error> {
        let mut tables = self.lock()?;

        match tables.attributes(kind).get(&id) {
            Some(attribute) if attribute.user_id == owner => {}
            _ => return Err(ErrorKind::NotFound.default()),
        }

        if let Some(name) = &patch.name {
            let taken = tables
                .attributes(kind)
                .values()
                .any(|a| a.user_id == owner && a.id != id && &a.name == name);
            if taken {
                return Err(duplicate_name(kind));
            }
        }

        let attribute = tables
            .attributes_mut(kind)
            .get_mut(&id)
            .ok_or_else(|| ErrorKind::NotFound.default())?;
        if let Some(name) = patch.name {
            attribute.name = name;
        }
        Ok(attribute.clone())
    }

    async fn delete_attribute(&self, kind: AttributeKind, owner: Id, id: Id) -> Result<(), Error> {
        let mut tables = self.lock()?;

        match tables.attributes(kind).get(&id) {
            Some(attribute) if attribute.user_id == owner => {}
            _ => return Err(ErrorKind::NotFound.default()),
        }

        tables.attributes_mut(kind).remove(&id);
        tables.links_mut(kind).retain(|(_, attribute)| *attribute != id);
        Ok(())
    }

    async fn find_attribute(&self, kind: AttributeKind, id: Id) -> Result<Option<Attribute>, Error> {
        Ok(self.lock()?.attributes(kind).get(&id).cloned())
    }

    async fn list_recipes(&self, owner: Id, filter: &RecipeFilter) -> Result<Vec<Recipe>, Error> {
        let tables = self.lock()?;

        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|row| row.user_id == owner)
            .filter(|row| tables.matches(AttributeKind::Tag, row.id, &filter.tags))
            .filter(|row| tables.matches(AttributeKind::Ingredient, row.id, &filter.ingredients))
            .map(|row| tables.recipe(row))
            .collect())
    }

    async fn get_recipe(&self, owner: Id, id: Id) -> Result<Recipe, Error> {
        let tables = self.lock()?;
        let row = tables.owned_recipe(owner, id)?;
        Ok(tables.recipe(row))
    }

    async fn create_recipe(&self, owner: Id, draft: RecipeDraft) -> Result<Recipe, Error> {
        let mut tables = self.lock()?;

        let row = RecipeRow {
            id: tables.next_id(),
            user_id: owner,
            title: draft.title,
            time_minutes: draft.time_minutes,
            price: draft.price,
            description: draft.description,
            link: draft.link,
        };
        tables.recipes.insert(row.id, row.clone());
        tables.set_recipe_attributes(AttributeKind::Tag, owner, row.id, &draft.tags);
        tables.set_recipe_attributes(AttributeKind::Ingredient, owner, row.id, &draft.ingredients);

        Ok(tables.recipe(&row))
    }

    async fn update_recipe(&self, owner: Id, id: Id, patch: RecipePatch) -> Result<Recipe, Error> {
        let mut tables = self.lock()?;

        let mut row = tables.owned_recipe(owner, id)?.clone();
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(time_minutes) = patch.time_minutes {
            row.time_minutes = time_minutes;
        }
        if let Some(price) = patch.price {
            row.price = price;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        if let Some(link) = patch.link {
            row.link = link;
        }
        tables.recipes.insert(id, row.clone());

        if let Some(tags) = patch.tags {
            tables.set_recipe_attributes(AttributeKind::Tag, owner, id, &tags);
        }
        if let Some(ingredients) = patch.ingredients {
            tables.set_recipe_attributes(AttributeKind::Ingredient, owner, id, &ingredients);
        }

        Ok(tables.recipe(&row))
    }

    async fn delete_recipe(&self, owner: Id, id: Id) -> Result<(), Error> {
        let mut tables = self.lock()?;

        tables.owned_recipe(owner, id)?;
        tables.recipes.remove(&id);
        tables.recipe_tags.retain(|(recipe, _)| *recipe != id);
        tables.recipe_ingredients.retain(|(recipe, _)| *recipe != id);
        Ok(())
    }

    async fn recipe_exists(&self, id: Id) -> Result<bool, Error> {
        Ok(self.lock()?.recipes.contains_key(&id))
    }
}
