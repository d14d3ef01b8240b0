use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type Id = i32;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: Id,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Tags and ingredients share one shape and one set of ownership rules;
/// the kind only decides which tables are touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    pub fn table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }

    pub fn link_table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "recipe_tags",
            AttributeKind::Ingredient => "recipe_ingredients",
        }
    }

    pub fn link_column(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag_id",
            AttributeKind::Ingredient => "ingredient_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag",
            AttributeKind::Ingredient => "ingredient",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Id,
    pub name: String,
    #[serde(skip)]
    pub user_id: Id,
}

pub type Tag = Attribute;
pub type Ingredient = Attribute;

/// An attribute row joined with the recipe referencing it.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LinkedAttribute {
    pub recipe_id: Id,
    pub id: Id,
    pub name: String,
    pub user_id: Id,
}

impl From<LinkedAttribute> for Attribute {
    fn from(value: LinkedAttribute) -> Self {
        Self {
            id: value.id,
            name: value.name,
            user_id: value.user_id,
        }
    }
}

/// Fields of an attribute that a client may change. Ownership is not one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributePatch {
    pub name: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct RecipeRow {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: Id,
    #[serde(skip_serializing)]
    pub user_id: Id,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn from_row(row: RecipeRow, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: row.price,
            description: row.description,
            link: row.link,
            tags,
            ingredients,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// A partial recipe update. `Some` list fields replace the whole association set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub tags: Vec<Id>,
    pub ingredients: Vec<Id>,
}

impl RecipeFilter {
    pub fn ids(&self, kind: AttributeKind) -> &[Id] {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }
}
