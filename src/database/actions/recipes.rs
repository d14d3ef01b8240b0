use std::collections::HashMap;

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use crate::{
    error::{Error, ErrorKind, QueryError},
    schema::{
        Attribute, AttributeKind, Id, LinkedAttribute, Recipe, RecipeDraft, RecipeFilter,
        RecipePatch, RecipeRow,
    },
};

use super::attributes::{list_linked_attributes, set_recipe_attributes};

const RECIPE_COLUMNS: &str = "r.id, r.user_id, r.title, r.time_minutes, r.price, r.description, r.link";

pub async fn fetch_recipes(
    owner: Id,
    filter: &RecipeFilter,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT DISTINCT {RECIPE_COLUMNS} FROM recipes r"));

    for kind in [AttributeKind::Tag, AttributeKind::Ingredient] {
        if !filter.ids(kind).is_empty() {
            query.push(format!(
                " INNER JOIN {link} ON {link}.recipe_id = r.id",
                link = kind.link_table(),
            ));
        }
    }

    query.push(" WHERE r.user_id = ").push_bind(owner);

    for kind in [AttributeKind::Tag, AttributeKind::Ingredient] {
        let ids = filter.ids(kind);
        if !ids.is_empty() {
            query
                .push(format!(" AND {}.{} = ANY(", kind.link_table(), kind.link_column()))
                .push_bind(ids.to_vec())
                .push(")");
        }
    }

    query.push(" ORDER BY r.id DESC");

    let mut conn = pool.acquire().await.map_err(QueryError::from)?;

    let rows: Vec<RecipeRow> = query
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    attach_attributes(rows, &mut *conn).await
}

pub async fn get_recipe(owner: Id, id: Id, pool: &Pool<Postgres>) -> Result<Recipe, Error> {
    let mut conn = pool.acquire().await.map_err(QueryError::from)?;
    load_recipe(owner, id, &mut *conn).await
}

pub async fn create_recipe(
    owner: Id,
    draft: RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, title, time_minutes, price, description, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ",
    )
    .bind(owner)
    .bind(&draft.title)
    .bind(draft.time_minutes)
    .bind(draft.price)
    .bind(&draft.description)
    .bind(&draft.link)
    .fetch_one(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    set_recipe_attributes(AttributeKind::Tag, owner, id.0, &draft.tags, &mut *tr).await?;
    set_recipe_attributes(AttributeKind::Ingredient, owner, id.0, &draft.ingredients, &mut *tr)
        .await?;

    let recipe = load_recipe(owner, id.0, &mut *tr).await?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
    Ok(recipe)
}

pub async fn update_recipe(
    owner: Id,
    id: Id,
    patch: RecipePatch,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let updated = sqlx::query(
        "
        UPDATE recipes SET
            title = COALESCE($3, title),
            time_minutes = COALESCE($4, time_minutes),
            price = COALESCE($5, price),
            description = COALESCE($6, description),
            link = COALESCE($7, link)
        WHERE id = $1 AND user_id = $2
    ",
    )
    .bind(id)
    .bind(owner)
    .bind(patch.title)
    .bind(patch.time_minutes)
    .bind(patch.price)
    .bind(patch.description)
    .bind(patch.link)
    .execute(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    if updated.rows_affected() == 0 {
        return Err(ErrorKind::NotFound.default());
    }

    if let Some(tags) = patch.tags {
        set_recipe_attributes(AttributeKind::Tag, owner, id, &tags, &mut *tr).await?;
    }
    if let Some(ingredients) = patch.ingredients {
        set_recipe_attributes(AttributeKind::Ingredient, owner, id, &ingredients, &mut *tr).await?;
    }

    let recipe = load_recipe(owner, id, &mut *tr).await?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
    Ok(recipe)
}

pub async fn delete_recipe(owner: Id, id: Id, pool: &Pool<Postgres>) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let owned: Option<(Id,)> =
        sqlx::query_as("SELECT id FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tr)
            .await
            .map_err(QueryError::from)?;

    if owned.is_none() {
        return Err(ErrorKind::NotFound.default());
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
    Ok(())
}

pub async fn recipe_exists(id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row.is_some())
}

async fn load_recipe(owner: Id, id: Id, conn: &mut PgConnection) -> Result<Recipe, Error> {
    let row: Option<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    let row = row.ok_or_else(|| ErrorKind::NotFound.default())?;

    attach_attributes(vec![row], conn)
        .await?
        .pop()
        .ok_or_else(|| ErrorKind::NotFound.default())
}

async fn attach_attributes(
    rows: Vec<RecipeRow>,
    conn: &mut PgConnection,
) -> Result<Vec<Recipe>, Error> {
    let ids: Vec<Id> = rows.iter().map(|row| row.id).collect();

    let mut tags = group_by_recipe(list_linked_attributes(AttributeKind::Tag, &ids, conn).await?);
    let mut ingredients =
        group_by_recipe(list_linked_attributes(AttributeKind::Ingredient, &ids, conn).await?);

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            Recipe::from_row(
                row,
                tags.remove(&id).unwrap_or_default(),
                ingredients.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

fn group_by_recipe(linked: Vec<LinkedAttribute>) -> HashMap<Id, Vec<Attribute>> {
    let mut map: HashMap<Id, Vec<Attribute>> = HashMap::new();
    linked.into_iter().for_each(|x| {
        map.entry(x.recipe_id).or_default().push(x.into());
    });
    map
}
