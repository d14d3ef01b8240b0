use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{Error, ErrorKind, QueryError},
    schema::{Attribute, AttributeKind, AttributePatch, Id, LinkedAttribute},
    store::duplicate_name,
};

pub async fn list_attributes(
    kind: AttributeKind,
    owner: Id,
    assigned_only: bool,
    pool: &Pool<Postgres>,
) -> Result<Vec<Attribute>, Error> {
    let table = kind.table();

    // Byte order, matching the in-memory store regardless of database collation.
    let query = if assigned_only {
        format!(
            "SELECT a.id, a.name, a.user_id
             FROM {table} a
             WHERE a.user_id = $1
               AND EXISTS (SELECT 1 FROM {link} l WHERE l.{column} = a.id)
             ORDER BY a.name COLLATE \"C\" DESC, a.id DESC",
            link = kind.link_table(),
            column = kind.link_column(),
        )
    } else {
        format!(
            "SELECT id, name, user_id FROM {table}
             WHERE user_id = $1
             ORDER BY name COLLATE \"C\" DESC, id DESC"
        )
    };

    let rows: Vec<Attribute> = sqlx::query_as(&query)
        .bind(owner)
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn find_attribute(
    kind: AttributeKind,
    id: Id,
    pool: &Pool<Postgres>,
) -> Result<Option<Attribute>, Error> {
    let row: Option<Attribute> = sqlx::query_as(&format!(
        "SELECT id, name, user_id FROM {} WHERE id = $1",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row)
}

/// Runs on the caller's connection so nested recipe writes share one transaction.
/// The `(user_id, name)` unique index makes concurrent callers resolve to one row.
pub async fn get_or_create_attribute(
    kind: AttributeKind,
    owner: Id,
    name: &str,
    conn: &mut PgConnection,
) -> Result<Attribute, Error> {
    let attribute: Attribute = sqlx::query_as(&format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2)
         ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id, name, user_id",
        kind.table()
    ))
    .bind(owner)
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    log::debug!("Resolved {} {} for user {}", kind.label(), attribute.id, owner);
    Ok(attribute)
}

pub async fn update_attribute(
    kind: AttributeKind,
    owner: Id,
    id: Id,
    patch: AttributePatch,
    pool: &Pool<Postgres>,
) -> Result<Attribute, Error> {
    let row: Option<Attribute> = sqlx::query_as(&format!(
        "UPDATE {} SET name = COALESCE($3, name)
         WHERE id = $1 AND user_id = $2
         RETURNING id, name, user_id",
        kind.table()
    ))
    .bind(id)
    .bind(owner)
    .bind(patch.name)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        let error = QueryError::from(e);
        if error.is_unique_violation() {
            duplicate_name(kind)
        } else {
            error.into()
        }
    })?;

    row.ok_or_else(|| ErrorKind::NotFound.default())
}

pub async fn delete_attribute(
    kind: AttributeKind,
    owner: Id,
    id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let owned: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE id = $1 AND user_id = $2 FOR UPDATE",
        kind.table()
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    if owned.is_none() {
        return Err(ErrorKind::NotFound.default());
    }

    sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1",
        kind.link_table(),
        kind.link_column()
    ))
    .bind(id)
    .execute(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(QueryError::from)?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;
    Ok(())
}

/// Attributes linked to any of `recipe_ids`, ordered by id within each recipe.
pub async fn list_linked_attributes(
    kind: AttributeKind,
    recipe_ids: &[Id],
    conn: &mut PgConnection,
) -> Result<Vec<LinkedAttribute>, Error> {
    if recipe_ids.is_empty() {
        return Ok(vec![]);
    }

    let rows: Vec<LinkedAttribute> = sqlx::query_as(&format!(
        "SELECT l.recipe_id AS recipe_id, a.id AS id, a.name AS name, a.user_id AS user_id
         FROM {link} l
         INNER JOIN {table} a ON a.id = l.{column}
         WHERE l.recipe_id = ANY($1)
         ORDER BY l.recipe_id, a.id",
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column(),
    ))
    .bind(recipe_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

/// Replaces the recipe's links of this kind with the owner's attributes named in `names`.
pub async fn set_recipe_attributes(
    kind: AttributeKind,
    owner: Id,
    recipe_id: Id,
    names: &[String],
    conn: &mut PgConnection,
) -> Result<(), Error> {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE recipe_id = $1",
        kind.link_table()
    ))
    .bind(recipe_id)
    .execute(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    for name in names {
        let attribute = get_or_create_attribute(kind, owner, name, &mut *conn).await?;

        sqlx::query(&format!(
            "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.link_table(),
            kind.link_column()
        ))
        .bind(recipe_id)
        .bind(attribute.id)
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;
    }

    Ok(())
}
