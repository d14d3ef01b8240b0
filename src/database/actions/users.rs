use crate::{
    error::{Error, ErrorKind, QueryError},
    schema::{Id, NewUser, User},
};

use sqlx::{Pool, Postgres};

pub async fn get_user(pool: &Pool<Postgres>, email: &str) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: Id) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Creates a user with email and password, which is the hashed version of their password
pub async fn register_user(user: NewUser, pool: &Pool<Postgres>) -> Result<User, Error> {
    let row: User = sqlx::query_as(
        "
        INSERT INTO users (email, name, password)
        VALUES ($1, $2, $3)
        RETURNING *;
    ",
    )
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.password)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        let error = QueryError::from(e);
        if error.is_unique_violation() {
            ErrorKind::Validation.new("user with this email already exists.")
        } else {
            error.into()
        }
    })?;

    Ok(row)
}
