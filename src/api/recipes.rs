use rust_decimal::Decimal;
use serde::Deserialize;
use warp::{http::StatusCode, reject::Rejection, Filter, Reply};

use crate::{
    constants::MAX_BODY_BYTES,
    context::{with_context, Context},
    error::Error,
    form::{Form, FormData},
    jwt::SessionData,
    middleware::with_session,
    schema::{Id, RecipeDraft, RecipeFilter, RecipePatch},
    validation::{validate_recipe_draft, validate_recipe_patch},
};

#[derive(Debug, Deserialize)]
pub struct NamedAttribute {
    pub name: String,
}

fn names(list: Vec<NamedAttribute>) -> Vec<String> {
    list.into_iter().map(|a| a.name.trim().to_string()).collect()
}

/// Body of `POST` and `PUT`. Unknown keys, including `user`, are ignored.
#[derive(Debug, Deserialize)]
pub struct RecipePayload {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<NamedAttribute>>,
    pub ingredients: Option<Vec<NamedAttribute>>,
}

impl From<RecipePayload> for RecipeDraft {
    fn from(value: RecipePayload) -> Self {
        Self {
            title: value.title.trim().to_string(),
            time_minutes: value.time_minutes,
            price: value.price,
            description: value.description.unwrap_or_default(),
            link: value.link.unwrap_or_default(),
            tags: value.tags.map(names).unwrap_or_default(),
            ingredients: value.ingredients.map(names).unwrap_or_default(),
        }
    }
}

/// A full replacement keeps omitted optional fields as they are.
impl From<RecipePayload> for RecipePatch {
    fn from(value: RecipePayload) -> Self {
        Self {
            title: Some(value.title.trim().to_string()),
            time_minutes: Some(value.time_minutes),
            price: Some(value.price),
            description: value.description,
            link: value.link,
            tags: value.tags.map(names),
            ingredients: value.ingredients.map(names),
        }
    }
}

/// Body of `PATCH`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatchPayload {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<NamedAttribute>>,
    pub ingredients: Option<Vec<NamedAttribute>>,
}

impl From<RecipePatchPayload> for RecipePatch {
    fn from(value: RecipePatchPayload) -> Self {
        Self {
            title: value.title.map(|t| t.trim().to_string()),
            time_minutes: value.time_minutes,
            price: value.price,
            description: value.description,
            link: value.link,
            tags: value.tags.map(names),
            ingredients: value.ingredients.map(names),
        }
    }
}

pub fn parse_filter(query: FormData) -> Result<RecipeFilter, Error> {
    let form = Form::from_data(query);

    Ok(RecipeFilter {
        tags: form.get_id_list("tags")?,
        ingredients: form.get_id_list("ingredients")?,
    })
}

pub fn routes(context: Context) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let collection = warp::path!("api" / "recipes");
    let member = warp::path!("api" / "recipes" / Id);

    let list = collection
        .clone()
        .and(warp::get())
        .and(with_session(context.clone()))
        .and(warp::query::<FormData>())
        .and(with_context(context.clone()))
        .and_then(list_recipes);

    let create = collection
        .and(warp::post())
        .and(with_session(context.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<RecipePayload>())
        .and(with_context(context.clone()))
        .and_then(create_recipe);

    let detail = member
        .clone()
        .and(warp::get())
        .and(with_session(context.clone()))
        .and(with_context(context.clone()))
        .and_then(get_recipe);

    let replace = member
        .clone()
        .and(warp::put())
        .and(with_session(context.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<RecipePayload>())
        .and(with_context(context.clone()))
        .and_then(|id: Id, session: SessionData, body: RecipePayload, context: Context| {
            update_recipe(id, session, RecipePatch::from(body), context)
        });

    let update = member
        .clone()
        .and(warp::patch())
        .and(with_session(context.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<RecipePatchPayload>())
        .and(with_context(context.clone()))
        .and_then(|id: Id, session: SessionData, body: RecipePatchPayload, context: Context| {
            update_recipe(id, session, RecipePatch::from(body), context)
        });

    let delete = member
        .and(warp::delete())
        .and(with_session(context.clone()))
        .and(with_context(context))
        .and_then(delete_recipe);

    list.or(create)
        .or(detail)
        .or(replace)
        .or(update)
        .or(delete)
}

async fn list_recipes(
    session: SessionData,
    query: FormData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let filter = parse_filter(query)?;
    let rows = context.store.list_recipes(session.user_id, &filter).await?;

    Ok(warp::reply::json(&rows))
}

async fn create_recipe(
    session: SessionData,
    body: RecipePayload,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let draft = RecipeDraft::from(body);
    validate_recipe_draft(&draft)?;

    let recipe = context.store.create_recipe(session.user_id, draft).await?;

    log::debug!("Created recipe {} for user {}", recipe.id, session.user_id);
    Ok(warp::reply::with_status(
        warp::reply::json(&recipe),
        StatusCode::CREATED,
    ))
}

async fn get_recipe(
    id: Id,
    session: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let recipe = context.store.get_recipe(session.user_id, id).await?;

    Ok(warp::reply::json(&recipe))
}

async fn update_recipe(
    id: Id,
    session: SessionData,
    patch: RecipePatch,
    context: Context,
) -> Result<impl Reply, Rejection> {
    validate_recipe_patch(&patch)?;

    let recipe = context
        .store
        .update_recipe(session.user_id, id, patch)
        .await?;

    log::debug!("Updated recipe {} for user {}", id, session.user_id);
    Ok(warp::reply::json(&recipe))
}

async fn delete_recipe(
    id: Id,
    session: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    context.store.delete_recipe(session.user_id, id).await?;

    log::debug!("Deleted recipe {} for user {}", id, session.user_id);
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
