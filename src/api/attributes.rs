use warp::{http::StatusCode, reject::Rejection, Filter, Reply};

use crate::{
    constants::MAX_BODY_BYTES,
    context::{with_context, Context},
    error::Error,
    form::{Form, FormData},
    jwt::SessionData,
    middleware::with_session,
    schema::{AttributeKind, AttributePatch, Id},
    validation::validate_text_field,
};

/// `GET /api/{segment}`, `PATCH /api/{segment}/{id}` and `DELETE /api/{segment}/{id}`
/// for one attribute kind.
pub fn routes(
    kind: AttributeKind,
    segment: &'static str,
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let collection = warp::path("api").and(warp::path(segment)).and(warp::path::end());
    let member = warp::path("api")
        .and(warp::path(segment))
        .and(warp::path::param::<Id>())
        .and(warp::path::end());

    let list = collection
        .and(warp::get())
        .and(with_session(context.clone()))
        .and(warp::query::<FormData>())
        .and(with_context(context.clone()))
        .and_then(move |session: SessionData, query: FormData, context: Context| {
            list_attributes(kind, session, query, context)
        });

    let update = member
        .clone()
        .and(warp::patch())
        .and(with_session(context.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<FormData>())
        .and(with_context(context.clone()))
        .and_then(move |id: Id, session: SessionData, body: FormData, context: Context| {
            update_attribute(kind, id, session, body, context)
        });

    let delete = member
        .and(warp::delete())
        .and(with_session(context.clone()))
        .and(with_context(context))
        .and_then(move |id: Id, session: SessionData, context: Context| {
            delete_attribute(kind, id, session, context)
        });

    list.or(update).or(delete)
}

async fn list_attributes(
    kind: AttributeKind,
    session: SessionData,
    query: FormData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let assigned_only = Form::from_data(query)
        .get_flag("assigned_only")
        .map_err(Error::from)?;

    let rows = context
        .store
        .list_attributes(kind, session.user_id, assigned_only)
        .await?;

    log::debug!(
        "Listed {} {}s for user {} (assigned_only: {})",
        rows.len(),
        kind.label(),
        session.user_id,
        assigned_only
    );
    Ok(warp::reply::json(&rows))
}

/// Only `name` is applied. Ownership keys such as `user` are ignored.
pub fn parse_patch(body: FormData) -> Result<AttributePatch, Error> {
    let name = Form::from_data(body).get_optional_str("name")?;
    if let Some(name) = &name {
        validate_text_field("Name", name, true)?;
    }

    Ok(AttributePatch {
        name: name.map(|n| n.trim().to_string()),
    })
}

async fn update_attribute(
    kind: AttributeKind,
    id: Id,
    session: SessionData,
    body: FormData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let patch = parse_patch(body)?;

    let row = context
        .store
        .update_attribute(kind, session.user_id, id, patch)
        .await?;

    log::debug!("Updated {} {} for user {}", kind.label(), id, session.user_id);
    Ok(warp::reply::json(&row))
}

async fn delete_attribute(
    kind: AttributeKind,
    id: Id,
    session: SessionData,
    context: Context,
) -> Result<impl Reply, Rejection> {
    context
        .store
        .delete_attribute(kind, session.user_id, id)
        .await?;

    log::debug!("Deleted {} {} for user {}", kind.label(), id, session.user_id);
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
