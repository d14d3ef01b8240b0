use serde::Deserialize;
use warp::{http::StatusCode, reject::Rejection, Filter, Reply};

use crate::{
    constants::MAX_BODY_BYTES,
    context::{with_context, Context},
    registration::create_user,
};

#[derive(Debug, Deserialize)]
pub struct RegistrationPayload {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// `POST /api/users`. The only route that needs no session.
pub fn routes(context: Context) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "users")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<RegistrationPayload>())
        .and(with_context(context))
        .and_then(register)
}

async fn register(body: RegistrationPayload, context: Context) -> Result<impl Reply, Rejection> {
    let user = create_user(context.store.as_ref(), &body.email, &body.password, &body.name).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&user),
        StatusCode::CREATED,
    ))
}
