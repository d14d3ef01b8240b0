use warp::{reject::Rejection, Filter};

use crate::{
    context::Context,
    error::{Error, ErrorKind},
};

use super::jwt::{verify_jwt_session, SessionData};

/// Resolves the caller from `Authorization: Bearer <token>` or, failing
/// that, the `session` cookie. Requests without credentials are rejected
/// before any resource logic runs.
pub fn with_session(
    context: Context,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::cookie::optional::<String>("session"))
        .and_then(move |header: Option<String>, cookie: Option<String>| {
            let context = context.clone();
            async move {
                authenticate(&context, header, cookie)
                    .await
                    .map_err(warp::reject::custom)
            }
        })
}

pub async fn authenticate(
    context: &Context,
    header: Option<String>,
    cookie: Option<String>,
) -> Result<SessionData, Error> {
    let token = match (header, cookie) {
        (Some(header), _) => bearer_token(&header)
            .ok_or_else(|| ErrorKind::Unauthorized.new("Invalid authorization header"))?,
        (None, Some(cookie)) => cookie,
        (None, None) => return Err(ErrorKind::Unauthorized.default()),
    };

    let session = verify_jwt_session(&token, context.secret()).map_err(|e| {
        log::warn!("Rejected session: {}", e.info);
        e
    })?;

    match context.store.get_user_by_id(session.user_id).await? {
        Some(user) if user.is_active => Ok(session.into()),
        _ => {
            log::warn!("Rejected session for unknown or inactive user {}", session.user_id);
            Err(ErrorKind::Unauthorized.new("User inactive or deleted."))
        }
    }
}

/// Accepts both the `Bearer` and the `Token` scheme.
fn bearer_token(header: &str) -> Option<String> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();

    if token.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token") {
        Some(token.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_schemes() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc".to_string()));
        assert_eq!(bearer_token("token abc"), Some("abc".to_string()));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
    }
}
