use std::{convert::Infallible, sync::Arc};

use chrono::Duration;
use warp::Filter;

use crate::{
    error::Error,
    jwt::generate_jwt_session,
    schema::User,
    store::ResourceStore,
};

/// Everything a request handler needs, cloned into each route.
#[derive(Clone)]
pub struct Context {
    pub store: Arc<dyn ResourceStore>,
    secret: Arc<[u8]>,
    session_lifetime: Duration,
}

impl Context {
    pub fn new(store: Arc<dyn ResourceStore>, secret: &str, session_lifetime: Duration) -> Self {
        Self {
            store,
            secret: Arc::from(secret.as_bytes()),
            session_lifetime,
        }
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Signs a session token for `user` with this context's secret.
    pub fn issue_session(&self, user: &User) -> Result<String, Error> {
        generate_jwt_session(user, &self.secret, self.session_lifetime)
    }
}

pub fn with_context(context: Context) -> impl Filter<Extract = (Context,), Error = Infallible> + Clone {
    warp::any().map(move || context.clone())
}
