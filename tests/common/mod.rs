#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use recipe_api::{
    context::Context,
    memory::MemoryStore,
    schema::{Id, NewUser},
    server,
};
use serde_json::Value;
use warp::{http::Response, hyper::body::Bytes};

pub struct TestApp {
    pub context: Context,
}

pub struct TestUser {
    pub id: Id,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            context: Context::new(
                Arc::new(MemoryStore::new()),
                "integration-test-secret",
                Duration::minutes(60),
            ),
        }
    }

    /// Stores a user directly and signs a session for it.
    pub async fn user(&self, email: &str) -> TestUser {
        let user = self
            .context
            .store
            .create_user(NewUser {
                email: email.to_string(),
                name: "Test Name".to_string(),
                password: "not-a-real-hash".to_string(),
            })
            .await
            .expect("user");
        let token = self.context.issue_session(&user).expect("token");

        TestUser { id: user.id, token }
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> Response<Bytes> {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(user) = user {
            request = request.header("authorization", format!("Bearer {}", user.token));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let routes = server::routes(self.context.clone());
        request.reply(&routes).await
    }
}

pub fn json(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).expect("json body")
}

pub fn names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["name"].as_str().expect("name").to_string())
        .collect()
}
