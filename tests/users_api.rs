mod common;

use common::{json, TestApp};
use serde_json::json;
use warp::http::StatusCode;

#[tokio::test]
async fn create_valid_user() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "email": "test@EXAMPLE.com",
                "password": "testpass123",
                "name": "Test Name",
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json(&response);
    assert_eq!(body, json!({ "email": "test@example.com", "name": "Test Name" }));

    let user = app
        .context
        .store
        .get_user_by_email("test@example.com")
        .await
        .expect("lookup")
        .expect("user");
    assert_ne!(user.password, "testpass123");
    assert!(user.is_active);
}

#[tokio::test]
async fn user_exists() {
    let app = TestApp::new();
    app.user("test@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "test@example.com", "password": "testpass123" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json(&response)["detail"].is_string());
}

#[tokio::test]
async fn password_too_short() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "test@example.com", "password": "pw" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app
        .context
        .store
        .get_user_by_email("test@example.com")
        .await
        .expect("lookup")
        .is_none());
}

#[tokio::test]
async fn invalid_email() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "not-an-email", "password": "testpass123" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registered_user_can_authenticate() {
    let app = TestApp::new();
    app.request(
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "cook@example.com", "password": "testpass123" })),
    )
    .await;
    let user = app
        .context
        .store
        .get_user_by_email("cook@example.com")
        .await
        .expect("lookup")
        .expect("user");
    let token = app.context.issue_session(&user).expect("token");

    let response = warp::test::request()
        .method("GET")
        .path("/api/recipes")
        .header("authorization", format!("Token {token}"))
        .reply(&recipe_api::server::routes(app.context.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(&response), json!([]));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/nothing", None, None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(&response)["detail"], "Not found.");
}
