mod common;

use common::{json, names, TestApp, TestUser};
use recipe_api::schema::AttributeKind;
use serde_json::{json, Value};
use warp::http::StatusCode;

async fn create(app: &TestApp, user: &TestUser, body: Value) -> Value {
    let response = app.request("POST", "/api/recipes", Some(user), Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json(&response)
}

fn sample(title: &str) -> Value {
    json!({
        "title": title,
        "time_minutes": 22,
        "price": "5.25",
        "description": "Sample description",
        "link": "http://example.com/recipe.pdf",
    })
}

#[tokio::test]
async fn login_required() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/recipes", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_recipe() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;

    let recipe = create(
        &app,
        &user,
        json!({ "title": "Sample recipe", "time_minutes": 30, "price": "2.50" }),
    )
    .await;

    assert_eq!(recipe["title"], "Sample recipe");
    assert_eq!(recipe["time_minutes"], 30);
    assert_eq!(recipe["price"], "2.50");
    assert_eq!(recipe["description"], "");
    assert_eq!(recipe["tags"], json!([]));
    assert!(recipe.get("user").is_none());
    assert!(recipe.get("user_id").is_none());
}

#[tokio::test]
async fn create_rejects_invalid_fields() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;

    for body in [
        json!({ "title": "", "time_minutes": 5, "price": "1.00" }),
        json!({ "title": "Soup", "time_minutes": -1, "price": "1.00" }),
        json!({ "title": "Soup", "time_minutes": 5, "price": "1.001" }),
        json!({ "title": "Soup", "time_minutes": 5, "price": "-1.00" }),
        json!({ "title": "Soup", "time_minutes": 5 }),
    ] {
        let response = app.request("POST", "/api/recipes", Some(&user), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn retrieve_recipes_newest_first() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    create(&app, &user, sample("First")).await;
    create(&app, &user, sample("Second")).await;

    let response = app.request("GET", "/api/recipes", Some(&user), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(&response);
    assert_eq!(body.as_array().expect("array").len(), 2);
    assert_eq!(body[0]["title"], "Second");
    assert_eq!(body[1]["title"], "First");
}

#[tokio::test]
async fn recipes_limited_to_user() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let other = app.user("other@example.com").await;
    create(&app, &other, sample("Theirs")).await;
    let mine = create(&app, &user, sample("Mine")).await;

    let list = app.request("GET", "/api/recipes", Some(&user), None).await;
    let theirs = app.request("GET", "/api/recipes", Some(&other), None).await;
    let foreign = app
        .request("GET", &format!("/api/recipes/{}", mine["id"]), Some(&other), None)
        .await;

    assert_eq!(json(&list), json!([mine]));
    assert_eq!(json(&theirs).as_array().expect("array").len(), 1);
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_with_new_and_existing_tags() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let existing = app
        .context
        .store
        .get_or_create_attribute(AttributeKind::Tag, user.id, "Indian")
        .await
        .expect("tag");

    let mut body = sample("Pongal");
    body["tags"] = json!([{ "name": "Indian" }, { "name": "Breakfast" }]);
    let recipe = create(&app, &user, body).await;

    let tags = recipe["tags"].as_array().expect("tags");
    assert_eq!(tags.len(), 2);
    assert!(tags.iter().any(|t| t["id"] == existing.id));
    let listed = app.request("GET", "/api/tags", Some(&user), None).await;
    assert_eq!(names(&json(&listed)), vec!["Indian", "Breakfast"]);
}

#[tokio::test]
async fn nested_names_belong_to_the_caller() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let other = app.user("other@example.com").await;
    let foreign = app
        .context
        .store
        .get_or_create_attribute(AttributeKind::Ingredient, other.id, "Salt")
        .await
        .expect("ingredient");

    let mut body = sample("Fries");
    body["ingredients"] = json!([{ "name": "Salt" }]);
    let recipe = create(&app, &user, body).await;

    let linked = &recipe["ingredients"][0];
    assert_eq!(linked["name"], "Salt");
    assert_ne!(linked["id"], foreign.id);
}

#[tokio::test]
async fn get_recipe_detail() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let mut body = sample("Curry");
    body["tags"] = json!([{ "name": "Dinner" }]);
    body["ingredients"] = json!([{ "name": "Rice" }]);
    let recipe = create(&app, &user, body).await;

    let response = app
        .request("GET", &format!("/api/recipes/{}", recipe["id"]), Some(&user), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(&response), recipe);
    assert_eq!(recipe["description"], "Sample description");
    assert_eq!(recipe["link"], "http://example.com/recipe.pdf");
}

#[tokio::test]
async fn partial_update() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let recipe = create(&app, &user, sample("Sample recipe title")).await;
    let path = format!("/api/recipes/{}", recipe["id"]);

    let response = app
        .request(
            "PATCH",
            &path,
            Some(&user),
            Some(json!({ "title": "New recipe title", "user": 99 })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = json(&response);
    assert_eq!(updated["title"], "New recipe title");
    assert_eq!(updated["link"], recipe["link"]);
    assert_eq!(updated["price"], "5.25");
}

#[tokio::test]
async fn full_update() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let mut body = sample("Sample recipe title");
    body["tags"] = json!([{ "name": "Breakfast" }]);
    let recipe = create(&app, &user, body).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/recipes/{}", recipe["id"]),
            Some(&user),
            Some(json!({
                "title": "New recipe title",
                "time_minutes": 10,
                "price": "2.50",
                "description": "New description",
                "tags": [{ "name": "Lunch" }],
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = json(&response);
    assert_eq!(updated["title"], "New recipe title");
    assert_eq!(updated["time_minutes"], 10);
    assert_eq!(updated["price"], "2.50");
    assert_eq!(updated["description"], "New description");
    assert_eq!(names(&updated["tags"]), vec!["Lunch"]);
}

#[tokio::test]
async fn clear_recipe_tags() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let mut body = sample("Toast");
    body["tags"] = json!([{ "name": "Breakfast" }]);
    let recipe = create(&app, &user, body).await;
    let tag_id = recipe["tags"][0]["id"].as_i64().expect("id") as i32;

    let response = app
        .request(
            "PATCH",
            &format!("/api/recipes/{}", recipe["id"]),
            Some(&user),
            Some(json!({ "tags": [] })),
        )
        .await;

    assert_eq!(json(&response)["tags"], json!([]));
    assert!(app
        .context
        .store
        .attribute_exists(AttributeKind::Tag, tag_id)
        .await
        .expect("exists"));
}

#[tokio::test]
async fn update_other_users_recipe_is_not_found() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let other = app.user("other@example.com").await;
    let recipe = create(&app, &other, sample("Theirs")).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/recipes/{}", recipe["id"]),
            Some(&user),
            Some(json!({ "title": "Mine" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let unchanged = app
        .request("GET", &format!("/api/recipes/{}", recipe["id"]), Some(&other), None)
        .await;
    assert_eq!(json(&unchanged)["title"], "Theirs");
}

#[tokio::test]
async fn delete_recipe_keeps_attributes() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let mut body = sample("Stew");
    body["ingredients"] = json!([{ "name": "Beef" }]);
    let recipe = create(&app, &user, body).await;
    let id = recipe["id"].as_i64().expect("id") as i32;

    let response = app
        .request("DELETE", &format!("/api/recipes/{id}"), Some(&user), None)
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!app.context.store.recipe_exists(id).await.expect("exists"));
    let ingredients = app.request("GET", "/api/ingredients", Some(&user), None).await;
    assert_eq!(names(&json(&ingredients)), vec!["Beef"]);
}

#[tokio::test]
async fn delete_other_users_recipe_is_not_found() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;
    let other = app.user("other@example.com").await;
    let recipe = create(&app, &other, sample("Theirs")).await;
    let id = recipe["id"].as_i64().expect("id") as i32;

    let response = app
        .request("DELETE", &format!("/api/recipes/{id}"), Some(&user), None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.context.store.recipe_exists(id).await.expect("exists"));
}

#[tokio::test]
async fn filter_by_tags_and_ingredients() {
    let app = TestApp::new();
    let user = app.user("user@example.com").await;

    let mut curry = sample("Vegetable Curry");
    curry["tags"] = json!([{ "name": "Vegan" }]);
    curry["ingredients"] = json!([{ "name": "Chickpeas" }]);
    let curry = create(&app, &user, curry).await;

    let mut tahini = sample("Aubergine with Tahini");
    tahini["tags"] = json!([{ "name": "Vegetarian" }]);
    let tahini = create(&app, &user, tahini).await;

    create(&app, &user, sample("Fish and chips")).await;

    let vegan = &curry["tags"][0]["id"];
    let vegetarian = &tahini["tags"][0]["id"];
    let chickpeas = &curry["ingredients"][0]["id"];

    let by_tags = app
        .request(
            "GET",
            &format!("/api/recipes?tags={vegan},{vegetarian}"),
            Some(&user),
            None,
        )
        .await;
    let titles: Vec<String> = json(&by_tags)
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["title"].as_str().expect("title").to_string())
        .collect();
    assert_eq!(titles, vec!["Aubergine with Tahini", "Vegetable Curry"]);

    let both = app
        .request(
            "GET",
            &format!("/api/recipes?tags={vegetarian}&ingredients={chickpeas}"),
            Some(&user),
            None,
        )
        .await;
    assert_eq!(json(&both), json!([]));

    let malformed = app
        .request("GET", "/api/recipes?tags=one", Some(&user), None)
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}
