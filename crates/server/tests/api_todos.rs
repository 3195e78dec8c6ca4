mod common;

use axum::http::{Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn test_create_then_list_is_scoped_to_owner() {
    let app = spawn_app().await;
    let alice = app.register("Alice", "alice@example.com", "secret1").await;
    let bob = app.register("Bobby", "bob@example.com", "secret1").await;

    let (status, todo) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&alice),
            Some(json!({ "title": "Write report", "description": "Q3 numbers" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["status"], "todo");
    assert_eq!(todo["title"], "Write report");
    assert!(todo["id"].is_string());
    assert!(todo["created_at"].is_string());
    assert!(todo["user_id"].is_string());
    assert!(todo.get("user").is_none());

    let (status, list) = app
        .request(Method::GET, "/api/todos", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([todo]));

    let (_, others) = app.request(Method::GET, "/api/todos", Some(&bob), None).await;
    assert_eq!(others, json!([]));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com", "secret1").await;

    for title in ["one", "two", "three"] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/todos",
                Some(&token),
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, list) = app
        .request(Method::GET, "/api/todos", Some(&token), None)
        .await;
    let titles: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["three", "two", "one"]);
}

#[tokio::test]
async fn test_update_reflects_only_submitted_fields() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com", "secret1").await;
    let (_, todo) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "title": "Write report", "description": "Q3 numbers" })),
        )
        .await;
    let uri = format!("/api/todos/{}", todo["id"].as_str().unwrap());

    let (status, updated) = app
        .request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "status": "in-progress" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in-progress");
    assert_eq!(updated["title"], "Write report");
    assert_eq!(updated["description"], "Q3 numbers");
    assert_eq!(updated["id"], todo["id"]);
    assert_eq!(updated["created_at"], todo["created_at"]);
}

#[tokio::test]
async fn test_non_owner_and_missing_todo() {
    let app = spawn_app().await;
    let alice = app.register("Alice", "alice@example.com", "secret1").await;
    let mallory = app.register("Mallory", "mallory@example.com", "secret1").await;
    let (_, todo) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&alice),
            Some(json!({ "title": "Private" })),
        )
        .await;
    let uri = format!("/api/todos/{}", todo["id"].as_str().unwrap());

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(&mallory),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Not authorized");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&mallory), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, list) = app.request(Method::GET, "/api/todos", Some(&alice), None).await;
    assert_eq!(list[0]["title"], "Private");

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/todos/does-not-exist",
            Some(&alice),
            Some(json!({ "title": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Todo not found");

    let (status, _) = app
        .request(Method::DELETE, "/api/todos/does-not-exist", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_delete() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com", "secret1").await;
    let (_, todo) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "title": "Temporary" })),
        )
        .await;
    let uri = format!("/api/todos/{}", todo["id"].as_str().unwrap());

    let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Todo removed" }));

    let (_, list) = app.request(Method::GET, "/api/todos", Some(&token), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_without_title_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com", "secret1").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "description": "no title" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Title is required");
}

#[tokio::test]
async fn test_bodyless_requests() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com", "secret1").await;

    let (status, body) = app.request(Method::POST, "/api/todos", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Title is required");

    let (_, todo) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "title": "Keep me" })),
        )
        .await;
    let uri = format!("/api/todos/{}", todo["id"].as_str().unwrap());

    let (status, unchanged) = app.request(Method::PUT, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, todo);
}

#[tokio::test]
async fn test_create_for_deleted_account_is_unauthorized() {
    let app = spawn_app().await;
    let token = app.state.tokens.issue("ghost-user").unwrap();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(&token),
            Some(json!({ "title": "Orphan" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "msg": "User not found" }));
}
