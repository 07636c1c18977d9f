use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pairchat_server::core::config::ChatServerConfig;
use pairchat_server::{app, build_state};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio_test::assert_ok;
use tower::ServiceExt;

async fn test_app() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let mut config = ChatServerConfig::default();
    config.database_url = format!("sqlite://{}", dir.path().join("api.db").display());
    config.ai.enabled = false;
    config.bcrypt_cost = 4;

    let (state, _worker) = build_state(config).await.unwrap();
    (dir, app(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value, axum::http::HeaderMap) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(identity) = cookie {
        request = request.header(header::COOKIE, format!("X-Authorization={}", identity));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value, headers)
}

async fn create_user(app: &Router, name: &str) -> i64 {
    let (status, body, _) = send(
        app,
        "POST",
        "/api/users",
        Some(json!({"username": name, "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_user_lifecycle() {
    let (_dir, app) = test_app().await;
    let alice = create_user(&app, "alice").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({"username": "alice", "password": "x"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send(&app, "GET", &format!("/api/users/{}", alice), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": alice, "username": "alice"}));

    let (status, _, _) = send(&app, "GET", "/api/users/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Only the cookie owner may update
    let update = json!({"username": "alicia"});
    let (status, _, _) = send(&app, "PUT", &format!("/api/users/{}", alice), Some(update.clone()), Some("mallory")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body, _) = send(&app, "PUT", &format!("/api/users/{}", alice), Some(update), Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alicia");

    let (status, body, _) = send(&app, "DELETE", &format!("/api/users/{}", alice), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_login_sets_identity_cookie() {
    let (_dir, app) = test_app().await;
    create_user(&app, "bob").await;

    let (status, body, headers) = send(
        &app,
        "POST",
        "/api/login",
        Some(json!({"username": "bob", "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": true, "message": "Login successful"}));
    let cookie = assert_ok!(headers.get(header::SET_COOKIE).unwrap().to_str());
    assert!(cookie.starts_with("X-Authorization=bob"));

    let (_, body, headers) = send(
        &app,
        "POST",
        "/api/login",
        Some(json!({"username": "bob", "password": "nope"})),
        None,
    )
    .await;
    assert_eq!(body["message"], "Incorrect Password");
    assert!(headers.get(header::SET_COOKIE).is_none());

    let (_, body, _) = send(&app, "GET", "/api/current_user", None, Some("bob")).await;
    assert_eq!(body, json!("bob"));
    let (_, body, _) = send(&app, "GET", "/api/current_user", None, None).await;
    assert_eq!(body, Value::Null);

    let (status, _, headers) = send(&app, "GET", "/api/logout", None, Some("bob")).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_friends_chats_and_messages() {
    let (_dir, app) = test_app().await;
    let a = create_user(&app, "a").await;
    let b = create_user(&app, "b").await;

    // No chat without friendship
    let (status, _, _) = send(&app, "POST", "/api/chats", Some(json!({"user_id": a, "friend_id": b})), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body, _) = send(&app, "POST", &format!("/api/users/{}/friends", a), Some(json!({"id": b})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"user_id": a, "friend_id": b}));

    let (status, _, _) = send(&app, "POST", &format!("/api/users/{}/friends", b), Some(json!({"id": a})), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Friends cannot be deleted
    let (status, _, _) = send(&app, "DELETE", &format!("/api/users/{}", b), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, chat, _) = send(&app, "POST", "/api/chats", Some(json!({"user_id": b, "friend_id": a})), None).await;
    assert_eq!(status, StatusCode::OK);
    let chat_id = chat["id"].as_i64().unwrap();

    // One chat per pair, either direction
    let (status, _, _) = send(&app, "POST", "/api/chats", Some(json!({"user_id": a, "friend_id": b})), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, chats, _) = send(&app, "GET", &format!("/api/chats/user/{}/friend/{}", a, b), None, None).await;
    assert_eq!(chats.as_array().unwrap().len(), 1);
    let (_, chats, _) = send(&app, "GET", &format!("/api/chats/user/{}", a), None, None).await;
    assert_eq!(chats[0]["id"], chat_id);

    let (status, body, _) = send(
        &app,
        "POST",
        &format!("/api/chats/{}/messages", chat_id),
        Some(json!({"sender_id": a, "message": "hello"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Message sent successfully"}));

    let (_, messages, _) = send(&app, "GET", &format!("/api/chats/{}/messages", chat_id), None, None).await;
    assert_eq!(messages[0]["message"], "hello");
    assert_eq!(messages[0]["sender_id"], a);

    let (status, _, _) = send(&app, "GET", "/api/chats/999/messages", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "DELETE", &format!("/api/users/{}/friends/{}", b, a), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, "GET", &format!("/api/chats/user/{}/friend/{}", a, b), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unfriended_user_with_chat() {
    let (_dir, app) = test_app().await;
    let a = create_user(&app, "a").await;
    let b = create_user(&app, "b").await;

    let (status, _, _) = send(&app, "POST", &format!("/api/users/{}/friends", a), Some(json!({"id": b})), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, chat, _) = send(&app, "POST", "/api/chats", Some(json!({"user_id": a, "friend_id": b})), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, "DELETE", &format!("/api/users/{}/friends/{}", a, b), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send(&app, "DELETE", &format!("/api/users/{}", a), None, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);

    let (status, _, _) = send(&app, "GET", &format!("/api/users/{}", a), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, "GET", &format!("/api/chats/{}", chat["id"]), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, chats, _) = send(&app, "GET", &format!("/api/chats/user/{}", b), None, None).await;
    assert_eq!(chats, json!([]));
}
