use axum::http::{header, StatusCode};
use serde_json::json;

use crate::test_utils::{body_json, body_text, location, session_cookie, setup_test_app};

#[tokio::test]
async fn test_register_login_me_logout_scenario() {
    let app = setup_test_app();

    let response = app.register("alice", "a@x.com", "secret123").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password").is_none());

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "a@x.com", "password": "secret123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("ex-libris="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=604800"));
    let cookie = session_cookie(&response).unwrap();
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], true);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["isAdmin"], false);

    let response = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], true);
    assert_eq!(body["user"]["username"], "alice");

    let response = app.post_json("/api/auth/logout", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.contains("Max-Age=0"));
    let after_logout = session_cookie(&response).unwrap();
    assert_eq!(body_json(response).await["message"], "Logged out");

    let response = app.get("/api/auth/me", Some(&after_logout)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "isLoggedIn": false }));
}

#[tokio::test]
async fn test_replaying_cookie_after_logout_is_rejected() {
    let app = setup_test_app();
    let cookie = app.member("alice").await;

    let response = app.post_json("/api/auth/logout", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The browser would drop it, but an attacker may keep the old bytes
    let response = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["isLoggedIn"], false);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = setup_test_app();
    let response = app.post_json("/api/auth/logout", json!({}), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.post_json("/api/auth/logout", json!({}), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first_user() {
    let app = setup_test_app();
    let response = app.register("alice", "a@x.com", "secret123").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.register("mallory", "a@x.com", "different-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "USER_001");

    let response = app.register("alice", "other@x.com", "different-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "USER_002");

    // The original credentials still work and the profile is unchanged
    let cookie = app.login("a@x.com", "secret123").await;
    let body = body_json(app.get("/api/auth/me", Some(&cookie)).await).await;
    assert_eq!(body["user"]["username"], "alice");

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "a@x.com", "password": "different-pass" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let app = setup_test_app();
    app.register("alice", "a@x.com", "secret123").await;

    let wrong_password = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "a@x.com", "password": "not-it-at-all" }),
            None,
        )
        .await;
    let unknown_user = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "nobody@x.com", "password": "secret123" }),
            None,
        )
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());
    assert!(unknown_user.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(wrong_password).await, body_json(unknown_user).await);
}

#[tokio::test]
async fn test_login_accepts_username_or_email() {
    let app = setup_test_app();
    app.register("alice", "a@x.com", "secret123").await;

    let by_username = app.login("alice", "secret123").await;
    let by_email = app.login("A@X.com", "secret123").await;

    for cookie in [by_username, by_email] {
        let body = body_json(app.get("/api/auth/me", Some(&cookie)).await).await;
        assert_eq!(body["user"]["email"], "a@x.com");
    }
}

#[tokio::test]
async fn test_missing_fields_are_bad_requests() {
    let app = setup_test_app();

    let response = app
        .post_json("/api/auth/register", json!({ "email": "a@x.com", "password": "secret123" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VAL_001");

    let response = app
        .post_json("/api/auth/register", json!({ "username": "alice", "email": "a@x.com" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/api/auth/login", json!({ "password": "secret123" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/api/auth/login", json!({ "email": "a@x.com" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_registration_input_is_rejected() {
    let app = setup_test_app();

    let response = app.register("alice", "not-an-email", "secret123").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.register("alice", "a@x.com", "short").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.register("a", "a@x.com", "secret123").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for identifier in ["alice", "a", "a@x.com"] {
        assert!(app.state.users.find_by_identifier(identifier).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_garbage_or_tampered_cookie_is_logged_out() {
    let app = setup_test_app();
    let cookie = app.member("alice").await;

    let response = app.get("/api/auth/me", Some("ex-libris=not-a-token")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Flip one character in the sealed value
    let (name, value) = cookie.split_once('=').unwrap();
    let mut chars: Vec<char> = value.chars().collect();
    let mid = chars.len() / 2;
    chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{name}={}", chars.into_iter().collect::<String>());

    let response = app.get("/api/auth/me", Some(&tampered)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["isLoggedIn"], false);
}

#[tokio::test]
async fn test_cookie_from_another_server_is_rejected() {
    let first = setup_test_app();
    let second = {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut settings = crate::test_utils::test_settings(&temp_dir);
        settings.session.secret = Some("a-second-server-with-its-own-secret-key".to_string());
        let storage = backend_lib::storage::FlatFileStorage::new(temp_dir.path()).unwrap();
        let state = std::sync::Arc::new(backend_lib::AppState::new(storage, settings).unwrap());
        (backend_lib::create_router(state), temp_dir)
    };

    let cookie = first.member("alice").await;
    let request = crate::test_utils::json_request(
        axum::http::Method::GET,
        "/api/auth/me",
        None,
        Some(&cookie),
    );
    let response = tower::ServiceExt::oneshot(second.0, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = setup_test_app();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_html_forms_register_and_log_in() {
    let app = setup_test_app();

    let response = app
        .post_form(
            "/api/auth/register",
            "username=alice&email=a%40x.com&password=secret123",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = app
        .post_form("/api/auth/login", "identifier=alice&password=secret123")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/profile"));
    let cookie = session_cookie(&response).unwrap();

    let response = app.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("alice"));
}

#[tokio::test]
async fn test_failed_form_login_sets_no_cookie() {
    let app = setup_test_app();
    app.member("alice").await;

    let response = app
        .post_form("/api/auth/login", "identifier=alice&password=wrong-password")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = app.post_form("/api/auth/login", "identifier=alice").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_created_at_means_account_creation() {
    let app = setup_test_app();
    app.register("alice", "a@x.com", "secret123").await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "identifier": "alice", "password": "secret123" }),
            None,
        )
        .await;
    let cookie = session_cookie(&response).unwrap();
    let login = body_json(response).await;
    let account_created = login["user"]["createdAt"].clone();
    assert!(account_created.is_string());

    let me = body_json(app.get("/api/auth/me", Some(&cookie)).await).await;
    assert!(me["user"].get("createdAt").is_none());
    assert!(me["sessionCreatedAt"].is_string());

    // A second login starts a new session but the account keeps its timestamp
    let again = app
        .post_json(
            "/api/auth/login",
            json!({ "identifier": "alice", "password": "secret123" }),
            None,
        )
        .await;
    assert_eq!(body_json(again).await["user"]["createdAt"], account_created);
}
