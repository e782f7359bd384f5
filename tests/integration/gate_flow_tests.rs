use axum::http::StatusCode;
use backend_lib::storage::UserStore;

use crate::test_utils::{body_json, body_text, location, setup_test_app};

#[tokio::test]
async fn test_anonymous_is_sent_to_login() {
    let app = setup_test_app();

    for path in ["/admin/genres", "/profile"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/login"), "{path}");
    }
}

#[tokio::test]
async fn test_member_is_sent_to_unauthorized_for_admin_paths() {
    let app = setup_test_app();
    let cookie = app.member("bob").await;

    let response = app.get("/admin/genres", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/unauthorized"));

    let response = app.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("bob"));
}

#[tokio::test]
async fn test_admin_is_allowed() {
    let app = setup_test_app();
    let cookie = app.admin("root").await;

    let response = app.get("/admin/genres", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));

    let response = app.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Administrator"));
}

#[tokio::test]
async fn test_public_pages_need_no_session() {
    let app = setup_test_app();

    for path in ["/", "/login", "/register"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    let response = app.get("/unauthorized", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_similar_prefix_is_not_gated() {
    let app = setup_test_app();
    // Not under /admin, so it falls through to a plain 404
    let response = app.get("/administrator", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_grant_takes_effect_on_next_login() {
    let app = setup_test_app();
    let stale = app.member("carol").await;

    app.storage.set_admin("carol", true).await.unwrap();

    // The old cookie still carries isAdmin = false
    let response = app.get("/admin/genres", Some(&stale)).await;
    assert_eq!(location(&response), Some("/unauthorized"));

    let fresh = app.login("carol", "secret123").await;
    let response = app.get("/admin/genres", Some(&fresh)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logged_out_admin_is_sent_to_login() {
    let app = setup_test_app();
    let cookie = app.admin("root").await;

    let response = app
        .post_json("/api/auth/logout", serde_json::json!({}), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/admin/genres", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}
