use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::test_utils::{body_json, json_request, location, setup_test_app};

#[tokio::test]
async fn test_genre_crud_as_admin() {
    let app = setup_test_app();
    let cookie = app.admin("root").await;

    let response = app.post_json("/admin/genres", json!({ "name": "  Mystery " }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let mystery = body_json(response).await;
    assert_eq!(mystery["name"], "Mystery");
    let id = mystery["id"].as_str().unwrap().to_string();

    let response = app.post_json("/admin/genres", json!({ "name": "Fantasy" }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listed = body_json(app.get("/admin/genres", Some(&cookie)).await).await;
    let names: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Fantasy", "Mystery"]);

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/admin/genres/{id}"),
            Some(json!({ "name": "Crime" })),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Crime");

    let response = app
        .send(json_request(Method::DELETE, &format!("/admin/genres/{id}"), None, Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send(json_request(Method::DELETE, &format!("/admin/genres/{id}"), None, Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genre_input_errors() {
    let app = setup_test_app();
    let cookie = app.admin("root").await;

    let response = app.post_json("/admin/genres", json!({ "name": "   " }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post_json("/admin/genres", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post_json("/admin/genres", json!({ "name": "Poetry" }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = app.post_json("/admin/genres", json!({ "name": "Poetry" }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "GENRE_001");

    let response = app
        .send(json_request(
            Method::PUT,
            "/admin/genres/no-such-id",
            Some(json!({ "name": "Drama" })),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_cannot_write_genres() {
    let app = setup_test_app();
    let cookie = app.member("bob").await;

    let response = app.post_json("/admin/genres", json!({ "name": "Horror" }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/unauthorized"));

    let root = app.admin("root").await;
    let listed = body_json(app.get("/admin/genres", Some(&root)).await).await;
    assert_eq!(listed, json!([]));
}
