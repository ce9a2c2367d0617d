mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{Value, json};

async fn create_chair(app: &TestApp, auth: &str) -> Value {
    let created = send(
        &app.router,
        json_request(
            "POST",
            "/products",
            &json!({
                "title": "Oak chair",
                "text": "Solid oak chair with a long description",
                "shortText": "Solid oak chair",
                "img": "data:image/png;base64,aGVsbG8="
            }),
            Some(auth),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    body_json(created).await
}

#[tokio::test]
async fn product_crud_flow() {
    let app = test_app();
    let auth = bearer(&login_token(&app.router).await);

    let product = create_chair(&app, &auth).await;
    let id = product["id"].as_str().unwrap().to_string();

    let fetched = send(&app.router, empty_request("GET", &format!("/products/{}", id), None)).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["shortText"], "Solid oak chair");

    // 未提供 img 时被清空
    let patched = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/products/{}", id),
            &json!({ "title": "Walnut chair", "shortText": "Solid walnut chair" }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(patched.status(), StatusCode::OK);
    let patched = body_json(patched).await;
    assert_eq!(patched["title"], "Walnut chair");
    assert_eq!(patched["shortText"], "Solid walnut chair");
    assert_eq!(patched["text"], "Solid oak chair with a long description");
    assert!(patched["img"].is_null());

    let removed = send(
        &app.router,
        empty_request("DELETE", &format!("/products/{}", id), Some(&auth)),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::OK);
    assert_eq!(body_json(removed).await, json!({ "id": id }));

    let missing = send(&app.router, empty_request("GET", &format!("/products/{}", id), None)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["error_message"], "Product not found");

    // 重复删除同样返回 id
    let removed = send(
        &app.router,
        empty_request("DELETE", &format!("/products/{}", id), Some(&auth)),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::OK);
}

#[tokio::test]
async fn patch_without_short_text_is_rejected() {
    let app = test_app();
    let auth = bearer(&login_token(&app.router).await);
    let product = create_chair(&app, &auth).await;
    let id = product["id"].as_str().unwrap();

    let response = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/products/{}", id),
            &json!({ "title": "Walnut chair" }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unchanged = send(&app.router, empty_request("GET", &format!("/products/{}", id), None)).await;
    let unchanged = body_json(unchanged).await;
    assert_eq!(unchanged["title"], "Oak chair");
    assert_eq!(unchanged["img"], "data:image/png;base64,aGVsbG8=");
}

#[tokio::test]
async fn patch_of_missing_product_is_not_found() {
    let app = test_app();
    let auth = bearer(&login_token(&app.router).await);

    let response = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/products/{}", uuid::Uuid::new_v4()),
            &json!({ "shortText": "Solid walnut chair" }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_text_upper_bounds_are_enforced() {
    let app = test_app();
    let auth = bearer(&login_token(&app.router).await);

    let response = send(
        &app.router,
        json_request(
            "POST",
            "/products",
            &json!({
                "title": "Oak chair",
                "text": "x".repeat(20001),
                "shortText": "y".repeat(10001),
            }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    // 恰好在上限上是允许的
    let response = send(
        &app.router,
        json_request(
            "POST",
            "/products",
            &json!({
                "title": "Oak chair",
                "text": "x".repeat(20000),
                "shortText": "y".repeat(10000),
            }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn product_writes_require_token() {
    let app = test_app();

    let response = send(
        &app.router,
        empty_request("DELETE", &format!("/products/{}", uuid::Uuid::new_v4()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
