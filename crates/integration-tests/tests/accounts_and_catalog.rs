//! Accounts, catalog and settings against a real database.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;

use kedai_integration_tests::{PASSWORD, TestContext, expect_error, expect_json, unique};

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_register_login_logout() {
    let ctx = TestContext::new().await;
    let username = unique("pelanggan");

    let created = expect_json(
        ctx.post("/auth/register", None)
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["role"], "member");
    assert!(created.get("password_hash").is_none());

    let resp = ctx
        .post("/auth/register", None)
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::CONFLICT, "username_taken").await;

    let resp = ctx
        .post("/auth/login", None)
        .json(&json!({ "username": username, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::UNAUTHORIZED, "invalid_credentials").await;

    let session = ctx.login(&username).await;
    let me = expect_json(
        ctx.get("/auth/me", Some(&session.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(me["username"], username.as_str());

    let resp = ctx
        .post("/auth/logout", Some(&session.token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .get("/auth/me", Some(&session.token))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::UNAUTHORIZED, "unauthorized").await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_members_cannot_manage_catalog() {
    let ctx = TestContext::new().await;
    let member = ctx.member().await;

    let resp = ctx
        .post("/products", Some(&member.token))
        .json(&json!({ "name": "Kopi Gratis", "price": 0 }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::FORBIDDEN, "forbidden").await;

    let resp = ctx
        .post("/products", None)
        .json(&json!({ "name": "Kopi Gratis", "price": 0 }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::UNAUTHORIZED, "unauthorized").await;

    let resp = ctx
        .put("/settings/store_name", Some(&member.token))
        .json(&json!({ "value": "Hijacked" }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::FORBIDDEN, "forbidden").await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_product_lifecycle() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;

    let resp = ctx
        .post("/products", Some(&admin.token))
        .json(&json!({ "name": "Kopi Mahal", "price": -1 }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::BAD_REQUEST, "validation_error").await;

    let name = unique("Es Kopi Susu");
    let id = ctx.product(&admin, &name, 22_000).await;
    let path = format!("/products/{id}");

    let detail = expect_json(ctx.get(&path, None).send().await.unwrap(), StatusCode::OK).await;
    assert_eq!(detail["name"], name.as_str());
    assert_eq!(detail["price"], 22_000);
    assert!(detail["images"].as_array().unwrap().is_empty());

    let listed = expect_json(
        ctx.get("/products?active=true", None).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(listed.as_array().unwrap().iter().any(|p| p["id"] == id.as_str()));

    expect_json(
        ctx.put(&path, Some(&admin.token))
            .json(&json!({ "is_active": false }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    let listed = expect_json(
        ctx.get("/products?active=true", None).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(!listed.as_array().unwrap().iter().any(|p| p["id"] == id.as_str()));

    expect_json(
        ctx.delete(&path, Some(&admin.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    let resp = ctx.get(&path, None).send().await.unwrap();
    expect_error(resp, StatusCode::NOT_FOUND, "not_found").await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_image_upload_and_delete() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let id = ctx.product(&admin, &unique("Kopi Tubruk"), 10_000).await;

    let part = reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name("../menu photo.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);
    let uploaded = expect_json(
        ctx.post(&format!("/products/{id}/images"), Some(&admin.token))
            .multipart(form)
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    let images = uploaded["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    let url = images[0]["image_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("uploads/products/{id}/")));
    assert!(!url.contains(".."));

    let image_id = images[0]["id"].as_str().unwrap();
    expect_json(
        ctx.delete(
            &format!("/products/{id}/images/{image_id}"),
            Some(&admin.token),
        )
        .send()
        .await
        .unwrap(),
        StatusCode::OK,
    )
    .await;
    let remaining = expect_json(
        ctx.get(&format!("/products/{id}/images"), None)
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(remaining.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_settings_upsert() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let key = unique("opening_hours");
    let path = format!("/settings/{key}");

    let resp = ctx.get(&path, None).send().await.unwrap();
    expect_error(resp, StatusCode::NOT_FOUND, "not_found").await;

    for value in [json!({ "open": "07:00" }), json!({ "open": "08:00", "close": "22:00" })] {
        let saved = expect_json(
            ctx.put(&path, Some(&admin.token))
                .json(&json!({ "value": value }))
                .send()
                .await
                .unwrap(),
            StatusCode::OK,
        )
        .await;
        assert_eq!(saved["value"], value);
    }

    let read = expect_json(ctx.get(&path, None).send().await.unwrap(), StatusCode::OK).await;
    assert_eq!(read["value"]["close"], "22:00");
}
