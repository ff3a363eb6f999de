//! Cart behaviour against a real database.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;

use kedai_integration_tests::{TestContext, expect_error, expect_json, unique};

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_add_merges_and_keeps_first_price() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;
    let product = ctx.product(&admin, &unique("Espresso"), 15_000).await;

    ctx.add_to_cart(&member, &product, 1).await;

    // Price change after the first add must not touch the captured price.
    expect_json(
        ctx.put(&format!("/products/{product}"), Some(&admin.token))
            .json(&json!({ "price": 18_000 }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    let cart = ctx.add_to_cart(&member, &product, 2).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["qty"], 3);
    assert_eq!(items[0]["price_at"], 15_000);
    assert_eq!(items[0]["subtotal"], 45_000);
    assert_eq!(cart["subtotal"], 45_000);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_quantity_validation() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;
    let product = ctx.product(&admin, &unique("Latte"), 20_000).await;

    for qty in [json!(0), json!(-2), json!("two")] {
        let resp = ctx
            .post("/cart/items", Some(&member.token))
            .json(&json!({ "product_id": product, "qty": qty }))
            .send()
            .await
            .unwrap();
        expect_error(resp, StatusCode::BAD_REQUEST, "validation_error").await;
    }

    let resp = ctx
        .post("/cart/items", Some(&member.token))
        .json(&json!({ "product_id": product }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::BAD_REQUEST, "validation_error").await;

    let cart = expect_json(
        ctx.get("/cart", Some(&member.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_unknown_and_inactive_products_are_rejected() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;

    let resp = ctx
        .post("/cart/items", Some(&member.token))
        .json(&json!({ "product_id": uuid::Uuid::new_v4(), "qty": 1 }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::NOT_FOUND, "product_not_found").await;

    let product = ctx.product(&admin, &unique("Musiman"), 30_000).await;
    expect_json(
        ctx.put(&format!("/products/{product}"), Some(&admin.token))
            .json(&json!({ "is_active": false }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    let resp = ctx
        .post("/cart/items", Some(&member.token))
        .json(&json!({ "product_id": product, "qty": 1 }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::NOT_FOUND, "product_not_found").await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_update_and_remove_lines() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;
    let other = ctx.member().await;
    let product = ctx.product(&admin, &unique("Cappuccino"), 25_000).await;

    let cart = ctx.add_to_cart(&member, &product, 1).await;
    let item_id = cart["items"][0]["id"].as_str().unwrap().to_owned();
    let item_path = format!("/cart/items/{item_id}");

    let updated = expect_json(
        ctx.put(&item_path, Some(&member.token))
            .json(&json!({ "qty": 4, "note": "less sugar" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["items"][0]["qty"], 4);
    assert_eq!(updated["items"][0]["note"], "less sugar");
    assert_eq!(updated["subtotal"], 100_000);

    let resp = ctx
        .put(&item_path, Some(&member.token))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::BAD_REQUEST, "validation_error").await;

    // Someone else's line is invisible to them.
    let resp = ctx
        .delete(&item_path, Some(&other.token))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::NOT_FOUND, "not_found").await;

    let emptied = expect_json(
        ctx.delete(&item_path, Some(&member.token))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(emptied["items"].as_array().unwrap().is_empty());
    assert_eq!(emptied["subtotal"], 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_merge_past_line_limit_is_rejected() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;
    let product = ctx.product(&admin, &unique("Kopi Gula Aren"), 1).await;

    ctx.add_to_cart(&member, &product, i64::from(i32::MAX)).await;

    let resp = ctx
        .post("/cart/items", Some(&member.token))
        .json(&json!({ "product_id": product, "qty": 1 }))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::BAD_REQUEST, "validation_error").await;

    let cart = expect_json(
        ctx.get("/cart", Some(&member.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(cart["items"][0]["qty"], i32::MAX);
}
