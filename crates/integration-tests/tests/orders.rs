//! Order placement against a real database.
//!
//! Run with: `cargo test -p kedai-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use kedai_integration_tests::{TestContext, expect_error, expect_json, unique};

async fn order_count(ctx: &TestContext, user_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1::uuid")
        .bind(user_id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_place_order_snapshots_cart() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;

    let espresso = ctx.product(&admin, &unique("Espresso"), 15_000).await;
    let latte = ctx.product(&admin, &unique("Latte"), 20_000).await;
    ctx.add_to_cart(&member, &espresso, 2).await;
    let cart = ctx.add_to_cart(&member, &latte, 1).await;
    assert_eq!(cart["subtotal"], 50_000);

    let placed = expect_json(
        ctx.post("/orders", Some(&member.token)).send().await.unwrap(),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(placed["subtotal"], 50_000);
    assert_eq!(placed["total"], 50_000);
    let order_id = placed["id"].as_str().unwrap();

    let detail = expect_json(
        ctx.get(&format!("/orders/{order_id}"), Some(&member.token))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["status"], "pending");
    assert_eq!(detail["discount"], 0);
    assert_eq!(detail["tax"], 0);
    assert_eq!(detail["shipping_fee"], 0);

    let items = detail["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let sum: i64 = items.iter().map(|i| i["subtotal"].as_i64().unwrap()).sum();
    assert_eq!(sum, 50_000);
    let espresso_line = items
        .iter()
        .find(|i| i["product_id"] == espresso.as_str())
        .unwrap();
    assert_eq!(espresso_line["qty"], 2);
    assert_eq!(espresso_line["price"], 15_000);
    assert_eq!(espresso_line["subtotal"], 30_000);

    // The old cart is closed; the next read opens a fresh, empty one.
    let fresh = expect_json(
        ctx.get("/cart", Some(&member.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_ne!(fresh["id"], cart["id"]);
    assert_eq!(fresh["items"], Value::Array(Vec::new()));
    assert_eq!(fresh["subtotal"], 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_empty_cart_writes_nothing() {
    let ctx = TestContext::new().await;
    let member = ctx.member().await;

    // No cart at all.
    expect_error(
        ctx.post("/orders", Some(&member.token)).send().await.unwrap(),
        StatusCode::BAD_REQUEST,
        "empty_cart",
    )
    .await;

    // An active cart with no lines.
    expect_json(
        ctx.get("/cart", Some(&member.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    expect_error(
        ctx.post("/orders", Some(&member.token)).send().await.unwrap(),
        StatusCode::BAD_REQUEST,
        "empty_cart",
    )
    .await;

    assert_eq!(order_count(&ctx, &member.user_id).await, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_concurrent_placement_creates_one_order() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;
    let product = ctx.product(&admin, &unique("Cappuccino"), 25_000).await;
    ctx.add_to_cart(&member, &product, 1).await;

    let (a, b) = tokio::join!(
        ctx.post("/orders", Some(&member.token)).send(),
        ctx.post("/orders", Some(&member.token)).send(),
    );
    let mut statuses = [a.unwrap().status(), b.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(order_count(&ctx, &member.user_id).await, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_order_visibility() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let owner = ctx.member().await;
    let stranger = ctx.member().await;
    let product = ctx.product(&admin, &unique("Latte"), 20_000).await;
    ctx.add_to_cart(&owner, &product, 3).await;

    let placed = expect_json(
        ctx.post("/orders", Some(&owner.token)).send().await.unwrap(),
        StatusCode::CREATED,
    )
    .await;
    let path = format!("/orders/{}", placed["id"].as_str().unwrap());

    expect_error(
        ctx.get(&path, Some(&stranger.token)).send().await.unwrap(),
        StatusCode::FORBIDDEN,
        "forbidden",
    )
    .await;
    let as_admin = expect_json(
        ctx.get(&path, Some(&admin.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(as_admin["total"], 60_000);

    expect_error(
        ctx.get(
            &format!("/orders/{}", Uuid::new_v4()),
            Some(&owner.token),
        )
        .send()
        .await
        .unwrap(),
        StatusCode::NOT_FOUND,
        "not_found",
    )
    .await;

    let own = expect_json(
        ctx.get("/orders", Some(&owner.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    let theirs = expect_json(
        ctx.get("/orders", Some(&stranger.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(theirs.as_array().unwrap().is_empty());

    expect_error(
        ctx.get("/orders/all", Some(&owner.token)).send().await.unwrap(),
        StatusCode::FORBIDDEN,
        "forbidden",
    )
    .await;
    let all = expect_json(
        ctx.get("/orders/all", Some(&admin.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(
        all.as_array()
            .unwrap()
            .iter()
            .any(|o| o["id"] == placed["id"] && o["username"] == owner.username.as_str())
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_order_keeps_snapshot_after_catalog_changes() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;
    let name = unique("Kopi Tubruk");
    let product = ctx.product(&admin, &name, 12_000).await;
    ctx.add_to_cart(&member, &product, 1).await;

    let placed = expect_json(
        ctx.post("/orders", Some(&member.token)).send().await.unwrap(),
        StatusCode::CREATED,
    )
    .await;

    expect_json(
        ctx.put(&format!("/products/{product}"), Some(&admin.token))
            .json(&serde_json::json!({ "name": "Renamed", "price": 99_000 }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    expect_json(
        ctx.delete(&format!("/products/{product}"), Some(&admin.token))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    let detail = expect_json(
        ctx.get(
            &format!("/orders/{}", placed["id"].as_str().unwrap()),
            Some(&member.token),
        )
        .send()
        .await
        .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["items"][0]["product_name"], name.as_str());
    assert_eq!(detail["items"][0]["price"], 12_000);
    assert_eq!(detail["total"], 12_000);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set KEDAI_TEST_DATABASE_URL)"]
async fn test_failed_item_insert_rolls_back_placement() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let member = ctx.member().await;

    let ok_product = ctx.product(&admin, &unique("Espresso"), 15_000).await;
    let bad_name = unique("Tolak");
    let bad_product = ctx.product(&admin, &bad_name, 20_000).await;
    ctx.add_to_cart(&member, &ok_product, 1).await;
    let cart = ctx.add_to_cart(&member, &bad_product, 1).await;

    // Make the second order item insert fail inside the placement transaction
    let suffix = Uuid::new_v4().simple().to_string();
    let function = format!("reject_item_{suffix}");
    let trigger = format!("reject_item_trg_{suffix}");
    sqlx::query(&format!(
        r"
        CREATE FUNCTION {function}() RETURNS trigger AS $$
        BEGIN
            IF NEW.product_name = '{bad_name}' THEN
                RAISE EXCEPTION 'order item rejected';
            END IF;
            RETURN NEW;
        END
        $$ LANGUAGE plpgsql
        "
    ))
    .execute(&ctx.pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TRIGGER {trigger} BEFORE INSERT ON order_items \
         FOR EACH ROW EXECUTE FUNCTION {function}()"
    ))
    .execute(&ctx.pool)
    .await
    .unwrap();

    let resp = ctx.post("/orders", Some(&member.token)).send().await.unwrap();

    sqlx::query(&format!("DROP TRIGGER {trigger} ON order_items"))
        .execute(&ctx.pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP FUNCTION {function}()"))
        .execute(&ctx.pool)
        .await
        .unwrap();

    expect_error(resp, StatusCode::INTERNAL_SERVER_ERROR, "server_error").await;
    assert_eq!(order_count(&ctx, &member.user_id).await, 0);
    let items: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_items WHERE product_name = $1",
    )
    .bind(&bad_name)
    .fetch_one(&ctx.pool)
    .await
    .unwrap();
    assert_eq!(items, 0);

    let after = expect_json(
        ctx.get("/cart", Some(&member.token)).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(after["id"], cart["id"]);
    assert_eq!(after["items"].as_array().unwrap().len(), 2);
}
