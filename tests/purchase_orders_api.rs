//! Purchase order creation, full replacement, status changes and deletion.

mod common;

use axum::http::{Method, StatusCode};
use common::{dec, dec_field, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_order(app: &TestApp, body: Value) -> Value {
    let (status, order) = app
        .as_customer(Method::POST, "/api/purchase-orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    order
}

#[tokio::test]
async fn create_prices_lines_and_keeps_children() {
    let app = TestApp::new().await;
    let beam = app.seed_product("BEAM-6M", "120.00").await;
    let bolt = app.seed_product("BOLT-M12", "0.80").await;

    let order = create_order(
        &app,
        json!({
            "currency": "rub",
            "products": [
                { "product_id": beam.id, "quantity": 3 },
                { "product_id": bolt.id, "quantity": 50, "unit_price": "0.70" }
            ],
            "payments": [{ "amount": "100.00", "method": "invoice" }],
            "files": [{ "file_name": "drawing.pdf", "file_url": "https://files.example.com/drawing.pdf" }]
        }),
    )
    .await;

    assert_eq!(order["status"], "pending");
    assert_eq!(order["currency"], "RUB");
    assert_eq!(order["customer_id"], app.customer.id.to_string());
    assert_eq!(dec_field(&order["total_amount"]), dec("395.00"));
    assert_eq!(order["payments"][0]["status"], "pending");
    assert_eq!(order["files"][0]["file_name"], "drawing.pdf");

    let products = order["products"].as_array().unwrap();
    let bolt_line = products
        .iter()
        .find(|p| p["product_id"] == bolt.id.to_string())
        .unwrap();
    assert_eq!(dec_field(&bolt_line["total"]), dec("35.00"));
}

#[tokio::test]
async fn put_replaces_every_child_and_recomputes_total() {
    let app = TestApp::new().await;
    let pipe = app.seed_product("PIPE-32", "12.40").await;
    let elbow = app.seed_product("ELBOW-32", "3.10").await;

    let order = create_order(
        &app,
        json!({
            "products": [{ "product_id": pipe.id, "quantity": 10 }],
            "payments": [{ "amount": "50.00", "method": "card" }],
            "files": [{ "file_name": "a.pdf", "file_url": "https://files.example.com/a.pdf" }]
        }),
    )
    .await;
    assert_eq!(dec_field(&order["total_amount"]), dec("124.00"));
    let uri = format!("/api/purchase-orders/{}", order["id"].as_str().unwrap());

    let (status, replaced) = app
        .as_customer(
            Method::PUT,
            &uri,
            Some(json!({
                "comment": "revised",
                "products": [
                    { "product_id": pipe.id, "quantity": 3 },
                    { "product_id": elbow.id, "quantity": 4 }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{replaced}");
    assert_eq!(replaced["comment"], "revised");
    assert_eq!(replaced["order_number"], order["order_number"]);
    assert_eq!(replaced["products"].as_array().unwrap().len(), 2);
    assert_eq!(replaced["payments"], json!([]));
    assert_eq!(replaced["files"], json!([]));
    assert_eq!(dec_field(&replaced["total_amount"]), dec("49.60"));

    let (_, fetched) = app.as_customer(Method::GET, &uri, None).await;
    assert_eq!(fetched["products"].as_array().unwrap().len(), 2);
    assert_eq!(dec_field(&fetched["total_amount"]), dec("49.60"));
}

#[tokio::test]
async fn invalid_orders_are_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let product = app.seed_product("ROD-8", "2.00").await;

    let (status, _) = app
        .as_customer(Method::POST, "/api/purchase-orders", Some(json!({ "products": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/purchase-orders",
            Some(json!({ "currency": "EURO", "products": [{ "product_id": product.id, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/purchase-orders",
            Some(json!({
                "products": [
                    { "product_id": product.id, "quantity": 1 },
                    { "product_id": Uuid::new_v4(), "quantity": 1 }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/purchase-orders",
            Some(json!({
                "partner_id": Uuid::new_v4(),
                "products": [{ "product_id": product.id, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = app.as_customer(Method::GET, "/api/purchase-orders", None).await;
    assert_eq!(page["pagination"]["total"], 0);
}

#[tokio::test]
async fn status_change_notifies_the_customer() {
    let app = TestApp::new().await;
    let product = app.seed_product("PANEL-1", "80.00").await;
    let order = create_order(
        &app,
        json!({ "products": [{ "product_id": product.id, "quantity": 1 }] }),
    )
    .await;
    let id = order["id"].as_str().unwrap();
    let status_uri = format!("/api/purchase-orders/{}/status", id);

    // Customers cannot move their own orders
    let (status, _) = app
        .as_customer(Method::PATCH, &status_uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, confirmed) = app
        .as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    let (_, notifications) = app.as_customer(Method::GET, "/api/notifications", None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    let title = notifications[0]["title"].as_str().unwrap();
    assert!(title.contains(order["order_number"].as_str().unwrap()));
    assert!(title.contains("confirmed"));

    // Same status again changes nothing
    let (status, _) = app
        .as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, notifications) = app.as_customer(Method::GET, "/api/notifications", None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    let (status, _) = app
        .as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "paid" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .as_customer(
            Method::PUT,
            &format!("/api/purchase-orders/{}", id),
            Some(json!({ "products": [{ "product_id": product.id, "quantity": 2 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "lost" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_sees_all_orders_and_deletes_them() {
    let app = TestApp::new().await;
    let product = app.seed_product("GLASS-4", "15.00").await;
    let order = create_order(
        &app,
        json!({
            "products": [{ "product_id": product.id, "quantity": 2 }],
            "payments": [{ "amount": "30.00", "method": "transfer", "status": "completed" }]
        }),
    )
    .await;
    let uri = format!("/api/purchase-orders/{}", order["id"].as_str().unwrap());

    let (_, admin_page) = app.as_admin(Method::GET, "/api/purchase-orders", None).await;
    assert_eq!(admin_page["pagination"]["total"], 1);

    let (_, pending) = app
        .as_admin(Method::GET, "/api/purchase-orders?status=pending", None)
        .await;
    assert_eq!(pending["pagination"]["total"], 1);
    let (_, paid) = app
        .as_admin(Method::GET, "/api/purchase-orders?status=paid", None)
        .await;
    assert_eq!(paid["pagination"]["total"], 0);

    let (status, _) = app.as_customer(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.as_customer(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn racing_terminal_statuses_apply_only_one() {
    let app = TestApp::new().await;
    let product = app.seed_product("DOOR-80", "140.00").await;
    let order = create_order(
        &app,
        json!({ "products": [{ "product_id": product.id, "quantity": 1 }] }),
    )
    .await;
    let order_uri = format!("/api/purchase-orders/{}", order["id"].as_str().unwrap());
    let status_uri = format!("{}/status", order_uri);

    let ((delivered, _), (cancelled, _)) = tokio::join!(
        app.as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "delivered" }))),
        app.as_admin(Method::PATCH, &status_uri, Some(json!({ "status": "cancelled" }))),
    );
    let statuses = [delivered, cancelled];
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::OK).count(),
        1,
        "{statuses:?}"
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(),
        1,
        "{statuses:?}"
    );

    let (_, notifications) = app.as_customer(Method::GET, "/api/notifications", None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    // Edits after the close are refused
    let (_, fetched) = app.as_customer(Method::GET, &order_uri, None).await;
    let expected = if delivered == StatusCode::OK { "delivered" } else { "cancelled" };
    assert_eq!(fetched["status"], expected);
    let (status, _) = app
        .as_customer(
            Method::PUT,
            &order_uri,
            Some(json!({ "products": [{ "product_id": product.id, "quantity": 3 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
