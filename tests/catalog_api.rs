//! Products, manufacturers, partner offers and stock.

mod common;

use axum::http::{Method, StatusCode};
use common::{dec, dec_field, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn admin_manages_products_and_anyone_browses() {
    let app = TestApp::new().await;

    let (status, maker) = app
        .as_admin(
            Method::POST,
            "/api/manufacturers",
            Some(json!({ "name": "Bolt Works", "country": "DE" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{maker}");

    let (status, product) = app
        .as_admin(
            Method::POST,
            "/api/products",
            Some(json!({
                "sku": "BOLT-M8",
                "name": "Hex bolt M8",
                "manufacturer_id": maker["id"],
                "category": "fasteners",
                "base_price": "0.35"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    assert_eq!(product["unit"], "pcs");
    assert_eq!(dec_field(&product["base_price"]), dec("0.35"));

    app.seed_product("NUT-M8", "0.10").await;

    let (status, page) = app
        .call(Method::GET, "/api/products?search=BOLT&per_page=10", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["data"][0]["sku"], "BOLT-M8");

    let (status, detail) = app
        .call(
            Method::GET,
            &format!("/api/products/{}", product["id"].as_str().unwrap()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["manufacturer"]["name"], "Bolt Works");
    assert_eq!(detail["offers"], json!([]));
}

#[tokio::test]
async fn catalog_changes_need_admin_role() {
    let app = TestApp::new().await;
    let body = json!({ "sku": "X-1", "name": "X", "base_price": "1.00" });

    let (status, _) = app
        .call(Method::POST, "/api/products", Some(body.clone()), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .as_customer(Method::POST, "/api/products", Some(body))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.as_customer(Method::GET, "/api/partners", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_sku_is_unique_and_price_non_negative() {
    let app = TestApp::new().await;
    app.seed_product("DUP-1", "5.00").await;

    let (status, _) = app
        .as_admin(
            Method::POST,
            "/api/products",
            Some(json!({ "sku": "DUP-1", "name": "Again", "base_price": "5.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .as_admin(
            Method::POST,
            "/api/products",
            Some(json!({ "sku": "NEG-1", "name": "Negative", "base_price": "-1.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .as_admin(
            Method::POST,
            "/api/products",
            Some(json!({
                "sku": "ORPHAN-1",
                "name": "Orphan",
                "base_price": "1.00",
                "manufacturer_id": Uuid::new_v4()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manufacturer_names_are_unique() {
    let app = TestApp::new().await;
    let body = json!({ "name": "Acme" });

    let (status, _) = app
        .as_admin(Method::POST, "/api/manufacturers", Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .as_admin(Method::POST, "/api/manufacturers", Some(body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = app.call(Method::GET, "/api/manufacturers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn partner_offers_are_listed_cheapest_first() {
    let app = TestApp::new().await;
    let product = app.seed_product("PIPE-20", "12.00").await;
    let pricey = app.seed_partner("Pricey Supply").await;
    let cheap = app.seed_partner("Cheap Supply").await;

    let uri = format!("/api/products/{}/partners", product.id);
    let (status, offer) = app
        .as_admin(
            Method::POST,
            &uri,
            Some(json!({ "partner_id": pricey.id, "price": "11.50", "stock": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{offer}");
    assert_eq!(offer["partner_name"], "Pricey Supply");

    app.seed_offer(&product, &cheap, "9.90").await;

    let (status, offers) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let offers = offers.as_array().unwrap();
    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0]["partner_id"], cheap.id.to_string());
    assert_eq!(dec_field(&offers[0]["price"]), dec("9.90"));

    // Same pair again
    let (status, _) = app
        .as_admin(
            Method::POST,
            &uri,
            Some(json!({ "partner_id": pricey.id, "price": "10.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .as_admin(
            Method::POST,
            &uri,
            Some(json!({ "partner_id": Uuid::new_v4(), "price": "10.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .as_admin(
            Method::POST,
            &format!("/api/products/{}/partners", Uuid::new_v4()),
            Some(json!({ "partner_id": pricey.id, "price": "10.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let offer_id = offer["id"].as_str().unwrap();
    let (status, updated) = app
        .as_admin(
            Method::PATCH,
            &format!("/api/sku-partners/{}", offer_id),
            Some(json!({ "price": "8.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&updated["price"]), dec("8.00"));

    let (status, _) = app
        .as_admin(Method::DELETE, &format!("/api/sku-partners/{}", offer_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .as_admin(Method::DELETE, &format!("/api/sku-partners/{}", offer_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_reports_available_quantity() {
    let app = TestApp::new().await;
    let product = app.seed_product("VALVE-1", "30.00").await;

    let (status, row) = app
        .as_admin(
            Method::PUT,
            "/api/stock",
            Some(json!({
                "product_id": product.id,
                "warehouse": "MSK-1",
                "quantity": 40,
                "reserved": 15
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{row}");
    assert_eq!(row["available"], 25);

    // Second write for the same warehouse overwrites the row
    let (status, row) = app
        .as_admin(
            Method::PUT,
            "/api/stock",
            Some(json!({
                "product_id": product.id,
                "warehouse": "MSK-1",
                "quantity": 10
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["available"], 10);

    let (status, page) = app
        .call(
            Method::GET,
            &format!("/api/stock?product_id={}", product.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["data"][0]["quantity"], 10);

    let (status, _) = app
        .as_admin(
            Method::PUT,
            "/api/stock",
            Some(json!({
                "product_id": product.id,
                "warehouse": "MSK-1",
                "quantity": 1,
                "reserved": 2
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn products_on_orders_or_reservations_cannot_be_deleted() {
    let app = TestApp::new().await;
    let ordered = app.seed_product("BEAM-H200", "310.00").await;
    let reserved = app.seed_product("PLATE-10", "55.00").await;

    let (status, order) = app
        .as_customer(
            Method::POST,
            "/api/purchase-orders",
            Some(json!({ "products": [{ "product_id": ordered.id, "quantity": 2 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/reservations",
            Some(json!({ "items": [{ "product_id": reserved.id, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for product in [&ordered, &reserved] {
        let uri = format!("/api/products/{}", product.id);
        let (status, body) = app.as_admin(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");
        let (status, _) = app.call(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    // Once the order is gone the product can go too
    let (status, _) = app
        .as_admin(
            Method::DELETE,
            &format!("/api/purchase-orders/{}", order["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .as_admin(Method::DELETE, &format!("/api/products/{}", ordered.id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleting_a_product_drops_its_offers_and_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("HINGE-2", "4.00").await;
    let partner = app.seed_partner("Hinge Hub").await;
    app.seed_offer(&product, &partner, "3.50").await;
    let (status, _) = app
        .as_admin(
            Method::PUT,
            "/api/stock",
            Some(json!({ "product_id": product.id, "warehouse": "SPB-2", "quantity": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .as_admin(Method::DELETE, &format!("/api/products/{}", product.id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, page) = app
        .call(
            Method::GET,
            &format!("/api/stock?product_id={}", product.id),
            None,
            None,
        )
        .await;
    assert_eq!(page["pagination"]["total"], 0);
    let (status, _) = app
        .as_admin(Method::GET, &format!("/api/partners/{}", partner.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_partner_drops_offers_and_keeps_orders() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIRE-1.5", "0.90").await;
    let partner = app.seed_partner("Wire World").await;
    app.seed_offer(&product, &partner, "0.85").await;

    let (status, order) = app
        .as_customer(
            Method::POST,
            "/api/purchase-orders",
            Some(json!({
                "partner_id": partner.id,
                "products": [{ "product_id": product.id, "quantity": 100 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");

    let (status, _) = app
        .as_admin(Method::DELETE, &format!("/api/partners/{}", partner.id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, offers) = app
        .call(
            Method::GET,
            &format!("/api/products/{}/partners", product.id),
            None,
            None,
        )
        .await;
    assert_eq!(offers, json!([]));

    let (status, kept) = app
        .as_customer(
            Method::GET,
            &format!("/api/purchase-orders/{}", order["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(kept["partner_id"].is_null());
}
