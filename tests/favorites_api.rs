//! Favorites, banners and notifications.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn favorites_round_trip() {
    let app = TestApp::new().await;
    let product = app.seed_product("GLOVE-L", "4.20").await;

    let (status, favorite) = app
        .as_customer(
            Method::POST,
            "/api/favorites",
            Some(json!({ "product_id": product.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{favorite}");
    assert_eq!(favorite["product"]["sku"], "GLOVE-L");

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/favorites",
            Some(json!({ "product_id": product.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = app.as_customer(Method::GET, "/api/favorites", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Favorites are per customer
    let (_, admin_list) = app.as_admin(Method::GET, "/api/favorites", None).await;
    assert_eq!(admin_list, json!([]));

    let uri = format!("/api/favorites/{}", product.id);
    let (status, _) = app.as_customer(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.as_customer(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_reject_bad_input() {
    let app = TestApp::new().await;

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/favorites",
            Some(json!({ "product_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .as_customer(Method::POST, "/api/favorites", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::GET, "/api/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_banners_inside_their_window_are_public() {
    let app = TestApp::new().await;
    let now = Utc::now();

    for (title, position, starts_at, ends_at) in [
        ("Spring sale", 2, Some(now - Duration::days(1)), Some(now + Duration::days(1))),
        ("Always on", 1, None, None),
        ("Next month", 0, Some(now + Duration::days(30)), None),
    ] {
        let (status, body) = app
            .as_admin(
                Method::POST,
                "/api/banners",
                Some(json!({
                    "title": title,
                    "image_url": "https://cdn.example.com/banner.png",
                    "position": position,
                    "starts_at": starts_at,
                    "ends_at": ends_at
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, visible) = app.call(Method::GET, "/api/banners", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = visible
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Always on", "Spring sale"]);

    let (status, all) = app.as_admin(Method::GET, "/api/banners/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, _) = app
        .as_admin(
            Method::POST,
            "/api/banners",
            Some(json!({
                "title": "Backwards",
                "image_url": "https://cdn.example.com/banner.png",
                "starts_at": now,
                "ends_at": now - Duration::hours(1)
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notifications_can_be_read_one_by_one_or_all_at_once() {
    let app = TestApp::new().await;

    for title in ["Welcome", "Price drop", "Order shipped"] {
        let (status, _) = app
            .as_admin(
                Method::POST,
                "/api/notifications",
                Some(json!({
                    "customer_id": app.customer.id,
                    "title": title,
                    "body": "details"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, list) = app
        .as_customer(Method::GET, "/api/notifications?unread_only=true", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap().clone();
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|n| n["is_read"] == false));

    let first = list[0]["id"].as_str().unwrap();
    let (status, read) = app
        .as_customer(
            Method::PATCH,
            &format!("/api/notifications/{}/read", first),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);

    // Someone else's notification is invisible
    let (status, _) = app
        .as_admin(
            Method::PATCH,
            &format!("/api/notifications/{}/read", first),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, result) = app
        .as_customer(Method::POST, "/api/notifications/read-all", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["updated"], 2);

    let (_, unread) = app
        .as_customer(Method::GET, "/api/notifications?unread_only=true", None)
        .await;
    assert_eq!(unread, json!([]));
}

#[tokio::test]
async fn sending_to_unknown_customer_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app
        .as_admin(
            Method::POST,
            "/api/notifications",
            Some(json!({ "customer_id": Uuid::new_v4(), "title": "Hi", "body": "there" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/notifications",
            Some(json!({ "customer_id": app.customer.id, "title": "Hi", "body": "there" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
