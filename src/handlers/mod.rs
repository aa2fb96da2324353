//! HTTP handlers, one module per domain area. Each module exposes a router
//! with paths relative to `/api`; [`api_routes`] merges them.

pub mod auth;
pub mod banners;
pub mod common;
pub mod customers;
pub mod favorites;
pub mod manufacturers;
pub mod notifications;
pub mod partners;
pub mod products;
pub mod purchase_orders;
pub mod reservations;
pub mod stock;

use crate::AppState;
use axum::Router;
use std::sync::Arc;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::auth_routes())
        .merge(customers::customer_routes())
        .merge(products::product_routes())
        .merge(manufacturers::manufacturer_routes())
        .merge(partners::partner_routes())
        .merge(stock::stock_routes())
        .merge(favorites::favorite_routes())
        .merge(banners::banner_routes())
        .merge(notifications::notification_routes())
        .merge(reservations::reservation_routes())
        .merge(purchase_orders::purchase_order_routes())
}
