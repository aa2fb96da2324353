//! Domain services. All database access goes through these types; handlers
//! only parse requests and shape responses.

pub mod banners;
pub mod customers;
pub mod favorites;
pub mod manufacturers;
pub mod notifications;
pub mod partners;
pub mod products;
pub mod purchase_orders;
pub mod reservations;
pub mod stock;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Container for every domain service, built once at startup
#[derive(Clone)]
pub struct AppServices {
    pub customers: customers::CustomerService,
    pub manufacturers: manufacturers::ManufacturerService,
    pub products: products::ProductService,
    pub partners: partners::PartnerService,
    pub stock: stock::StockService,
    pub favorites: favorites::FavoriteService,
    pub banners: banners::BannerService,
    pub notifications: notifications::NotificationService,
    pub reservations: reservations::ReservationService,
    pub purchase_orders: purchase_orders::PurchaseOrderService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>, default_currency: String) -> Self {
        let purchase_orders =
            purchase_orders::PurchaseOrderService::new(db_pool.clone(), default_currency);
        Self {
            customers: customers::CustomerService::new(db_pool.clone(), auth),
            manufacturers: manufacturers::ManufacturerService::new(db_pool.clone()),
            products: products::ProductService::new(db_pool.clone()),
            partners: partners::PartnerService::new(db_pool.clone()),
            stock: stock::StockService::new(db_pool.clone()),
            favorites: favorites::FavoriteService::new(db_pool.clone()),
            banners: banners::BannerService::new(db_pool.clone()),
            notifications: notifications::NotificationService::new(db_pool.clone()),
            reservations: reservations::ReservationService::new(
                db_pool,
                purchase_orders.clone(),
            ),
            purchase_orders,
        }
    }
}

/// Rejects negative money amounts.
pub(crate) fn ensure_non_negative(amount: Decimal) -> Result<(), ServiceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ServiceError::ValidationError(
            "Amount must not be negative".to_string(),
        ));
    }
    Ok(())
}
