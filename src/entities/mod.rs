//! Database entities (sea-orm models) for the marketplace schema.

pub mod banner;
pub mod customer;
pub mod favorite;
pub mod manufacturer;
pub mod notification;
pub mod partner;
pub mod product;
pub mod purchase_order;
pub mod purchase_order_file;
pub mod purchase_order_payment;
pub mod purchase_order_product;
pub mod reservation;
pub mod reservation_item;
pub mod sku_partner;
pub mod stock;

pub use customer::CustomerRole;
pub use purchase_order::PurchaseOrderStatus;
pub use purchase_order_payment::PaymentStatus;
pub use reservation::ReservationStatus;
