use super::purchase_orders::{
    ensure_partner, insert_order, NewOrder, OrderLine, PurchaseOrderDetail, PurchaseOrderService,
};
use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{product, reservation, reservation_item, sku_partner, ReservationStatus},
    errors::ServiceError,
    metrics,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReservationItemInput {
    pub product_id: Uuid,
    /// Reserve at this partner's offer price instead of the base price
    pub partner_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Body of both create and full update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReservationInput {
    #[validate]
    pub items: Vec<ReservationItemInput>,
    pub comment: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ConvertReservationInput {
    pub partner_id: Option<Uuid>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationFilter {
    /// Only honoured for admins
    pub customer_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: reservation::Model,
    pub items: Vec<reservation_item::Model>,
    pub total: Decimal,
}

impl ReservationDetail {
    fn new(reservation: reservation::Model, items: Vec<reservation_item::Model>) -> Self {
        let total = items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.price)
            .sum();
        Self {
            reservation,
            items,
            total,
        }
    }
}

/// The partner shared by every item, if there is exactly one.
fn common_partner(items: &[reservation_item::Model]) -> Option<Uuid> {
    let first = items.first()?.partner_id?;
    items
        .iter()
        .all(|item| item.partner_id == Some(first))
        .then_some(first)
}

fn ensure_future(expires_at: Option<DateTime<Utc>>) -> Result<(), ServiceError> {
    match expires_at {
        Some(at) if at <= Utc::now() => Err(ServiceError::ValidationError(
            "expires_at must be in the future".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Loads a reservation the user may see. Other customers' reservations are reported missing.
async fn find_accessible<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> Result<reservation::Model, ServiceError> {
    reservation::Entity::find_by_id(id)
        .one(conn)
        .await?
        .filter(|r| user.can_access(r.customer_id))
        .ok_or_else(|| ServiceError::not_found("Reservation", id))
}

fn ensure_active(reservation: &reservation::Model, action: &str) -> Result<(), ServiceError> {
    if reservation.status != ReservationStatus::Active {
        return Err(ServiceError::Conflict(format!(
            "Reservation is {} and {}",
            reservation.status.as_str(),
            action
        )));
    }
    Ok(())
}

/// Moves an `active` reservation to `status`. Returns false when the row was
/// no longer active, so only one request can leave that state.
async fn leave_active<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: ReservationStatus,
    now: DateTime<Utc>,
) -> Result<bool, ServiceError> {
    let result = reservation::Entity::update_many()
        .col_expr(reservation::Column::Status, Expr::value(status.as_str()))
        .col_expr(reservation::Column::UpdatedAt, Expr::value(now))
        .filter(reservation::Column::Id.eq(id))
        .filter(reservation::Column::Status.eq(ReservationStatus::Active))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Prices each item: the partner's offer when a partner is named, else the base price.
async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    reservation_id: Uuid,
    items: &[ReservationItemInput],
) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "At least one item is required".to_string(),
        ));
    }

    for item in items {
        let found = product::Entity::find_by_id(item.product_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", item.product_id))?;

        let price = match item.partner_id {
            Some(partner_id) => {
                ensure_partner(conn, partner_id).await?;
                sku_partner::Entity::find()
                    .filter(sku_partner::Column::ProductId.eq(found.id))
                    .filter(sku_partner::Column::PartnerId.eq(partner_id))
                    .one(conn)
                    .await?
                    .map(|offer| offer.price)
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Partner {} does not offer product {}",
                            partner_id, found.id
                        ))
                    })?
            }
            None => found.base_price,
        };

        reservation_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            reservation_id: Set(reservation_id),
            product_id: Set(found.id),
            partner_id: Set(item.partner_id),
            quantity: Set(item.quantity),
            price: Set(price),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Service for reservations and their conversion into purchase orders
#[derive(Clone)]
pub struct ReservationService {
    db: Arc<DbPool>,
    purchase_orders: PurchaseOrderService,
}

impl ReservationService {
    pub fn new(db: Arc<DbPool>, purchase_orders: PurchaseOrderService) -> Self {
        Self {
            db,
            purchase_orders,
        }
    }

    #[instrument(skip(self, user), fields(customer_id = %user.customer_id))]
    pub async fn list(
        &self,
        user: &AuthUser,
        filter: &ReservationFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<reservation::Model>, u64), ServiceError> {
        let mut query =
            reservation::Entity::find().order_by_desc(reservation::Column::CreatedAt);

        if user.is_admin() {
            if let Some(customer_id) = filter.customer_id {
                query = query.filter(reservation::Column::CustomerId.eq(customer_id));
            }
        } else {
            query = query.filter(reservation::Column::CustomerId.eq(user.customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(reservation::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let reservations = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((reservations, total))
    }

    async fn load_detail(
        &self,
        reservation: reservation::Model,
    ) -> Result<ReservationDetail, ServiceError> {
        let items = reservation
            .find_related(reservation_item::Entity)
            .all(&*self.db)
            .await?;
        Ok(ReservationDetail::new(reservation, items))
    }

    #[instrument(skip(self, user), fields(customer_id = %user.customer_id))]
    pub async fn get(&self, user: &AuthUser, id: Uuid) -> Result<ReservationDetail, ServiceError> {
        let found = find_accessible(&*self.db, user, id).await?;
        self.load_detail(found).await
    }

    #[instrument(skip(self, user, input), fields(customer_id = %user.customer_id))]
    pub async fn create(
        &self,
        user: &AuthUser,
        input: ReservationInput,
    ) -> Result<ReservationDetail, ServiceError> {
        ensure_future(input.expires_at)?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let created = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(user.customer_id),
            status: Set(ReservationStatus::Active),
            comment: Set(input.comment),
            expires_at: Set(input.expires_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        insert_items(&txn, created.id, &input.items).await?;

        txn.commit().await?;

        metrics::record_reservation_created();
        info!(reservation_id = %created.id, items = input.items.len(), "Reservation created");
        self.load_detail(created).await
    }

    /// Replaces comment, expiry and items of an active reservation.
    #[instrument(skip(self, user, input), fields(customer_id = %user.customer_id))]
    pub async fn update(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: ReservationInput,
    ) -> Result<ReservationDetail, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = find_accessible(&txn, user, id).await?;
        ensure_active(&existing, "can no longer be changed")?;
        ensure_future(input.expires_at)?;

        let now = Utc::now();
        let touched = reservation::Entity::update_many()
            .col_expr(reservation::Column::Comment, Expr::value(input.comment.clone()))
            .col_expr(reservation::Column::ExpiresAt, Expr::value(input.expires_at))
            .col_expr(reservation::Column::UpdatedAt, Expr::value(now))
            .filter(reservation::Column::Id.eq(id))
            .filter(reservation::Column::Status.eq(ReservationStatus::Active))
            .exec(&txn)
            .await?;
        if touched.rows_affected == 0 {
            return Err(ServiceError::Conflict(
                "Reservation was closed by another request".to_string(),
            ));
        }

        reservation_item::Entity::delete_many()
            .filter(reservation_item::Column::ReservationId.eq(id))
            .exec(&txn)
            .await?;
        insert_items(&txn, id, &input.items).await?;

        txn.commit().await?;

        let updated = reservation::Model {
            comment: input.comment,
            expires_at: input.expires_at,
            updated_at: now,
            ..existing
        };

        info!(reservation_id = %id, "Reservation updated");
        self.load_detail(updated).await
    }

    /// Cancels a reservation. Cancelling twice is a no-op.
    #[instrument(skip(self, user), fields(customer_id = %user.customer_id))]
    pub async fn cancel(
        &self,
        user: &AuthUser,
        id: Uuid,
    ) -> Result<reservation::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let mut existing = find_accessible(&txn, user, id).await?;
        let now = Utc::now();
        if existing.status == ReservationStatus::Active
            && !leave_active(&txn, id, ReservationStatus::Cancelled, now).await?
        {
            existing = find_accessible(&txn, user, id).await?;
        }

        match existing.status {
            ReservationStatus::Cancelled => Ok(existing),
            ReservationStatus::Converted => Err(ServiceError::Conflict(
                "Reservation has already been converted".to_string(),
            )),
            ReservationStatus::Active => {
                txn.commit().await?;
                info!(reservation_id = %id, "Reservation cancelled");
                Ok(reservation::Model {
                    status: ReservationStatus::Cancelled,
                    updated_at: now,
                    ..existing
                })
            }
        }
    }

    /// Turns an active reservation into a pending purchase order with the same lines.
    #[instrument(skip(self, user, input), fields(customer_id = %user.customer_id))]
    pub async fn convert(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: ConvertReservationInput,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = find_accessible(&txn, user, id).await?;
        ensure_active(&existing, "cannot be converted")?;
        let now = Utc::now();
        if existing.expires_at.is_some_and(|at| at <= now) {
            return Err(ServiceError::Conflict("Reservation has expired".to_string()));
        }
        if !leave_active(&txn, id, ReservationStatus::Converted, now).await? {
            return Err(ServiceError::Conflict(
                "Reservation was converted or cancelled by another request".to_string(),
            ));
        }

        let items = existing
            .find_related(reservation_item::Entity)
            .all(&txn)
            .await?;
        if items.is_empty() {
            return Err(ServiceError::Conflict("Reservation has no items".to_string()));
        }

        let partner_id = input.partner_id.or_else(|| common_partner(&items));
        if let Some(partner_id) = partner_id {
            ensure_partner(&txn, partner_id).await?;
        }

        let lines: Vec<OrderLine> = items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.price,
            })
            .collect();

        let order = insert_order(
            &txn,
            NewOrder {
                customer_id: existing.customer_id,
                partner_id,
                reservation_id: Some(existing.id),
                currency: self.purchase_orders.currency_or_default(input.currency),
                comment: input.comment.or_else(|| existing.comment.clone()),
            },
            &lines,
        )
        .await?;

        txn.commit().await?;

        metrics::record_purchase_order_created();
        info!(
            reservation_id = %id,
            order_id = %order.id,
            order_number = %order.order_number,
            "Reservation converted to purchase order"
        );
        self.purchase_orders.load_detail(order).await
    }
}
