use super::{ensure_non_negative, notifications::notify};
use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{
        partner, product, purchase_order, purchase_order_file, purchase_order_payment,
        purchase_order_product, PaymentStatus, PurchaseOrderStatus,
    },
    errors::ServiceError,
    metrics,
};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderProductInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Defaults to the product's base price
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderPaymentInput {
    pub amount: Decimal,
    #[validate(length(min = 1, max = 50, message = "Payment method is required"))]
    pub method: String,
    pub status: Option<PaymentStatus>,
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderFileInput {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,
    #[validate(length(min = 1, message = "File URL is required"))]
    pub file_url: String,
    pub content_type: Option<String>,
}

/// Body of both create and full update. On update every child list replaces
/// the stored one.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PurchaseOrderInput {
    pub partner_id: Option<Uuid>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub comment: Option<String>,
    #[validate]
    pub products: Vec<OrderProductInput>,
    #[serde(default)]
    #[validate]
    pub payments: Vec<OrderPaymentInput>,
    #[serde(default)]
    #[validate]
    pub files: Vec<OrderFileInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusInput {
    pub status: PurchaseOrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub products: Vec<purchase_order_product::Model>,
    pub payments: Vec<purchase_order_payment::Model>,
    pub files: Vec<purchase_order_file::Model>,
}

/// A priced order line ready to be written
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Header fields for a new order
pub(crate) struct NewOrder {
    pub customer_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub currency: String,
    pub comment: Option<String>,
}

/// `PO-YYYYMMDD-XXXXXX` with an upper-case alphanumeric suffix
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("PO-{}-{}", now.format("%Y%m%d"), suffix)
}

pub(crate) async fn ensure_partner<C: ConnectionTrait>(
    conn: &C,
    partner_id: Uuid,
) -> Result<(), ServiceError> {
    partner::Entity::find_by_id(partner_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("Partner", partner_id))
}

/// Checks every product exists and fills in missing prices from the catalog.
async fn price_lines<C: ConnectionTrait>(
    conn: &C,
    products: &[OrderProductInput],
) -> Result<Vec<OrderLine>, ServiceError> {
    if products.is_empty() {
        return Err(ServiceError::ValidationError(
            "At least one product is required".to_string(),
        ));
    }

    let mut lines = Vec::with_capacity(products.len());
    for item in products {
        let found = product::Entity::find_by_id(item.product_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", item.product_id))?;
        let unit_price = item.unit_price.unwrap_or(found.base_price);
        ensure_non_negative(unit_price)?;
        lines.push(OrderLine {
            product_id: found.id,
            quantity: item.quantity,
            unit_price,
        });
    }
    Ok(lines)
}

/// Writes the product lines and returns the order total.
async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    lines: &[OrderLine],
) -> Result<Decimal, ServiceError> {
    let mut total = Decimal::ZERO;
    for line in lines {
        let line_total = line.total();
        purchase_order_product::ActiveModel {
            id: Set(Uuid::new_v4()),
            purchase_order_id: Set(order_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            total: Set(line_total),
        }
        .insert(conn)
        .await?;
        total += line_total;
    }
    Ok(total)
}

async fn insert_payments<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    payments: Vec<OrderPaymentInput>,
) -> Result<(), ServiceError> {
    let now = Utc::now();
    for payment in payments {
        ensure_non_negative(payment.amount)?;
        purchase_order_payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            purchase_order_id: Set(order_id),
            amount: Set(payment.amount),
            method: Set(payment.method),
            status: Set(payment.status.unwrap_or(PaymentStatus::Pending)),
            reference: Set(payment.reference),
            paid_at: Set(payment.paid_at),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn insert_files<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    files: Vec<OrderFileInput>,
) -> Result<(), ServiceError> {
    let now = Utc::now();
    for file in files {
        purchase_order_file::ActiveModel {
            id: Set(Uuid::new_v4()),
            purchase_order_id: Set(order_id),
            file_name: Set(file.file_name),
            file_url: Set(file.file_url),
            content_type: Set(file.content_type),
            uploaded_at: Set(now),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn delete_children<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<(), ServiceError> {
    purchase_order_product::Entity::delete_many()
        .filter(purchase_order_product::Column::PurchaseOrderId.eq(order_id))
        .exec(conn)
        .await?;
    purchase_order_payment::Entity::delete_many()
        .filter(purchase_order_payment::Column::PurchaseOrderId.eq(order_id))
        .exec(conn)
        .await?;
    purchase_order_file::Entity::delete_many()
        .filter(purchase_order_file::Column::PurchaseOrderId.eq(order_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Inserts an order header with its product lines; the total is the sum of the lines.
pub(crate) async fn insert_order<C: ConnectionTrait>(
    conn: &C,
    header: NewOrder,
    lines: &[OrderLine],
) -> Result<purchase_order::Model, ServiceError> {
    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let total: Decimal = lines.iter().map(OrderLine::total).sum();

    let order = purchase_order::ActiveModel {
        id: Set(order_id),
        order_number: Set(generate_order_number(now)),
        customer_id: Set(header.customer_id),
        partner_id: Set(header.partner_id),
        reservation_id: Set(header.reservation_id),
        status: Set(PurchaseOrderStatus::Pending),
        currency: Set(header.currency),
        total_amount: Set(total),
        comment: Set(header.comment),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    insert_lines(conn, order_id, lines).await?;
    Ok(order)
}

/// Loads an order the user may see. Other customers' orders are reported missing.
async fn find_accessible<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> Result<purchase_order::Model, ServiceError> {
    purchase_order::Entity::find_by_id(id)
        .one(conn)
        .await?
        .filter(|order| user.can_access(order.customer_id))
        .ok_or_else(|| ServiceError::not_found("Purchase order", id))
}

/// Stamps `updated_at` (and the new status, if any) only while the order is
/// not delivered or cancelled. Returns false when no open row matched.
async fn claim_open<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: Option<PurchaseOrderStatus>,
    now: DateTime<Utc>,
) -> Result<bool, ServiceError> {
    let mut update = purchase_order::Entity::update_many()
        .col_expr(purchase_order::Column::UpdatedAt, Expr::value(now));
    if let Some(status) = status {
        update = update.col_expr(purchase_order::Column::Status, Expr::value(status.as_str()));
    }
    let result = update
        .filter(purchase_order::Column::Id.eq(id))
        .filter(
            purchase_order::Column::Status
                .is_not_in([PurchaseOrderStatus::Delivered, PurchaseOrderStatus::Cancelled]),
        )
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

fn closed_meanwhile(id: Uuid) -> ServiceError {
    ServiceError::Conflict(format!("Purchase order {} was closed by another request", id))
}

/// Service for purchase orders and their products, payments and files
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
    default_currency: String,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DbPool>, default_currency: String) -> Self {
        Self {
            db,
            default_currency,
        }
    }

    pub(crate) fn currency_or_default(&self, currency: Option<String>) -> String {
        currency
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| self.default_currency.clone())
    }

    #[instrument(skip(self, user), fields(customer_id = %user.customer_id))]
    pub async fn list(
        &self,
        user: &AuthUser,
        filter: &PurchaseOrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<purchase_order::Model>, u64), ServiceError> {
        let mut query =
            purchase_order::Entity::find().order_by_desc(purchase_order::Column::CreatedAt);
        if !user.is_admin() {
            query = query.filter(purchase_order::Column::CustomerId.eq(user.customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders, total))
    }


    #[instrument(skip(self, user), fields(customer_id = %user.customer_id))]
    pub async fn get(&self, user: &AuthUser, id: Uuid) -> Result<PurchaseOrderDetail, ServiceError> {
        let order = find_accessible(&*self.db, user, id).await?;
        self.load_detail(order).await
    }

    pub(crate) async fn load_detail(
        &self,
        order: purchase_order::Model,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        let products = order
            .find_related(purchase_order_product::Entity)
            .all(&*self.db)
            .await?;
        let payments = order
            .find_related(purchase_order_payment::Entity)
            .order_by_asc(purchase_order_payment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let files = order
            .find_related(purchase_order_file::Entity)
            .all(&*self.db)
            .await?;

        Ok(PurchaseOrderDetail {
            order,
            products,
            payments,
            files,
        })
    }

    #[instrument(skip(self, user, input), fields(customer_id = %user.customer_id))]
    pub async fn create(
        &self,
        user: &AuthUser,
        input: PurchaseOrderInput,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;

        if let Some(partner_id) = input.partner_id {
            ensure_partner(&txn, partner_id).await?;
        }
        let lines = price_lines(&txn, &input.products).await?;

        let order = insert_order(
            &txn,
            NewOrder {
                customer_id: user.customer_id,
                partner_id: input.partner_id,
                reservation_id: None,
                currency: self.currency_or_default(input.currency),
                comment: input.comment,
            },
            &lines,
        )
        .await?;
        insert_payments(&txn, order.id, input.payments).await?;
        insert_files(&txn, order.id, input.files).await?;

        txn.commit().await?;

        metrics::record_purchase_order_created();
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            "Purchase order created"
        );
        self.load_detail(order).await
    }

    /// Replaces the header fields and every child row in one transaction.
    #[instrument(skip(self, user, input), fields(customer_id = %user.customer_id))]
    pub async fn update(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: PurchaseOrderInput,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = find_accessible(&txn, user, id).await?;
        if existing.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Purchase order is {} and can no longer be edited",
                existing.status
            )));
        }
        if !claim_open(&txn, id, None, Utc::now()).await? {
            return Err(closed_meanwhile(id));
        }

        if let Some(partner_id) = input.partner_id {
            ensure_partner(&txn, partner_id).await?;
        }
        let lines = price_lines(&txn, &input.products).await?;

        delete_children(&txn, id).await?;
        let total = insert_lines(&txn, id, &lines).await?;
        insert_payments(&txn, id, input.payments).await?;
        insert_files(&txn, id, input.files).await?;

        let currency = input
            .currency
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| existing.currency.clone());
        let mut model: purchase_order::ActiveModel = existing.into();
        model.partner_id = Set(input.partner_id);
        model.currency = Set(currency);
        model.comment = Set(input.comment);
        model.total_amount = Set(total);
        model.updated_at = Set(Utc::now());
        let order = model.update(&txn).await?;

        txn.commit().await?;

        info!(order_id = %id, lines = lines.len(), total = %total, "Purchase order replaced");
        self.load_detail(order).await
    }

    /// Moves an order to a new status and notifies its customer.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: PurchaseOrderStatus,
    ) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = purchase_order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;

        if existing.status == status {
            return Ok(existing);
        }
        if existing.status.is_terminal() {
            warn!(order_id = %id, from = %existing.status, to = %status, "Rejected status change");
            return Err(ServiceError::Conflict(format!(
                "Purchase order is already {}",
                existing.status
            )));
        }

        let now = Utc::now();
        if !claim_open(&txn, id, Some(status), now).await? {
            warn!(order_id = %id, to = %status, "Order closed by a concurrent request");
            return Err(closed_meanwhile(id));
        }

        notify(
            &txn,
            existing.customer_id,
            format!("Order {} is {}", existing.order_number, status),
            format!(
                "The status of purchase order {} changed to {}.",
                existing.order_number, status
            ),
        )
        .await?;

        txn.commit().await?;

        let order = purchase_order::Model {
            status,
            updated_at: now,
            ..existing
        };

        metrics::record_purchase_order_status(status.as_str());
        info!(order_id = %id, status = %status, "Purchase order status changed");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        delete_children(&txn, id).await?;
        let result = purchase_order::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Purchase order", id));
        }

        txn.commit().await?;
        info!(order_id = %id, "Purchase order deleted");
        Ok(())
    }
}
