use crate::{
    db::DbPool,
    entities::{product, stock},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockFilter {
    pub product_id: Option<Uuid>,
    pub warehouse: Option<String>,
    #[serde(default)]
    pub in_stock_only: bool,
}

/// Sets the on-hand and reserved quantities of a product in one warehouse
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertStockInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 64, message = "Warehouse is required"))]
    pub warehouse: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub reserved: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<stock::Model> for StockView {
    fn from(row: stock::Model) -> Self {
        Self {
            available: row.available(),
            id: row.id,
            product_id: row.product_id,
            warehouse: row.warehouse,
            quantity: row.quantity,
            reserved: row.reserved,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct StockService {
    db: Arc<DbPool>,
}

impl StockService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &StockFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<StockView>, u64), ServiceError> {
        let mut query = stock::Entity::find()
            .order_by_asc(stock::Column::ProductId)
            .order_by_asc(stock::Column::Warehouse);

        if let Some(product_id) = filter.product_id {
            query = query.filter(stock::Column::ProductId.eq(product_id));
        }
        if let Some(warehouse) = filter.warehouse.as_deref().filter(|w| !w.is_empty()) {
            query = query.filter(stock::Column::Warehouse.eq(warehouse));
        }
        if filter.in_stock_only {
            query = query.filter(
                Expr::col(stock::Column::Quantity).gt(Expr::col(stock::Column::Reserved)),
            );
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows.into_iter().map(StockView::from).collect(), total))
    }

    /// Creates or overwrites the row for (product, warehouse).
    #[instrument(skip(self, input))]
    pub async fn upsert(&self, input: UpsertStockInput) -> Result<StockView, ServiceError> {
        let reserved = input.reserved.unwrap_or(0);
        if reserved > input.quantity {
            return Err(ServiceError::ValidationError(
                "Reserved quantity cannot exceed quantity".to_string(),
            ));
        }

        if product::Entity::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Product", input.product_id));
        }

        let existing = stock::Entity::find()
            .filter(stock::Column::ProductId.eq(input.product_id))
            .filter(stock::Column::Warehouse.eq(input.warehouse.as_str()))
            .one(&*self.db)
            .await?;

        let now = Utc::now();
        let saved = match existing {
            Some(row) => {
                let mut model: stock::ActiveModel = row.into();
                model.quantity = Set(input.quantity);
                model.reserved = Set(reserved);
                model.updated_at = Set(now);
                model.update(&*self.db).await?
            }
            None => {
                stock::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(input.product_id),
                    warehouse: Set(input.warehouse),
                    quantity: Set(input.quantity),
                    reserved: Set(reserved),
                    updated_at: Set(now),
                }
                .insert(&*self.db)
                .await?
            }
        };

        info!(
            product_id = %saved.product_id,
            warehouse = %saved.warehouse,
            quantity = saved.quantity,
            "Stock level set"
        );
        Ok(saved.into())
    }
}
