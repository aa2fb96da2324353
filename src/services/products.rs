use super::{
    ensure_non_negative,
    partners::{offers_for_product, SkuOffer},
};
use crate::{
    db::DbPool,
    entities::{manufacturer, product, purchase_order_product, reservation_item},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

const DEFAULT_UNIT: &str = "pcs";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 64, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub manufacturer_id: Option<Uuid>,
    pub category: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    pub base_price: Decimal,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub manufacturer_id: Option<Uuid>,
    pub category: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    pub base_price: Option<Decimal>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Catalog query string filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub manufacturer_id: Option<Uuid>,
    pub category: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

/// Product page: the product, its manufacturer and every partner offer
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: product::Model,
    pub manufacturer: Option<manufacturer::Model>,
    pub offers: Vec<SkuOffer>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut query = product::Entity::find().order_by_asc(product::Column::Name);

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(search))
                    .add(product::Column::Sku.contains(search)),
            );
        }
        if let Some(manufacturer_id) = filter.manufacturer_id {
            query = query.filter(product::Column::ManufacturerId.eq(manufacturer_id));
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(product::Column::Category.eq(category));
        }
        if filter.active_only {
            query = query.filter(product::Column::IsActive.eq(true));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((products, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        let (product, manufacturer) = product::Entity::find_by_id(id)
            .find_also_related(manufacturer::Entity)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        let offers = offers_for_product(&*self.db, id).await?;

        Ok(ProductDetail {
            product,
            manufacturer,
            offers,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateProductInput) -> Result<product::Model, ServiceError> {
        ensure_non_negative(input.base_price)?;
        self.ensure_sku_free(&input.sku, None).await?;
        if let Some(manufacturer_id) = input.manufacturer_id {
            self.ensure_manufacturer(manufacturer_id).await?;
        }

        let now = Utc::now();
        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(input.sku),
            name: Set(input.name),
            description: Set(input.description),
            manufacturer_id: Set(input.manufacturer_id),
            category: Set(input.category),
            unit: Set(input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string())),
            base_price: Set(input.base_price),
            image_url: Set(input.image_url),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %created.id, sku = %created.sku, "Product created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let mut model: product::ActiveModel = self.get(id).await?.into();

        if let Some(sku) = input.sku {
            self.ensure_sku_free(&sku, Some(id)).await?;
            model.sku = Set(sku);
        }
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(manufacturer_id) = input.manufacturer_id {
            self.ensure_manufacturer(manufacturer_id).await?;
            model.manufacturer_id = Set(Some(manufacturer_id));
        }
        if let Some(category) = input.category {
            model.category = Set(Some(category));
        }
        if let Some(unit) = input.unit {
            model.unit = Set(unit);
        }
        if let Some(base_price) = input.base_price {
            ensure_non_negative(base_price)?;
            model.base_price = Set(base_price);
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(Some(image_url));
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.db).await?;
        info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Deletes a product with its offers, stock rows and favorites. Products
    /// still on a reservation or purchase order are kept.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let reserved = reservation_item::Entity::find()
            .filter(reservation_item::Column::ProductId.eq(id))
            .count(&txn)
            .await?;
        let ordered = purchase_order_product::Entity::find()
            .filter(purchase_order_product::Column::ProductId.eq(id))
            .count(&txn)
            .await?;
        if reserved + ordered > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product {} is used by {} reservation item(s) and {} purchase order line(s)",
                id, reserved, ordered
            )));
        }

        let result = product::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Product", id));
        }

        txn.commit().await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn ensure_sku_free(&self, sku: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = product::Entity::find().filter(product::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(product::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product with SKU '{}' already exists",
                sku
            )));
        }
        Ok(())
    }

    async fn ensure_manufacturer(&self, id: Uuid) -> Result<(), ServiceError> {
        manufacturer::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Manufacturer", id))
    }
}
