use super::ensure_non_negative;
use crate::{
    db::DbPool,
    entities::{partner, product, sku_partner},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePartnerInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePartnerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Links a partner to a product with the partner's own terms
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LinkPartnerInput {
    pub partner_id: Uuid,
    pub partner_sku: Option<String>,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    #[validate(range(min = 0))]
    pub lead_time_days: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOfferInput {
    pub partner_sku: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    #[validate(range(min = 0))]
    pub lead_time_days: Option<i32>,
}

/// A partner's offer for a product, as shown in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuOffer {
    pub id: Uuid,
    pub product_id: Uuid,
    pub partner_id: Uuid,
    pub partner_name: String,
    pub partner_sku: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub lead_time_days: Option<i32>,
}

impl SkuOffer {
    fn new(offer: sku_partner::Model, partner_name: String) -> Self {
        Self {
            id: offer.id,
            product_id: offer.product_id,
            partner_id: offer.partner_id,
            partner_name,
            partner_sku: offer.partner_sku,
            price: offer.price,
            stock: offer.stock,
            lead_time_days: offer.lead_time_days,
        }
    }
}

/// Offers for one product, cheapest first.
pub(crate) async fn offers_for_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Vec<SkuOffer>, ServiceError> {
    let rows = sku_partner::Entity::find()
        .filter(sku_partner::Column::ProductId.eq(product_id))
        .find_also_related(partner::Entity)
        .order_by_asc(sku_partner::Column::Price)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(offer, partner)| {
            let name = partner.map(|p| p.name).unwrap_or_default();
            SkuOffer::new(offer, name)
        })
        .collect())
}

/// Service for partners (suppliers) and their per-product offers
#[derive(Clone)]
pub struct PartnerService {
    db: Arc<DbPool>,
}

impl PartnerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<partner::Model>, ServiceError> {
        Ok(partner::Entity::find()
            .order_by_asc(partner::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<partner::Model, ServiceError> {
        partner::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Partner", id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreatePartnerInput) -> Result<partner::Model, ServiceError> {
        let now = Utc::now();
        let created = partner::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            legal_name: Set(input.legal_name),
            tax_id: Set(input.tax_id),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(partner_id = %created.id, "Partner created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePartnerInput,
    ) -> Result<partner::Model, ServiceError> {
        let mut model: partner::ActiveModel = self.get(id).await?.into();

        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(legal_name) = input.legal_name {
            model.legal_name = Set(Some(legal_name));
        }
        if let Some(tax_id) = input.tax_id {
            model.tax_id = Set(Some(tax_id));
        }
        if let Some(email) = input.email {
            model.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            model.address = Set(Some(address));
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = partner::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::from_delete)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Partner", id));
        }
        info!(partner_id = %id, "Partner deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_offers(&self, product_id: Uuid) -> Result<Vec<SkuOffer>, ServiceError> {
        if product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Product", product_id));
        }
        offers_for_product(&*self.db, product_id).await
    }

    /// Links a partner to a product. One offer per (product, partner) pair.
    #[instrument(skip(self, input))]
    pub async fn link(
        &self,
        product_id: Uuid,
        input: LinkPartnerInput,
    ) -> Result<SkuOffer, ServiceError> {
        ensure_non_negative(input.price)?;

        if product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Product", product_id));
        }
        let partner = self.get(input.partner_id).await?;

        let existing = sku_partner::Entity::find()
            .filter(sku_partner::Column::ProductId.eq(product_id))
            .filter(sku_partner::Column::PartnerId.eq(partner.id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Partner is already linked to this product".to_string(),
            ));
        }

        let now = Utc::now();
        let offer = sku_partner::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            partner_id: Set(partner.id),
            partner_sku: Set(input.partner_sku),
            price: Set(input.price),
            stock: Set(input.stock.unwrap_or(0)),
            lead_time_days: Set(input.lead_time_days),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %product_id, partner_id = %partner.id, "Partner linked to product");
        Ok(SkuOffer::new(offer, partner.name))
    }

    #[instrument(skip(self, input))]
    pub async fn update_offer(
        &self,
        id: Uuid,
        input: UpdateOfferInput,
    ) -> Result<SkuOffer, ServiceError> {
        let (offer, partner) = sku_partner::Entity::find_by_id(id)
            .find_also_related(partner::Entity)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("SKU partner", id))?;
        let partner_name = partner.map(|p| p.name).unwrap_or_default();

        let mut model: sku_partner::ActiveModel = offer.into();
        if let Some(partner_sku) = input.partner_sku {
            model.partner_sku = Set(Some(partner_sku));
        }
        if let Some(price) = input.price {
            ensure_non_negative(price)?;
            model.price = Set(price);
        }
        if let Some(stock) = input.stock {
            model.stock = Set(stock);
        }
        if let Some(lead_time_days) = input.lead_time_days {
            model.lead_time_days = Set(Some(lead_time_days));
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.db).await?;
        Ok(SkuOffer::new(updated, partner_name))
    }

    #[instrument(skip(self))]
    pub async fn unlink(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = sku_partner::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("SKU partner", id));
        }
        info!(sku_partner_id = %id, "Partner unlinked from product");
        Ok(())
    }
}
