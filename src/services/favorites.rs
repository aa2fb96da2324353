use crate::{
    db::DbPool,
    entities::{favorite, product},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddFavoriteInput {
    pub product_id: Uuid,
}

/// A favorite together with the product it points at
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product: Option<product::Model>,
}

impl FavoriteView {
    fn new(favorite: favorite::Model, product: Option<product::Model>) -> Self {
        Self {
            id: favorite.id,
            product_id: favorite.product_id,
            created_at: favorite.created_at,
            product,
        }
    }
}

#[derive(Clone)]
pub struct FavoriteService {
    db: Arc<DbPool>,
}

impl FavoriteService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, customer_id: Uuid) -> Result<Vec<FavoriteView>, ServiceError> {
        let rows = favorite::Entity::find()
            .filter(favorite::Column::CustomerId.eq(customer_id))
            .find_also_related(product::Entity)
            .order_by_desc(favorite::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(fav, product)| FavoriteView::new(fav, product))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn add(&self, customer_id: Uuid, product_id: Uuid) -> Result<FavoriteView, ServiceError> {
        let product = product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

        if self.find(customer_id, product_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Product is already in favorites".to_string(),
            ));
        }

        let created = favorite::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            product_id: Set(product_id),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(customer_id = %customer_id, product_id = %product_id, "Favorite added");
        Ok(FavoriteView::new(created, Some(product)))
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, customer_id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        let result = favorite::Entity::delete_many()
            .filter(favorite::Column::CustomerId.eq(customer_id))
            .filter(favorite::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Product is not in favorites".to_string(),
            ));
        }
        info!(customer_id = %customer_id, product_id = %product_id, "Favorite removed");
        Ok(())
    }

    async fn find(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<favorite::Model>, ServiceError> {
        Ok(favorite::Entity::find()
            .filter(favorite::Column::CustomerId.eq(customer_id))
            .filter(favorite::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?)
    }
}
