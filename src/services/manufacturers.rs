use crate::{db::DbPool, entities::manufacturer, errors::ServiceError};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateManufacturerInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateManufacturerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

#[derive(Clone)]
pub struct ManufacturerService {
    db: Arc<DbPool>,
}

impl ManufacturerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<manufacturer::Model>, ServiceError> {
        Ok(manufacturer::Entity::find()
            .order_by_asc(manufacturer::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<manufacturer::Model, ServiceError> {
        manufacturer::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Manufacturer", id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateManufacturerInput,
    ) -> Result<manufacturer::Model, ServiceError> {
        self.ensure_name_free(&input.name, None).await?;

        let now = Utc::now();
        let created = manufacturer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            country: Set(input.country),
            description: Set(input.description),
            logo_url: Set(input.logo_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(manufacturer_id = %created.id, "Manufacturer created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateManufacturerInput,
    ) -> Result<manufacturer::Model, ServiceError> {
        let mut model: manufacturer::ActiveModel = self.get(id).await?.into();

        if let Some(name) = input.name {
            self.ensure_name_free(&name, Some(id)).await?;
            model.name = Set(name);
        }
        if let Some(country) = input.country {
            model.country = Set(Some(country));
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(logo_url) = input.logo_url {
            model.logo_url = Set(Some(logo_url));
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    /// Products keep existing; their `manufacturer_id` is cleared by the foreign key.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = manufacturer::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Manufacturer", id));
        }
        info!(manufacturer_id = %id, "Manufacturer deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query =
            manufacturer::Entity::find().filter(manufacturer::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(manufacturer::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Manufacturer '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
