use crate::{db::DbPool, entities::banner, errors::ServiceError};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_create_window"))]
pub struct CreateBannerInput {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    pub link_url: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBannerInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

fn check_window(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end <= start => {
            Err(ValidationError::new("ends_at must be after starts_at"))
        }
        _ => Ok(()),
    }
}

fn validate_create_window(input: &CreateBannerInput) -> Result<(), ValidationError> {
    check_window(input.starts_at, input.ends_at)
}

#[derive(Clone)]
pub struct BannerService {
    db: Arc<DbPool>,
}

impl BannerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Active banners whose date window contains `now`, ordered by position.
    #[instrument(skip(self))]
    pub async fn list_visible(&self, now: DateTime<Utc>) -> Result<Vec<banner::Model>, ServiceError> {
        let banners = banner::Entity::find()
            .filter(banner::Column::IsActive.eq(true))
            .order_by_asc(banner::Column::Position)
            .all(&*self.db)
            .await?;

        Ok(banners
            .into_iter()
            .filter(|b| b.is_visible_at(now))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<banner::Model>, ServiceError> {
        Ok(banner::Entity::find()
            .order_by_asc(banner::Column::Position)
            .order_by_desc(banner::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<banner::Model, ServiceError> {
        banner::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Banner", id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateBannerInput) -> Result<banner::Model, ServiceError> {
        let now = Utc::now();
        let created = banner::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            image_url: Set(input.image_url),
            link_url: Set(input.link_url),
            position: Set(input.position.unwrap_or(0)),
            is_active: Set(input.is_active.unwrap_or(true)),
            starts_at: Set(input.starts_at),
            ends_at: Set(input.ends_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(banner_id = %created.id, "Banner created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateBannerInput,
    ) -> Result<banner::Model, ServiceError> {
        let existing = self.get(id).await?;
        check_window(
            input.starts_at.or(existing.starts_at),
            input.ends_at.or(existing.ends_at),
        )
        .map_err(|e| ServiceError::ValidationError(e.code.to_string()))?;

        let mut model: banner::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(image_url);
        }
        if let Some(link_url) = input.link_url {
            model.link_url = Set(Some(link_url));
        }
        if let Some(position) = input.position {
            model.position = Set(position);
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        if let Some(starts_at) = input.starts_at {
            model.starts_at = Set(Some(starts_at));
        }
        if let Some(ends_at) = input.ends_at {
            model.ends_at = Set(Some(ends_at));
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = banner::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Banner", id));
        }
        info!(banner_id = %id, "Banner deleted");
        Ok(())
    }
}
