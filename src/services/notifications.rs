use crate::{
    db::DbPool,
    entities::{customer, notification},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendNotificationInput {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

/// Inserts an unread notification on any connection, including an open transaction.
pub(crate) async fn notify<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
    title: impl Into<String>,
    body: impl Into<String>,
) -> Result<notification::Model, ServiceError> {
    let created = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        title: Set(title.into()),
        body: Set(body.into()),
        is_read: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;
    Ok(created)
}

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// A customer's notifications, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        customer_id: Uuid,
        filter: &NotificationFilter,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let mut query = notification::Entity::find()
            .filter(notification::Column::CustomerId.eq(customer_id))
            .order_by_desc(notification::Column::CreatedAt);
        if filter.unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }
        Ok(query.all(&*self.db).await?)
    }

    /// Marks one notification read. Someone else's notification is reported as missing.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> Result<notification::Model, ServiceError> {
        let found = notification::Entity::find_by_id(id)
            .filter(notification::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", id))?;

        if found.is_read {
            return Ok(found);
        }

        let mut model: notification::ActiveModel = found.into();
        model.is_read = Set(true);
        Ok(model.update(&*self.db).await?)
    }

    /// Returns how many notifications changed.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, customer_id: Uuid) -> Result<u64, ServiceError> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::CustomerId.eq(customer_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }

    #[instrument(skip(self, input))]
    pub async fn send(
        &self,
        input: SendNotificationInput,
    ) -> Result<notification::Model, ServiceError> {
        if customer::Entity::find_by_id(input.customer_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Customer", input.customer_id));
        }

        let created = notify(&*self.db, input.customer_id, input.title, input.body).await?;
        info!(notification_id = %created.id, customer_id = %created.customer_id, "Notification sent");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = notification::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Notification", id));
        }
        Ok(())
    }
}
