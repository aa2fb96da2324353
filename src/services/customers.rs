use crate::{
    auth::{normalize_phone, AuthError, AuthService},
    db::DbPool,
    entities::{customer, purchase_order, CustomerRole},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Self-service registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterCustomerInput {
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub company_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub tax_id: Option<String>,
}

/// Admin-side creation; same fields as registration plus role and activation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub company_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub role: Option<CustomerRole>,
    pub is_active: Option<bool>,
}

impl From<RegisterCustomerInput> for CreateCustomerInput {
    fn from(input: RegisterCustomerInput) -> Self {
        Self {
            phone: input.phone,
            password: input.password,
            name: input.name,
            company_name: input.company_name,
            email: input.email,
            tax_id: input.tax_id,
            role: None,
            is_active: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub company_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub role: Option<CustomerRole>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub search: Option<String>,
}

/// Service for customer accounts and credential checks
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    /// Registers a customer account with the `customer` role
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterCustomerInput) -> Result<customer::Model, ServiceError> {
        self.create(input.into()).await
    }

    /// Creates a customer; the phone is normalized and must be unused.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateCustomerInput) -> Result<customer::Model, ServiceError> {
        let phone = normalize_phone(&input.phone)?;
        self.ensure_phone_free(&phone, None).await?;

        let password_hash = self.auth.hash_password(&input.password).await?;
        let now = Utc::now();
        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(phone),
            name: Set(input.name),
            company_name: Set(input.company_name),
            email: Set(input.email),
            tax_id: Set(input.tax_id),
            password_hash: Set(password_hash),
            role: Set(input.role.unwrap_or(CustomerRole::Customer)),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&*self.db).await?;
        info!(customer_id = %created.id, role = %created.role, "Customer created");
        Ok(created)
    }

    /// Checks a phone/password pair. The phone must already be normalized.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<customer::Model, ServiceError> {
        let found = customer::Entity::find()
            .filter(customer::Column::Phone.eq(phone))
            .one(&*self.db)
            .await?;

        let Some(found) = found else {
            warn!("Login attempt for unknown phone");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.auth.verify_password(password, &found.password_hash).await {
            warn!(customer_id = %found.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !found.is_active {
            warn!(customer_id = %found.id, "Login attempt on disabled account");
            return Err(AuthError::AccountDisabled.into());
        }

        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))
    }

    /// Lists customers newest first; `search` matches name, phone or company.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<customer::Model>, u64), ServiceError> {
        let mut query = customer::Entity::find().order_by_desc(customer::Column::CreatedAt);

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(customer::Column::Name.contains(search))
                    .add(customer::Column::Phone.contains(search))
                    .add(customer::Column::CompanyName.contains(search)),
            );
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((customers, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut model: customer::ActiveModel = existing.into();

        if let Some(phone) = input.phone {
            let phone = normalize_phone(&phone)?;
            self.ensure_phone_free(&phone, Some(id)).await?;
            model.phone = Set(phone);
        }
        if let Some(password) = input.password {
            model.password_hash = Set(self.auth.hash_password(&password).await?);
        }
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(company_name) = input.company_name {
            model.company_name = Set(Some(company_name));
        }
        if let Some(email) = input.email {
            model.email = Set(Some(email));
        }
        if let Some(tax_id) = input.tax_id {
            model.tax_id = Set(Some(tax_id));
        }
        if let Some(role) = input.role {
            model.role = Set(role);
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.db).await?;
        info!(customer_id = %id, "Customer updated");
        Ok(updated)
    }

    /// Deletes an account with its reservations, favorites and notifications.
    /// Customers with purchase orders are kept.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::CustomerId.eq(id))
            .count(&txn)
            .await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Customer {} has {} purchase order(s)",
                id, orders
            )));
        }

        let result = customer::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Customer", id));
        }

        txn.commit().await?;
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    async fn ensure_phone_free(&self, phone: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = customer::Entity::find().filter(customer::Column::Phone.eq(phone));
        if let Some(id) = except {
            query = query.filter(customer::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(
                "A customer with this phone already exists".to_string(),
            ));
        }
        Ok(())
    }
}
