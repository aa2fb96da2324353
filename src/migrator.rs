use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_engagement_tables::Migration),
            Box::new(m20240101_000004_create_reservation_tables::Migration),
            Box::new(m20240101_000005_create_purchase_order_tables::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Phone,
    Name,
    CompanyName,
    Email,
    TaxId,
    PasswordHash,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Manufacturers {
    Table,
    Id,
    Name,
    Country,
    Description,
    LogoUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Sku,
    Name,
    Description,
    ManufacturerId,
    Category,
    Unit,
    BasePrice,
    ImageUrl,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Partners {
    Table,
    Id,
    Name,
    LegalName,
    TaxId,
    Email,
    Phone,
    Address,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SkuPartners {
    Table,
    Id,
    ProductId,
    PartnerId,
    PartnerSku,
    Price,
    Stock,
    LeadTimeDays,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Stock {
    Table,
    Id,
    ProductId,
    Warehouse,
    Quantity,
    Reserved,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    Id,
    CustomerId,
    ProductId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Banners {
    Table,
    Id,
    Title,
    ImageUrl,
    LinkUrl,
    Position,
    IsActive,
    StartsAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    CustomerId,
    Title,
    Body,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    CustomerId,
    Status,
    Comment,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReservationItems {
    Table,
    Id,
    ReservationId,
    ProductId,
    PartnerId,
    Quantity,
    Price,
}

#[derive(DeriveIden)]
enum PurchaseOrders {
    Table,
    Id,
    OrderNumber,
    CustomerId,
    PartnerId,
    ReservationId,
    Status,
    Currency,
    TotalAmount,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PurchaseOrderProducts {
    Table,
    Id,
    PurchaseOrderId,
    ProductId,
    Quantity,
    UnitPrice,
    Total,
}

#[derive(DeriveIden)]
enum PurchaseOrderPayments {
    Table,
    Id,
    PurchaseOrderId,
    Amount,
    Method,
    Status,
    Reference,
    PaidAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PurchaseOrderFiles {
    Table,
    Id,
    PurchaseOrderId,
    FileName,
    FileUrl,
    ContentType,
    UploadedAt,
}

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(14, 2)
        .not_null()
        .default(0)
        .to_owned()
}

fn created_at(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

mod m20240101_000001_create_customers_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Customers::Phone)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::CompanyName).string().null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::TaxId).string_len(32).null())
                        .col(ColumnDef::new(Customers::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Role)
                                .string_len(20)
                                .not_null()
                                .default("customer"),
                        )
                        .col(
                            ColumnDef::new(Customers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(created_at(Customers::CreatedAt))
                        .col(created_at(Customers::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_catalog_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Manufacturers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Manufacturers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Manufacturers::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Manufacturers::Country).string().null())
                        .col(ColumnDef::new(Manufacturers::Description).text().null())
                        .col(ColumnDef::new(Manufacturers::LogoUrl).string().null())
                        .col(created_at(Manufacturers::CreatedAt))
                        .col(created_at(Manufacturers::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::ManufacturerId).uuid().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(
                            ColumnDef::new(Products::Unit)
                                .string_len(16)
                                .not_null()
                                .default("pcs"),
                        )
                        .col(money(Products::BasePrice))
                        .col(ColumnDef::new(Products::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(created_at(Products::CreatedAt))
                        .col(created_at(Products::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_manufacturer")
                                .from(Products::Table, Products::ManufacturerId)
                                .to(Manufacturers::Table, Manufacturers::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_manufacturer_id")
                        .table(Products::Table)
                        .col(Products::ManufacturerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::Category)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Partners::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Partners::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Partners::Name).string().not_null())
                        .col(ColumnDef::new(Partners::LegalName).string().null())
                        .col(ColumnDef::new(Partners::TaxId).string_len(32).null())
                        .col(ColumnDef::new(Partners::Email).string().null())
                        .col(ColumnDef::new(Partners::Phone).string_len(32).null())
                        .col(ColumnDef::new(Partners::Address).text().null())
                        .col(
                            ColumnDef::new(Partners::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(created_at(Partners::CreatedAt))
                        .col(created_at(Partners::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SkuPartners::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SkuPartners::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SkuPartners::ProductId).uuid().not_null())
                        .col(ColumnDef::new(SkuPartners::PartnerId).uuid().not_null())
                        .col(ColumnDef::new(SkuPartners::PartnerSku).string_len(64).null())
                        .col(money(SkuPartners::Price))
                        .col(
                            ColumnDef::new(SkuPartners::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SkuPartners::LeadTimeDays).integer().null())
                        .col(created_at(SkuPartners::CreatedAt))
                        .col(created_at(SkuPartners::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sku_partners_product")
                                .from(SkuPartners::Table, SkuPartners::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sku_partners_partner")
                                .from(SkuPartners::Table, SkuPartners::PartnerId)
                                .to(Partners::Table, Partners::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_sku_partners_product_partner")
                        .table(SkuPartners::Table)
                        .col(SkuPartners::ProductId)
                        .col(SkuPartners::PartnerId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Stock::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Stock::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Stock::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Stock::Warehouse).string_len(64).not_null())
                        .col(
                            ColumnDef::new(Stock::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Stock::Reserved)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(created_at(Stock::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_product")
                                .from(Stock::Table, Stock::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_stock_product_warehouse")
                        .table(Stock::Table)
                        .col(Stock::ProductId)
                        .col(Stock::Warehouse)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stock::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SkuPartners::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Partners::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Manufacturers::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_engagement_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_engagement_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Favorites::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Favorites::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Favorites::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Favorites::ProductId).uuid().not_null())
                        .col(created_at(Favorites::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_favorites_customer")
                                .from(Favorites::Table, Favorites::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_favorites_product")
                                .from(Favorites::Table, Favorites::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_favorites_customer_product")
                        .table(Favorites::Table)
                        .col(Favorites::CustomerId)
                        .col(Favorites::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Banners::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Banners::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Banners::Title).string().not_null())
                        .col(ColumnDef::new(Banners::ImageUrl).string().not_null())
                        .col(ColumnDef::new(Banners::LinkUrl).string().null())
                        .col(
                            ColumnDef::new(Banners::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Banners::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Banners::StartsAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Banners::EndsAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(created_at(Banners::CreatedAt))
                        .col(created_at(Banners::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(ColumnDef::new(Notifications::Body).text().not_null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(created_at(Notifications::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_customer")
                                .from(Notifications::Table, Notifications::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_customer_id")
                        .table(Notifications::Table)
                        .col(Notifications::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Banners::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Favorites::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_reservation_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_reservation_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reservations::Status)
                                .string_len(20)
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(Reservations::Comment).text().null())
                        .col(
                            ColumnDef::new(Reservations::ExpiresAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(created_at(Reservations::CreatedAt))
                        .col(created_at(Reservations::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservations_customer")
                                .from(Reservations::Table, Reservations::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReservationItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReservationItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReservationItems::ReservationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReservationItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ReservationItems::PartnerId).uuid().null())
                        .col(
                            ColumnDef::new(ReservationItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(money(ReservationItems::Price))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservation_items_reservation")
                                .from(ReservationItems::Table, ReservationItems::ReservationId)
                                .to(Reservations::Table, Reservations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservation_items_product")
                                .from(ReservationItems::Table, ReservationItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reservation_items_reservation_id")
                        .table(ReservationItems::Table)
                        .col(ReservationItems::ReservationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReservationItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Reservations::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000005_create_purchase_order_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::OrderNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::PartnerId).uuid().null())
                        .col(ColumnDef::new(PurchaseOrders::ReservationId).uuid().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Currency)
                                .string_len(3)
                                .not_null()
                                .default("USD"),
                        )
                        .col(money(PurchaseOrders::TotalAmount))
                        .col(ColumnDef::new(PurchaseOrders::Comment).text().null())
                        .col(created_at(PurchaseOrders::CreatedAt))
                        .col(created_at(PurchaseOrders::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_customer")
                                .from(PurchaseOrders::Table, PurchaseOrders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_partner")
                                .from(PurchaseOrders::Table, PurchaseOrders::PartnerId)
                                .to(Partners::Table, Partners::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_customer_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_status")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderProducts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderProducts::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderProducts::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderProducts::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(money(PurchaseOrderProducts::UnitPrice))
                        .col(money(PurchaseOrderProducts::Total))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_products_purchase_order")
                                .from(
                                    PurchaseOrderProducts::Table,
                                    PurchaseOrderProducts::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_products_product")
                                .from(PurchaseOrderProducts::Table, PurchaseOrderProducts::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderPayments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderPayments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderPayments::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(money(PurchaseOrderPayments::Amount))
                        .col(
                            ColumnDef::new(PurchaseOrderPayments::Method)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderPayments::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(PurchaseOrderPayments::Reference).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrderPayments::PaidAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(created_at(PurchaseOrderPayments::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_payments_purchase_order")
                                .from(
                                    PurchaseOrderPayments::Table,
                                    PurchaseOrderPayments::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderFiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderFiles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderFiles::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderFiles::FileName).string().not_null())
                        .col(ColumnDef::new(PurchaseOrderFiles::FileUrl).string().not_null())
                        .col(ColumnDef::new(PurchaseOrderFiles::ContentType).string().null())
                        .col(created_at(PurchaseOrderFiles::UploadedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_files_purchase_order")
                                .from(
                                    PurchaseOrderFiles::Table,
                                    PurchaseOrderFiles::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderFiles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrderPayments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrderProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }
}
