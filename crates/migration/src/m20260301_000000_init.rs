//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: accounts and roles
//! - `shipping_methods`: the freight catalog
//! - `quotes`: priced quotes with their rate snapshot
//! - `shipments`: priced shipments with their rate snapshot
//! - `tracking_events`: append-only shipment history
//! - `warehouses`: warehouses, offices and pick-up points
//!
//! Weights, volumes, rates and costs are stored as decimal text so they
//! read back with the exact value and scale they were written with.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    Phone,
    Role,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum ShippingMethods {
    Table,
    Id,
    Name,
    Mode,
    Origin,
    RateType,
    BaseRate,
    Currency,
    TransitDaysMin,
    TransitDaysMax,
    Schedule,
    Restrictions,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Quotes {
    Table,
    Id,
    QuoteNumber,
    UserId,
    ShippingMethodId,
    ActualWeightKg,
    VolumeCbm,
    ChargeableWeightKg,
    Rate,
    RateType,
    Currency,
    TotalCost,
    PricingBasis,
    PricingMissing,
    Status,
    ValidUntil,
    CreatedAt,
}

#[derive(Iden)]
enum Shipments {
    Table,
    Id,
    TrackingNumber,
    UserId,
    ShippingMethodId,
    ConsignmentNumber,
    Description,
    Cartons,
    ActualWeightKg,
    VolumeCbm,
    ChargeableWeightKg,
    Rate,
    RateType,
    Currency,
    TotalCost,
    PricingBasis,
    PricingMissing,
    CurrentStatus,
    Origin,
    Destination,
    CreatedAt,
    UpdatedAt,
    EstimatedDelivery,
    ActualDelivery,
}

#[derive(Iden)]
enum TrackingEvents {
    Table,
    Id,
    ShipmentId,
    EventType,
    Location,
    Description,
    IsCurrent,
    EventTime,
    CreatedAt,
}

#[derive(Iden)]
enum Warehouses {
    Table,
    Id,
    Name,
    Kind,
    Country,
    AddressEn,
    AddressCn,
    #[iden = "phone_1"]
    Phone1,
    #[iden = "phone_2"]
    Phone2,
    Email,
    ShippingModes,
    IsActive,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("customer"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Shipping methods
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ShippingMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShippingMethods::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShippingMethods::Name).string().not_null())
                    .col(ColumnDef::new(ShippingMethods::Mode).string().not_null())
                    .col(ColumnDef::new(ShippingMethods::Origin).string())
                    .col(ColumnDef::new(ShippingMethods::RateType).string().not_null())
                    .col(ColumnDef::new(ShippingMethods::BaseRate).string().not_null())
                    .col(
                        ColumnDef::new(ShippingMethods::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(ShippingMethods::TransitDaysMin).integer())
                    .col(ColumnDef::new(ShippingMethods::TransitDaysMax).integer())
                    .col(ColumnDef::new(ShippingMethods::Schedule).string())
                    .col(ColumnDef::new(ShippingMethods::Restrictions).string())
                    .col(
                        ColumnDef::new(ShippingMethods::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ShippingMethods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Quotes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Quotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quotes::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Quotes::QuoteNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Quotes::UserId).uuid())
                    .col(ColumnDef::new(Quotes::ShippingMethodId).uuid())
                    .col(ColumnDef::new(Quotes::ActualWeightKg).string())
                    .col(ColumnDef::new(Quotes::VolumeCbm).string())
                    .col(ColumnDef::new(Quotes::ChargeableWeightKg).string())
                    .col(ColumnDef::new(Quotes::Rate).string())
                    .col(ColumnDef::new(Quotes::RateType).string())
                    .col(
                        ColumnDef::new(Quotes::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Quotes::TotalCost).string())
                    .col(ColumnDef::new(Quotes::PricingBasis).string())
                    .col(ColumnDef::new(Quotes::PricingMissing).string())
                    .col(
                        ColumnDef::new(Quotes::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Quotes::ValidUntil).date())
                    .col(
                        ColumnDef::new(Quotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-quotes-user_id")
                            .from(Quotes::Table, Quotes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-quotes-shipping_method_id")
                            .from(Quotes::Table, Quotes::ShippingMethodId)
                            .to(ShippingMethods::Table, ShippingMethods::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-quotes-user_id-created_at")
                    .table(Quotes::Table)
                    .col(Quotes::UserId)
                    .col(Quotes::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Shipments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Shipments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shipments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Shipments::TrackingNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shipments::UserId).uuid())
                    .col(ColumnDef::new(Shipments::ShippingMethodId).uuid())
                    .col(ColumnDef::new(Shipments::ConsignmentNumber).string())
                    .col(ColumnDef::new(Shipments::Description).text())
                    .col(ColumnDef::new(Shipments::Cartons).integer())
                    .col(ColumnDef::new(Shipments::ActualWeightKg).string())
                    .col(ColumnDef::new(Shipments::VolumeCbm).string())
                    .col(ColumnDef::new(Shipments::ChargeableWeightKg).string())
                    .col(ColumnDef::new(Shipments::Rate).string())
                    .col(ColumnDef::new(Shipments::RateType).string())
                    .col(
                        ColumnDef::new(Shipments::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Shipments::TotalCost).string())
                    .col(ColumnDef::new(Shipments::PricingBasis).string())
                    .col(ColumnDef::new(Shipments::PricingMissing).string())
                    .col(
                        ColumnDef::new(Shipments::CurrentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Shipments::Origin).string())
                    .col(ColumnDef::new(Shipments::Destination).string())
                    .col(
                        ColumnDef::new(Shipments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shipments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shipments::EstimatedDelivery).date())
                    .col(ColumnDef::new(Shipments::ActualDelivery).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shipments-user_id")
                            .from(Shipments::Table, Shipments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shipments-shipping_method_id")
                            .from(Shipments::Table, Shipments::ShippingMethodId)
                            .to(ShippingMethods::Table, ShippingMethods::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shipments-user_id-created_at")
                    .table(Shipments::Table)
                    .col(Shipments::UserId)
                    .col(Shipments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shipments-current_status")
                    .table(Shipments::Table)
                    .col(Shipments::CurrentStatus)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Tracking events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TrackingEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackingEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackingEvents::ShipmentId).uuid().not_null())
                    .col(ColumnDef::new(TrackingEvents::EventType).string().not_null())
                    .col(ColumnDef::new(TrackingEvents::Location).string())
                    .col(ColumnDef::new(TrackingEvents::Description).text())
                    .col(
                        ColumnDef::new(TrackingEvents::IsCurrent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TrackingEvents::EventTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackingEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tracking_events-shipment_id")
                            .from(TrackingEvents::Table, TrackingEvents::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tracking_events-shipment_id-event_time")
                    .table(TrackingEvents::Table)
                    .col(TrackingEvents::ShipmentId)
                    .col(TrackingEvents::EventTime)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Warehouses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Warehouses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Warehouses::Name).string().not_null())
                    .col(
                        ColumnDef::new(Warehouses::Kind)
                            .string()
                            .not_null()
                            .default("warehouse"),
                    )
                    .col(ColumnDef::new(Warehouses::Country).string())
                    .col(ColumnDef::new(Warehouses::AddressEn).text())
                    .col(ColumnDef::new(Warehouses::AddressCn).text())
                    .col(ColumnDef::new(Warehouses::Phone1).string())
                    .col(ColumnDef::new(Warehouses::Phone2).string())
                    .col(ColumnDef::new(Warehouses::Email).string())
                    .col(ColumnDef::new(Warehouses::ShippingModes).string())
                    .col(
                        ColumnDef::new(Warehouses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Warehouses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrackingEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shipments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShippingMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
