//! Schema for customers, vehicles and rides.
//!
//! Run with `Migrator::up(&db, None)` at startup; the tables mirror the
//! entities in [`crate::models`].

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateCustomersTable),
            Box::new(CreateVehiclesTable),
            Box::new(CreateRidesTable),
        ]
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Created,
}

#[derive(DeriveIden)]
enum Vehicles {
    Table,
    Id,
    Make,
    Model,
    Year,
    Registration,
    Seats,
    Fuel,
    Available,
    Odometer,
}

#[derive(DeriveIden)]
enum Rides {
    Table,
    Id,
    VehicleId,
    CustomerId,
    StartDate,
    EndDate,
    OdometerStart,
    OdometerEnd,
    Status,
}

pub struct CreateCustomersTable;

impl MigrationName for CreateCustomersTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_customers_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCustomersTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Customers::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Customers::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Customers::FirstName).string_len(255).not_null())
            .col(ColumnDef::new(Customers::LastName).string_len(255).not_null())
            .col(ColumnDef::new(Customers::Email).string_len(254).null().unique_key())
            .col(ColumnDef::new(Customers::Phone).string_len(20).null())
            .col(
                ColumnDef::new(Customers::Created)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

pub struct CreateVehiclesTable;

impl MigrationName for CreateVehiclesTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_vehicles_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateVehiclesTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Vehicles::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Vehicles::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Vehicles::Make).string_len(50).not_null())
            .col(ColumnDef::new(Vehicles::Model).string_len(50).not_null())
            .col(ColumnDef::new(Vehicles::Year).integer().not_null())
            .col(
                ColumnDef::new(Vehicles::Registration)
                    .string_len(50)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Vehicles::Seats).integer().not_null())
            .col(ColumnDef::new(Vehicles::Fuel).string_len(20).not_null())
            .col(
                ColumnDef::new(Vehicles::Available)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .col(
                ColumnDef::new(Vehicles::Odometer)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

pub struct CreateRidesTable;

impl MigrationName for CreateRidesTable {
    fn name(&self) -> &'static str {
        "m20240101_000003_create_rides_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateRidesTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Rides::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Rides::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Rides::VehicleId).uuid().not_null())
            .col(ColumnDef::new(Rides::CustomerId).uuid().null())
            .col(ColumnDef::new(Rides::StartDate).date().not_null())
            .col(ColumnDef::new(Rides::EndDate).date().not_null())
            .col(ColumnDef::new(Rides::OdometerStart).integer().null())
            .col(ColumnDef::new(Rides::OdometerEnd).integer().null())
            .col(
                ColumnDef::new(Rides::Status)
                    .string_len(20)
                    .not_null()
                    .default("pending"),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_rides_vehicle")
                    .from(Rides::Table, Rides::VehicleId)
                    .to(Vehicles::Table, Vehicles::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_rides_customer")
                    .from(Rides::Table, Rides::CustomerId)
                    .to(Customers::Table, Customers::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Availability checks and ride listings filter on the vehicle
        manager
            .create_index(
                Index::create()
                    .name("idx_rides_vehicle_id")
                    .table(Rides::Table)
                    .col(Rides::VehicleId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rides::Table).to_owned())
            .await
    }
}
