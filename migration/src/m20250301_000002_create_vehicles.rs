use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(string_len(Vehicle::Name, 120).not_null())
                    .col(string_len(Vehicle::Category, 16).not_null())
                    .col(string_len(Vehicle::FuelType, 16).not_null())
                    .col(double(Vehicle::HourlyRate).not_null())
                    .col(text(Vehicle::ImageUrl).not_null())
                    .col(boolean(Vehicle::IsAvailable).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    Name,
    Category,
    FuelType,
    HourlyRate,
    ImageUrl,
    IsAvailable,
    CreatedAt,
    UpdatedAt,
}
