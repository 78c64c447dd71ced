use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Roles are stored as short strings rather than a native enum type
        // so the schema also applies to SQLite.
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(uuid(Profile::Id).primary_key())
                    .col(string_len(Profile::Email, 255).not_null().unique_key())
                    .col(string_len(Profile::PasswordHash, 255).not_null())
                    .col(string_len(Profile::Role, 16).not_null().default("customer"))
                    .col(string_len(Profile::Name, 100).not_null())
                    .col(text(Profile::Address).not_null())
                    .col(string_len(Profile::Mobile, 10).not_null())
                    .col(date(Profile::DateOfBirth).not_null())
                    .col(string_len(Profile::NationalId, 12).not_null())
                    .col(
                        timestamp_with_time_zone(Profile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Profile::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Profile {
    Table,
    Id,
    Email,
    PasswordHash,
    Role,
    Name,
    Address,
    Mobile,
    DateOfBirth,
    NationalId,
    CreatedAt,
    UpdatedAt,
}
