use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_profiles::Profile;
use super::m20250301_000003_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // A null user_id marks an administrator broadcast
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(string_len(Notification::Kind, 32).not_null())
                    .col(string_len(Notification::Title, 200).not_null())
                    .col(text(Notification::Message).not_null())
                    .col(uuid_null(Notification::UserId))
                    .col(uuid_null(Notification::BookingId))
                    .col(boolean(Notification::IsRead).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Notification::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_profile")
                            .from(Notification::Table, Notification::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_booking")
                            .from(Notification::Table, Notification::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Notification {
    Table,
    Id,
    Kind,
    Title,
    Message,
    UserId,
    BookingId,
    IsRead,
    CreatedAt,
}
