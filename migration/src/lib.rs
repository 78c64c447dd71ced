pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_profiles;
mod m20250301_000002_create_vehicles;
mod m20250301_000003_create_bookings;
mod m20250301_000004_create_notifications;
mod m20250315_000001_create_revoked_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_profiles::Migration),
            Box::new(m20250301_000002_create_vehicles::Migration),
            Box::new(m20250301_000003_create_bookings::Migration),
            Box::new(m20250301_000004_create_notifications::Migration),
            Box::new(m20250315_000001_create_revoked_tokens::Migration),
        ]
    }
}
