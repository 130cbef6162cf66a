pub use sea_orm_migration::prelude::*;

mod m20260601_000001_create_truckers;
mod m20260601_000002_create_shippers;
mod m20260601_000003_create_loads;
mod m20260601_000004_create_bookings;
mod m20260601_000005_create_otps;
mod m20260601_000006_create_support_tickets;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_truckers::Migration),
            Box::new(m20260601_000002_create_shippers::Migration),
            Box::new(m20260601_000003_create_loads::Migration),
            Box::new(m20260601_000004_create_bookings::Migration),
            Box::new(m20260601_000005_create_otps::Migration),
            Box::new(m20260601_000006_create_support_tickets::Migration),
        ]
    }
}
