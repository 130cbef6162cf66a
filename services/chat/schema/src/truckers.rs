use sea_orm::entity::prelude::*;

/// Registered truck owner/driver. `phone` and `vehicle_no` are unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "truckers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub phone: String,
    #[sea_orm(unique)]
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub capacity: f64,
    pub verified: bool,
    pub rating: f64,
    pub total_trips: i32,
    pub current_city: Option<String>,
    /// False while the trucker holds a confirmed or in-transit booking.
    pub available: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
