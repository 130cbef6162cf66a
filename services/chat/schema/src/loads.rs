use sea_orm::entity::prelude::*;

/// Freight posted by a shipper. `status` is `available`, `booked` or `completed`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub shipper_id: i32,
    pub shipper_name: String,
    pub shipper_phone: String,
    pub from_city: String,
    pub to_city: String,
    pub material: String,
    /// Tons.
    pub weight: f64,
    pub vehicle_type: String,
    pub price: f64,
    pub loading_date: chrono::NaiveDate,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
