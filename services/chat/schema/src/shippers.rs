use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shippers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_name: String,
    pub contact_name: Option<String>,
    #[sea_orm(unique)]
    pub gst_number: String,
    #[sea_orm(unique)]
    pub phone: String,
    /// Derived from the GSTIN state code.
    pub state: String,
    pub verified: bool,
    pub active: bool,
    pub total_loads: i32,
    pub rating: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
