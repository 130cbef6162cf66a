use sea_orm::entity::prelude::*;

/// One-time code gating a pickup or delivery checkpoint.
/// Valid for 10 minutes, three verification attempts, single use.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phone: String,
    pub code: String,
    pub purpose: String,
    pub reference_id: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attempts: i32,
    /// Set when a newer code for the same phone and purpose supersedes this one.
    pub revoked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
