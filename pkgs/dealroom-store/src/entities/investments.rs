//! Investment tracker entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub deal_id: i64,
    pub status: String, // "interested", "researching", "diligence", "negotiating", "committed" or "passed"
    pub amount: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
