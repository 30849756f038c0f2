use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `name` and `category_id` are copied out of the document for filtering.
/// `category_id` has no foreign key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub schema_version: i16,
    pub name: String,
    pub category_id: Option<Uuid>,
    /// Tagged `ApiDocument`
    #[sea_orm(column_type = "JsonBinary")]
    pub document: Json,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
