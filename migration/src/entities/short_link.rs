use sea_orm::entity::prelude::*;

/// 短链接记录，`short_id` 与 `original_url` 均为唯一键
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "short_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub short_id: String,
    #[sea_orm(column_type = "Text", unique)]
    pub original_url: String,
    pub user_id: String,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
