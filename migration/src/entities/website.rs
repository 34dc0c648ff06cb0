use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "websites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Sub-ID 生成模板，例如 `WB-{YY}{MM}-{RAND:4}`
    pub format_pattern: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_id::Entity")]
    SubIds,
}

impl Related<super::sub_id::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubIds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
