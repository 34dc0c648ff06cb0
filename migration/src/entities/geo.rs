use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "geos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::geo_brand_ranking::Entity")]
    Rankings,
    #[sea_orm(has_many = "super::brand_list::Entity")]
    BrandLists,
}

impl Related<super::geo_brand_ranking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rankings.def()
    }
}

impl Related<super::brand_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BrandLists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
