use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "brand_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub geo_id: i32,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::geo::Entity",
        from = "Column::GeoId",
        to = "super::geo::Column::Id",
        on_delete = "Cascade"
    )]
    Geo,
}

impl Related<super::geo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Geo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
