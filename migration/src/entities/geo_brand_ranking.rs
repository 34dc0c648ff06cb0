use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "geo_brand_rankings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub geo_id: i32,
    pub brand_id: i32,
    /// 1-10 为 featured，NULL 为 other
    pub position: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub affiliate_link: Option<String>,
    pub updated_at: DateTimeUtc,
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
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Cascade"
    )]
    Brand,
}

impl Related<super::geo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Geo.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
