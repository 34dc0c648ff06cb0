use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 geos 表
        manager
            .create_table(
                Table::create()
                    .table(Geo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Geo::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Geo::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Geo::Name).string().not_null())
                    .col(
                        ColumnDef::new(Geo::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 brands 表
        manager
            .create_table(
                Table::create()
                    .table(Brand::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Brand::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Brand::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Brand::DefaultUrl).text().null())
                    .col(
                        ColumnDef::new(Brand::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Brand::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 brand_lists 表
        manager
            .create_table(
                Table::create()
                    .table(BrandList::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrandList::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrandList::GeoId).integer().not_null())
                    .col(ColumnDef::new(BrandList::Name).string().not_null())
                    .col(
                        ColumnDef::new(BrandList::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_brand_lists_geo")
                            .from(BrandList::Table, BrandList::GeoId)
                            .to(Geo::Table, Geo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 geo_brand_rankings 表
        manager
            .create_table(
                Table::create()
                    .table(GeoBrandRanking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GeoBrandRanking::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GeoBrandRanking::GeoId).integer().not_null())
                    .col(ColumnDef::new(GeoBrandRanking::BrandId).integer().not_null())
                    .col(ColumnDef::new(GeoBrandRanking::Position).integer().null())
                    .col(ColumnDef::new(GeoBrandRanking::AffiliateLink).text().null())
                    .col(
                        ColumnDef::new(GeoBrandRanking::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rankings_geo")
                            .from(GeoBrandRanking::Table, GeoBrandRanking::GeoId)
                            .to(Geo::Table, Geo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rankings_brand")
                            .from(GeoBrandRanking::Table, GeoBrandRanking::BrandId)
                            .to(Brand::Table, Brand::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个 GEO 内 brand 唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rankings_geo_brand")
                    .table(GeoBrandRanking::Table)
                    .col(GeoBrandRanking::GeoId)
                    .col(GeoBrandRanking::BrandId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每个 GEO 内 position 唯一（NULL 不参与唯一约束）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rankings_geo_position")
                    .table(GeoBrandRanking::Table)
                    .col(GeoBrandRanking::GeoId)
                    .col(GeoBrandRanking::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_rankings_geo_position").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_rankings_geo_brand").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GeoBrandRanking::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BrandList::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Brand::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Geo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Geo {
    #[sea_orm(iden = "geos")]
    Table,
    Id,
    Code,
    Name,
    SortOrder,
}

#[derive(DeriveIden)]
enum Brand {
    #[sea_orm(iden = "brands")]
    Table,
    Id,
    Name,
    DefaultUrl,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BrandList {
    #[sea_orm(iden = "brand_lists")]
    Table,
    Id,
    GeoId,
    Name,
    SortOrder,
}

#[derive(DeriveIden)]
enum GeoBrandRanking {
    #[sea_orm(iden = "geo_brand_rankings")]
    Table,
    Id,
    GeoId,
    BrandId,
    Position,
    AffiliateLink,
    UpdatedAt,
}
