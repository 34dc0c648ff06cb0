use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 websites 表
        manager
            .create_table(
                Table::create()
                    .table(Website::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Website::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Website::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Website::FormatPattern)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Website::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 sub_ids 表，删除 website 时级联删除
        manager
            .create_table(
                Table::create()
                    .table(SubId::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubId::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubId::WebsiteId).integer().not_null())
                    .col(ColumnDef::new(SubId::Value).string().not_null().unique_key())
                    .col(ColumnDef::new(SubId::Url).text().null())
                    .col(ColumnDef::new(SubId::TaskId).string().null())
                    .col(
                        ColumnDef::new(SubId::CommentPosted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SubId::IsImmutable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SubId::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_ids_website")
                            .from(SubId::Table, SubId::WebsiteId)
                            .to(Website::Table, Website::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sub_ids_website")
                    .table(SubId::Table)
                    .col(SubId::WebsiteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sub_ids_task")
                    .table(SubId::Table)
                    .col(SubId::TaskId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_sub_ids_task").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_sub_ids_website").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SubId::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Website::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Website {
    #[sea_orm(iden = "websites")]
    Table,
    Id,
    Name,
    FormatPattern,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SubId {
    #[sea_orm(iden = "sub_ids")]
    Table,
    Id,
    WebsiteId,
    Value,
    Url,
    TaskId,
    CommentPosted,
    IsImmutable,
    CreatedAt,
}
