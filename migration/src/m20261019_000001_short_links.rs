use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 short_links 表
        manager
            .create_table(
                Table::create()
                    .table(ShortLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLinks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortLinks::ShortId).string_len(16).not_null())
                    .col(ColumnDef::new(ShortLinks::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(ShortLinks::UserId)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ShortLinks::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一约束：冲突错误依赖索引名中的列名来区分 short_id / original_url
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_short_id")
                    .table(ShortLinks::Table)
                    .col(ShortLinks::ShortId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_original_url")
                    .table(ShortLinks::Table)
                    .col(ShortLinks::OriginalUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按用户列出链接
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_user_id")
                    .table(ShortLinks::Table)
                    .col(ShortLinks::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_short_links_user_id").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_short_links_original_url")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_short_links_short_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShortLinks {
    Table,
    Id,
    ShortId,
    OriginalUrl,
    UserId,
    IsDeleted,
}
