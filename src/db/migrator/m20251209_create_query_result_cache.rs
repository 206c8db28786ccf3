use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QueryResultCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QueryResultCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(QueryResultCache::QueryKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QueryResultCache::Page)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(QueryResultCache::Page).gt(0)),
                    )
                    .col(ColumnDef::new(QueryResultCache::Results).text().null())
                    .col(ColumnDef::new(QueryResultCache::LastQueriedAt).string().null())
                    .col(ColumnDef::new(QueryResultCache::TotalPages).integer().null())
                    .col(
                        ColumnDef::new(QueryResultCache::TotalResults)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(QueryResultCache::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QueryResultCache::UpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The only synchronization between concurrent writers of the same key.
        manager
            .create_index(
                Index::create()
                    .name("idx_query_result_cache_query_key_unique")
                    .table(QueryResultCache::Table)
                    .col(QueryResultCache::QueryKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_query_result_cache_last_queried_at")
                    .table(QueryResultCache::Table)
                    .col(QueryResultCache::LastQueriedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QueryResultCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum QueryResultCache {
    Table,
    Id,
    QueryKey,
    Page,
    Results,
    LastQueriedAt,
    TotalPages,
    TotalResults,
    CreatedAt,
    UpdatedAt,
}
