use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users: email <-> api key
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Email).string().not_null().primary_key())
                    .col(ColumnDef::new(User::ApiKey).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // loggers
        manager
            .create_table(
                Table::create()
                    .table(Logger::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Logger::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Logger::Url).text().not_null())
                    // url 为 TEXT，唯一性落在定长摘要上
                    .col(
                        ColumnDef::new(Logger::UrlHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Logger::DashboardToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Logger::ApiKey).string().not_null())
                    .col(
                        ColumnDef::new(Logger::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Logger::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_loggers_api_key")
                    .table(Logger::Table)
                    .col(Logger::ApiKey)
                    .to_owned(),
            )
            .await?;

        // visitors: 每次访问追加一行
        manager
            .create_table(
                Table::create()
                    .table(Visitor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visitor::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visitor::LoggerId).string().not_null())
                    .col(ColumnDef::new(Visitor::Ips).text().not_null())
                    .col(
                        ColumnDef::new(Visitor::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitors_logger_id")
                    .table(Visitor::Table)
                    .col(Visitor::LoggerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_visitors_logger_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Visitor::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_loggers_api_key").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Logger::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Email,
    ApiKey,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Logger {
    #[sea_orm(iden = "loggers")]
    Table,
    Id,
    Url,
    UrlHash,
    DashboardToken,
    ApiKey,
    Clicks,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Visitor {
    #[sea_orm(iden = "visitors")]
    Table,
    Id,
    LoggerId,
    Ips,
    ClickedAt,
}
