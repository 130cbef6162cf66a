use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportTickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportTickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SupportTickets::UserPhone).string().not_null())
                    .col(ColumnDef::new(SupportTickets::UserType).string().not_null())
                    .col(ColumnDef::new(SupportTickets::UserId).string().not_null())
                    .col(ColumnDef::new(SupportTickets::IssueType).string().not_null())
                    .col(ColumnDef::new(SupportTickets::Description).text().not_null())
                    .col(
                        ColumnDef::new(SupportTickets::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(SupportTickets::Priority)
                            .string()
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(SupportTickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SupportTickets::Table)
                    .col(SupportTickets::UserPhone)
                    .name("idx_support_tickets_user_phone")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupportTickets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SupportTickets {
    Table,
    Id,
    UserPhone,
    UserType,
    UserId,
    IssueType,
    Description,
    Status,
    Priority,
    CreatedAt,
}
