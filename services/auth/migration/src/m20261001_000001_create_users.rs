use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(users_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

/// Emails are stored lowercased; login lowercases before lookup.
fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
        .col(
            ColumnDef::new(Users::Email)
                .string()
                .not_null()
                .unique_key()
                .check(Expr::cust("email = lower(email)")),
        )
        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
        .col(
            ColumnDef::new(Users::Role)
                .small_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(Users::TwoFactorEnabled)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Users::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Role,
    TwoFactorEnabled,
    CreatedAt,
}
