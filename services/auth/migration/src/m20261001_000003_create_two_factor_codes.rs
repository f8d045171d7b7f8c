use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TwoFactorCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TwoFactorCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TwoFactorCodes::UserId).uuid().not_null())
                    .col(ColumnDef::new(TwoFactorCodes::CodeHash).string().not_null())
                    .col(
                        ColumnDef::new(TwoFactorCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TwoFactorCodes::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TwoFactorCodes::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TwoFactorCodes::FailedAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TwoFactorCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TwoFactorCodes::Table, TwoFactorCodes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TwoFactorCodes::Table)
                    .col(TwoFactorCodes::UserId)
                    .col(TwoFactorCodes::CreatedAt)
                    .name("idx_two_factor_codes_user_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TwoFactorCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TwoFactorCodes {
    Table,
    Id,
    UserId,
    CodeHash,
    ExpiresAt,
    IsUsed,
    UsedAt,
    FailedAttempts,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
