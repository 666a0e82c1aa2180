//! Creates the `clients` table.
//!
//! `client_id` is chosen by the caller, so the primary key is not
//! auto-incremented. `system_id` holds a UUID generated by the registry and
//! carries its own unique index.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Clients {
    Table,
    ClientId,
    Username,
    SystemId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::ClientId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::Username).string_len(100).not_null())
                    .col(ColumnDef::new(Clients::SystemId).string_len(36).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-clients-system_id")
                    .table(Clients::Table)
                    .col(Clients::SystemId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await
    }
}
