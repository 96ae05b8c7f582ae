/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organization::Name).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Organization::OrganizationUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Organization::Street).string_len(100).null())
                    .col(ColumnDef::new(Organization::PostCode).string_len(5).not_null())
                    .col(ColumnDef::new(Organization::City).string_len(100).null())
                    .col(
                        ColumnDef::new(Organization::AuthenticityChecked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Organization::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
    Name,
    OrganizationUrl,
    Street,
    PostCode,
    City,
    AuthenticityChecked,
    CreatedAt,
}
