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
                    .table(OrganizationAccessRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::User)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::Organization)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::DataConsent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::RequestedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::ReviewedAt)
                            .date_time()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationAccessRequest::ReviewedBy)
                            .uuid()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-organization_access_request-user")
                            .from(
                                OrganizationAccessRequest::Table,
                                OrganizationAccessRequest::User,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-organization_access_request-organization")
                            .from(
                                OrganizationAccessRequest::Table,
                                OrganizationAccessRequest::Organization,
                            )
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-organization_access_request-reviewed_by")
                            .from(
                                OrganizationAccessRequest::Table,
                                OrganizationAccessRequest::ReviewedBy,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-organization_access_request-user-organization")
                    .table(OrganizationAccessRequest::Table)
                    .col(OrganizationAccessRequest::User)
                    .col(OrganizationAccessRequest::Organization)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OrganizationAccessRequest::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum OrganizationAccessRequest {
    Table,
    Id,
    User,
    Organization,
    Status,
    DataConsent,
    RequestedAt,
    ReviewedAt,
    ReviewedBy,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
}
