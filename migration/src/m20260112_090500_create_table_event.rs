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
                    .table(Event::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Event::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Event::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Event::EventUrl).string().null())
                    .col(ColumnDef::new(Event::Organization).uuid().null())
                    .col(ColumnDef::new(Event::CreatedBy).uuid().null())
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::Location).string_len(200).not_null())
                    .col(ColumnDef::new(Event::TargetGroup).string_len(200).not_null())
                    .col(ColumnDef::new(Event::StartDate).date_time().not_null())
                    .col(ColumnDef::new(Event::EndDate).date_time().null())
                    .col(
                        ColumnDef::new(Event::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Event::RegistrationRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Event::MaxParticipants).integer().null())
                    .col(ColumnDef::new(Event::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Event::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event-organization")
                            .from(Event::Table, Event::Organization)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event-created_by")
                            .from(Event::Table, Event::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(Event::MaxParticipants).gt(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
    Title,
    EventUrl,
    Organization,
    CreatedBy,
    Description,
    Location,
    TargetGroup,
    StartDate,
    EndDate,
    IsPublic,
    RegistrationRequired,
    MaxParticipants,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
