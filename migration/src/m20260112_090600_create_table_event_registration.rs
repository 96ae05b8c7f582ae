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
                    .table(EventRegistration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventRegistration::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventRegistration::Event).uuid().not_null())
                    .col(
                        ColumnDef::new(EventRegistration::FirstName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistration::LastName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventRegistration::Email).string().not_null())
                    .col(ColumnDef::new(EventRegistration::Phone).string_len(15).null())
                    .col(ColumnDef::new(EventRegistration::Notes).text().null())
                    .col(
                        ColumnDef::new(EventRegistration::RegistrationDate)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_registration-event")
                            .from(EventRegistration::Table, EventRegistration::Event)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-event_registration-event-email")
                    .table(EventRegistration::Table)
                    .col(EventRegistration::Event)
                    .col(EventRegistration::Email)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventRegistration::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventRegistration {
    Table,
    Id,
    Event,
    FirstName,
    LastName,
    Email,
    Phone,
    Notes,
    RegistrationDate,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}
