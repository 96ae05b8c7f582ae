/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20260112_090000_create_table_user;
mod m20260112_090100_create_table_user_profile;
mod m20260112_090200_create_table_organization;
mod m20260112_090300_create_table_organization_member;
mod m20260112_090400_create_table_organization_access_request;
mod m20260112_090500_create_table_event;
mod m20260112_090600_create_table_event_registration;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260112_090000_create_table_user::Migration),
            Box::new(m20260112_090100_create_table_user_profile::Migration),
            Box::new(m20260112_090200_create_table_organization::Migration),
            Box::new(m20260112_090300_create_table_organization_member::Migration),
            Box::new(m20260112_090400_create_table_organization_access_request::Migration),
            Box::new(m20260112_090500_create_table_event::Migration),
            Box::new(m20260112_090600_create_table_event_registration::Migration),
        ]
    }
}
