/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::email::Mailer;
use super::input::port_in_range;
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser, Debug, Clone)]
#[command(name = "Convene", display_name = "Convene", bin_name = "convene-server", author = "Wavelens", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "CONVENE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "CONVENE_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "CONVENE_PORT", value_parser = port_in_range, default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "CONVENE_SERVE_URL", default_value = "http://127.0.0.1:8000")]
    pub serve_url: String,
    #[arg(long, env = "CONVENE_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "CONVENE_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(long, env = "CONVENE_JWT_SECRET_FILE")]
    pub jwt_secret_file: String,
    #[arg(long, env = "CONVENE_DISABLE_REGISTRATION", default_value = "false")]
    pub disable_registration: bool,
    #[arg(long, env = "CONVENE_EMAIL_ENABLED", default_value = "false")]
    pub email_enabled: bool,
    #[arg(long, env = "CONVENE_EMAIL_SMTP_HOST")]
    pub email_smtp_host: Option<String>,
    #[arg(long, env = "CONVENE_EMAIL_SMTP_PORT", value_parser = port_in_range, default_value_t = 587)]
    pub email_smtp_port: u16,
    #[arg(long, env = "CONVENE_EMAIL_SMTP_USERNAME")]
    pub email_smtp_username: Option<String>,
    #[arg(long, env = "CONVENE_EMAIL_SMTP_PASSWORD_FILE")]
    pub email_smtp_password_file: Option<String>,
    #[arg(long, env = "CONVENE_EMAIL_FROM_ADDRESS")]
    pub email_from_address: Option<String>,
    #[arg(long, env = "CONVENE_EMAIL_FROM_NAME", default_value = "Convene")]
    pub email_from_name: String,
    #[arg(long, env = "CONVENE_EMAIL_DISABLE_TLS", default_value = "false")]
    pub email_disable_tls: bool,
    #[arg(long, env = "CONVENE_ADMIN_USERNAME")]
    pub admin_username: Option<String>,
    #[arg(long, env = "CONVENE_ADMIN_EMAIL")]
    pub admin_email: Option<String>,
    #[arg(long, env = "CONVENE_ADMIN_PASSWORD_FILE")]
    pub admin_password_file: Option<String>,
    #[arg(long, env = "CONVENE_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "CONVENE_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
    pub mailer: Arc<dyn Mailer>,
}

impl fmt::Debug for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerState")
            .field("db", &self.db)
            .field("cli", &self.cli)
            .field("mailer_enabled", &self.mailer.is_enabled())
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BaseResponse<T> {
    pub error: bool,
    pub message: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub id: Uuid,
    pub name: String,
}

pub type ListResponse = Vec<ListItem>;

pub type EEvent = event::Entity;
pub type EEventRegistration = event_registration::Entity;
pub type EOrganization = organization::Entity;
pub type EOrganizationAccessRequest = organization_access_request::Entity;
pub type EOrganizationMember = organization_member::Entity;
pub type EUser = user::Entity;
pub type EUserProfile = user_profile::Entity;

pub type MEvent = event::Model;
pub type MEventRegistration = event_registration::Model;
pub type MOrganization = organization::Model;
pub type MOrganizationAccessRequest = organization_access_request::Model;
pub type MOrganizationMember = organization_member::Model;
pub type MUser = user::Model;
pub type MUserProfile = user_profile::Model;

pub type AEvent = event::ActiveModel;
pub type AEventRegistration = event_registration::ActiveModel;
pub type AOrganization = organization::ActiveModel;
pub type AOrganizationAccessRequest = organization_access_request::ActiveModel;
pub type AOrganizationMember = organization_member::ActiveModel;
pub type AUser = user::ActiveModel;
pub type AUserProfile = user_profile::ActiveModel;

pub type CEvent = event::Column;
pub type CEventRegistration = event_registration::Column;
pub type COrganization = organization::Column;
pub type COrganizationAccessRequest = organization_access_request::Column;
pub type COrganizationMember = organization_member::Column;
pub type CUser = user::Column;
pub type CUserProfile = user_profile::Column;

pub type REvent = event::Relation;
pub type REventRegistration = event_registration::Relation;
pub type ROrganization = organization::Relation;
pub type ROrganizationAccessRequest = organization_access_request::Relation;
pub type ROrganizationMember = organization_member::Relation;
pub type RUser = user::Relation;
pub type RUserProfile = user_profile::Relation;
