/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use chrono::Utc;
use migration::Migrator;
use password_auth::generate_hash;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectOptions, ConnectionTrait,
    Database, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;
use tracing::log::LevelFilter;
use uuid::Uuid;

use super::consts::NULL_TIME;
use super::input::load_secret;
use super::types::*;

pub async fn connect_db(cli: &Cli) -> Result<DatabaseConnection> {
    let db_url = if let Some(file) = &cli.database_url_file {
        load_secret(file)
    } else if let Some(url) = &cli.database_url {
        url.clone()
    } else {
        anyhow::bail!("No database url provided")
    };

    let mut opt = ConnectOptions::new(db_url);

    // Only enable SQL logging at debug level
    if cli.log_level == "debug" {
        opt.sqlx_logging(true)
            .sqlx_logging_level(LevelFilter::Debug);
    } else {
        opt.sqlx_logging(false);
    }

    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8));

    let db = Database::connect(opt)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;
    update_db(&db, cli)
        .await
        .context("Failed to update database")?;
    Ok(db)
}

async fn update_db(db: &DatabaseConnection, cli: &Cli) -> Result<()> {
    let (Some(username), Some(email), Some(password_file)) = (
        cli.admin_username.as_ref(),
        cli.admin_email.as_ref(),
        cli.admin_password_file.as_ref(),
    ) else {
        return Ok(());
    };

    if find_user_by_login(db, username).await?.is_some() {
        return Ok(());
    }

    let password = load_secret(password_file);
    if password.is_empty() {
        anyhow::bail!("Admin password file is empty or unreadable");
    }

    let admin = AUser {
        id: Set(Uuid::new_v4()),
        username: Set(username.clone()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(email.clone()),
        password: Set(generate_hash(password)),
        is_active: Set(true),
        is_staff: Set(true),
        is_superuser: Set(true),
        email_verification_token: Set(None),
        email_verification_token_expires: Set(None),
        last_login_at: Set(*NULL_TIME),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .context("Failed to create admin user")?;

    get_or_create_profile(db, admin.id).await?;

    info!(username = %admin.username, "Created bootstrap admin user");
    Ok(())
}

pub async fn find_user_by_login<C: ConnectionTrait>(
    db: &C,
    loginname: &str,
) -> Result<Option<MUser>> {
    EUser::find()
        .filter(
            Condition::any()
                .add(CUser::Username.eq(loginname))
                .add(CUser::Email.eq(loginname.trim().to_lowercase())),
        )
        .one(db)
        .await
        .context("Failed to query user")
}

pub async fn username_exists<C: ConnectionTrait>(db: &C, username: &str) -> Result<bool> {
    Ok(EUser::find()
        .filter(Expr::expr(Func::lower(Expr::col(CUser::Username))).eq(username.to_lowercase()))
        .one(db)
        .await
        .context("Failed to query username")?
        .is_some())
}

pub async fn get_admins<C: ConnectionTrait>(db: &C) -> Result<Vec<MUser>> {
    EUser::find()
        .filter(
            Condition::all().add(CUser::IsActive.eq(true)).add(
                Condition::any()
                    .add(CUser::IsStaff.eq(true))
                    .add(CUser::IsSuperuser.eq(true)),
            ),
        )
        .all(db)
        .await
        .context("Failed to query admin users")
}

pub async fn get_profile<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Option<MUserProfile>> {
    EUserProfile::find()
        .filter(CUserProfile::User.eq(user_id))
        .one(db)
        .await
        .context("Failed to query user profile")
}

pub async fn get_or_create_profile<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<MUserProfile> {
    if let Some(profile) = get_profile(db, user_id).await? {
        return Ok(profile);
    }

    AUserProfile {
        id: Set(Uuid::new_v4()),
        user: Set(user_id),
        phone: Set(None),
    }
    .insert(db)
    .await
    .context("Failed to create user profile")
}

pub async fn get_user_organizations<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<MOrganization>> {
    EOrganization::find()
        .join(JoinType::InnerJoin, ROrganization::Members.def())
        .join(JoinType::InnerJoin, ROrganizationMember::Profile.def())
        .filter(CUserProfile::User.eq(user_id))
        .order_by_asc(COrganization::Name)
        .all(db)
        .await
        .context("Failed to query user organizations")
}

pub async fn is_member<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    organization_id: Uuid,
) -> Result<bool> {
    Ok(EOrganizationMember::find()
        .join(JoinType::InnerJoin, ROrganizationMember::Profile.def())
        .filter(
            Condition::all()
                .add(CUserProfile::User.eq(user_id))
                .add(COrganizationMember::Organization.eq(organization_id)),
        )
        .one(db)
        .await
        .context("Failed to query organization membership")?
        .is_some())
}

/// Adds the organization to the profile's membership set. Returns `false` if
/// the membership already existed.
pub async fn add_membership<C: ConnectionTrait>(
    db: &C,
    profile: &MUserProfile,
    organization_id: Uuid,
) -> Result<bool> {
    let existing = EOrganizationMember::find()
        .filter(
            Condition::all()
                .add(COrganizationMember::Profile.eq(profile.id))
                .add(COrganizationMember::Organization.eq(organization_id)),
        )
        .one(db)
        .await
        .context("Failed to query organization membership")?;

    if existing.is_some() {
        return Ok(false);
    }

    AOrganizationMember {
        id: Set(Uuid::new_v4()),
        profile: Set(profile.id),
        organization: Set(organization_id),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .context("Failed to insert organization membership")?;

    Ok(true)
}
