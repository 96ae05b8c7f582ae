/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::authorization::{encode_jwt, update_last_login};
use crate::error::{WebError, WebResult};
use crate::extract::{ApiJson, ApiQuery};
use axum::Json;
use axum::extract::State;
use chrono::{Duration, Utc};
use convene_core::consts::*;
use convene_core::database::{find_user_by_login, username_exists};
use convene_core::email::{confirmation_email, generate_verification_token};
use convene_core::input::*;
use convene_core::types::*;
use password_auth::{generate_hash, verify_password};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeLoginRequest {
    pub loginname: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl MakeUserRequest {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        errors.check("Username", validate_username(&self.username));
        errors.check(
            "First name",
            validate_required(&self.first_name, NAME_MAX_LENGTH),
        );
        errors.check(
            "Last name",
            validate_required(&self.last_name, NAME_MAX_LENGTH),
        );
        errors.check("Email", validate_email(&self.email));
        errors.check("Password", validate_password(&self.password));

        if self.password != self.password_confirm {
            errors.add("Password confirmation", "The two password fields didn't match");
        }

        if let Some(phone) = optional_text(self.phone.clone()) {
            errors.check("Phone number", validate_phone(&phone));
        }

        errors.into_result()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CheckUsernameQuery {
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CheckUsernameResponse {
    pub exists: bool,
}

pub async fn post_register(
    state: State<Arc<ServerState>>,
    ApiJson(body): ApiJson<MakeUserRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    if state.cli.disable_registration {
        return Err(WebError::registration_disabled());
    }

    body.validate()?;

    let email = normalize_email(&body.email);

    let mut errors = FormErrors::new();
    if username_exists(&state.db, &body.username).await? {
        errors.add("Username", "A user with that username already exists");
    }

    let email_taken = EUser::find()
        .filter(CUser::Email.eq(email.clone()))
        .one(&state.db)
        .await?
        .is_some();
    if email_taken {
        errors.add("Email", "A user with that email address already exists");
    }
    errors.into_result()?;

    let send_confirmation = state.mailer.is_enabled();
    let (token, token_expires) = if send_confirmation {
        (
            Some(generate_verification_token()),
            Some(Utc::now().naive_utc() + Duration::hours(VERIFICATION_TOKEN_LIFETIME_HOURS)),
        )
    } else {
        (None, None)
    };

    let txn = state.db.begin().await?;

    let user = AUser {
        id: Set(Uuid::new_v4()),
        username: Set(body.username.trim().to_string()),
        first_name: Set(body.first_name.trim().to_string()),
        last_name: Set(body.last_name.trim().to_string()),
        email: Set(email),
        password: Set(generate_hash(&body.password)),
        is_active: Set(!send_confirmation),
        is_staff: Set(false),
        is_superuser: Set(false),
        email_verification_token: Set(token.clone()),
        email_verification_token_expires: Set(token_expires),
        last_login_at: Set(*NULL_TIME),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    AUserProfile {
        id: Set(Uuid::new_v4()),
        user: Set(user.id),
        phone: Set(optional_text(body.phone)),
    }
    .insert(&txn)
    .await?;

    if let Some(token) = token {
        let email = confirmation_email(&user, &token, &state.cli.serve_url);

        if let Err(e) = state.mailer.send(email).await {
            error!(error = %e, username = %user.username, "Failed to send confirmation email");
            txn.rollback().await?;
            return Err(WebError::confirmation_email_failed());
        }
    }

    txn.commit().await?;

    info!(username = %user.username, "User registered");

    let message = if send_confirmation {
        "Registration successful. Please confirm your email address."
    } else {
        "Registration successful"
    };

    let res = BaseResponse {
        error: false,
        message: message.to_string(),
    };

    Ok(Json(res))
}

pub async fn get_verify_email(
    state: State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<VerifyEmailQuery>,
) -> WebResult<Json<BaseResponse<String>>> {
    let user = EUser::find()
        .filter(CUser::EmailVerificationToken.eq(query.token))
        .one(&state.db)
        .await?
        .ok_or_else(|| WebError::BadRequest("Invalid verification token".to_string()))?;

    let expired = user
        .email_verification_token_expires
        .is_none_or(|expires| expires < Utc::now().naive_utc());

    if expired {
        return Err(WebError::BadRequest(
            "Verification token has expired".to_string(),
        ));
    }

    let mut auser: AUser = user.into();
    auser.is_active = Set(true);
    auser.email_verification_token = Set(None);
    auser.email_verification_token_expires = Set(None);
    let user = auser.update(&state.db).await?;

    info!(username = %user.username, "Account confirmed");

    let res = BaseResponse {
        error: false,
        message: "Account confirmed".to_string(),
    };

    Ok(Json(res))
}

pub async fn get_check_username(
    state: State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<CheckUsernameQuery>,
) -> WebResult<Json<CheckUsernameResponse>> {
    let exists = username_exists(&state.db, query.username.trim()).await?;

    Ok(Json(CheckUsernameResponse { exists }))
}

pub async fn post_login(
    state: State<Arc<ServerState>>,
    ApiJson(body): ApiJson<MakeLoginRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    let user = find_user_by_login(&state.db, &body.loginname)
        .await?
        .ok_or_else(WebError::invalid_credentials)?;

    verify_password(body.password, &user.password)
        .map_err(|_| WebError::invalid_credentials())?;

    if !user.is_active {
        return Err(WebError::account_inactive());
    }

    let token = encode_jwt(&state, user.id).map_err(|e| {
        error!(error = %e, "Failed to generate token");
        WebError::failed_to_generate_token()
    })?;

    update_last_login(&state, user).await?;

    let res = BaseResponse {
        error: false,
        message: token,
    };

    Ok(Json(res))
}

pub async fn post_logout() -> WebResult<Json<BaseResponse<String>>> {
    let res = BaseResponse {
        error: false,
        message: "Logged out".to_string(),
    };

    Ok(Json(res))
}
