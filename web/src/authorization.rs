/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::{WebError, WebResult};
use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use convene_core::consts::JWT_LIFETIME_HOURS;
use convene_core::input::load_secret;
use convene_core::types::*;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize,
    pub iat: usize,
    pub id: Uuid,
}

fn bearer_token(req: &Request) -> WebResult<Option<String>> {
    let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_header = auth_header
        .to_str()
        .map_err(|_| WebError::Unauthorized("Authorization header empty".to_string()))?;

    let mut header = auth_header.split_whitespace();

    match (header.next(), header.next()) {
        (Some("Bearer"), Some(token)) => Ok(Some(token.to_string())),
        _ => Err(WebError::Unauthorized(
            "Invalid Authorization header".to_string(),
        )),
    }
}

async fn load_current_user(state: &ServerState, token: String) -> WebResult<MUser> {
    let token_data = decode_jwt(state, &token)
        .map_err(|_| WebError::Unauthorized("Unable to decode token".to_string()))?;

    let user = EUser::find_by_id(token_data.claims.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| WebError::Unauthorized("User not found".to_string()))?;

    if !user.is_active {
        return Err(WebError::account_inactive());
    }

    Ok(user)
}

pub async fn authorize(
    state: State<Arc<ServerState>>,
    mut req: Request,
    next: Next,
) -> WebResult<Response<Body>> {
    let token = bearer_token(&req)?
        .ok_or_else(|| WebError::Unauthorized("Authorization header not found".to_string()))?;

    let current_user = load_current_user(&state, token).await?;

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Like [`authorize`], but lets anonymous requests through. Handlers read the
/// user as `Option<Extension<MUser>>`.
pub async fn optional_authorize(
    state: State<Arc<ServerState>>,
    mut req: Request,
    next: Next,
) -> WebResult<Response<Body>> {
    if let Some(token) = bearer_token(&req)? {
        let current_user = load_current_user(&state, token).await?;
        req.extensions_mut().insert(current_user);
    }

    Ok(next.run(req).await)
}

/// Must be layered inside [`authorize`].
pub async fn require_admin(req: Request, next: Next) -> WebResult<Response<Body>> {
    let is_admin = req
        .extensions()
        .get::<MUser>()
        .is_some_and(|user| user.is_admin());

    if !is_admin {
        return Err(WebError::admin_required());
    }

    Ok(next.run(req).await)
}

pub fn encode_jwt(state: &ServerState, id: Uuid) -> Result<String> {
    let now = Utc::now();
    let expire = Duration::hours(JWT_LIFETIME_HOURS);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;

    let claim = Claims { iat, exp, id };
    let secret = load_secret(&state.cli.jwt_secret_file);

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to encode token")
}

pub fn decode_jwt(state: &ServerState, jwt: &str) -> Result<TokenData<Claims>> {
    let secret = load_secret(&state.cli.jwt_secret_file);

    decode(
        jwt,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .context("Failed to decode token")
}

pub async fn update_last_login(state: &ServerState, user: MUser) -> Result<MUser> {
    let mut auser: AUser = user.into();

    auser.last_login_at = Set(Utc::now().naive_utc());
    auser
        .update(&state.db)
        .await
        .context("Failed to update user last login")
}
