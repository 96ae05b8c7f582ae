/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::WebResult;
use axum::extract::State;
use axum::{Extension, Json};
use convene_core::database::{get_profile, get_user_organizations};
use convene_core::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct UserInfoResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub organizations: ListResponse,
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
) -> WebResult<Json<BaseResponse<UserInfoResponse>>> {
    let phone = get_profile(&state.db, user.id)
        .await?
        .and_then(|profile| profile.phone);

    let organizations: ListResponse = get_user_organizations(&state.db, user.id)
        .await?
        .into_iter()
        .map(|o| ListItem {
            id: o.id,
            name: o.name,
        })
        .collect();

    let user_info = UserInfoResponse {
        id: user.id,
        is_admin: user.is_admin(),
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        phone,
        organizations,
    };

    let res = BaseResponse {
        error: false,
        message: user_info,
    };

    Ok(Json(res))
}
