/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::WebResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use axum::extract::State;
use axum::{Extension, Json};
use convene_core::access::*;
use convene_core::types::*;
use entity::organization_access_request::AccessRequestStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeAccessRequest {
    pub organization: Uuid,
    #[serde(default)]
    pub data_consent: bool,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct AccessRequestQuery {
    pub status: Option<AccessRequestStatus>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReviewAccessRequest {
    pub decision: AccessRequestStatus,
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
) -> WebResult<Json<BaseResponse<Vec<AccessRequestSummary>>>> {
    let requests = my_access_requests(&state, &user).await?;

    let res = BaseResponse {
        error: false,
        message: requests,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiJson(body): ApiJson<MakeAccessRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    let request =
        request_organization_access(&state, &user, body.organization, body.data_consent).await?;

    let res = BaseResponse {
        error: false,
        message: request.id.to_string(),
    };

    Ok(Json(res))
}

pub async fn get_admin(
    state: State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<AccessRequestQuery>,
) -> WebResult<Json<BaseResponse<Vec<AccessRequestSummary>>>> {
    let requests = review_access_requests(&state, query.status).await?;

    let res = BaseResponse {
        error: false,
        message: requests,
    };

    Ok(Json(res))
}

pub async fn post_admin_review(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiPath(request_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ReviewAccessRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    let request = review_access_request_detail(&state, &user, request_id, body.decision).await?;

    let res = BaseResponse {
        error: false,
        message: format!("Access request {}", request.status),
    };

    Ok(Json(res))
}
