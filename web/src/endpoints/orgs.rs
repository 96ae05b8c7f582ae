/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::{WebError, WebResult};
use crate::extract::{ApiJson, ApiPath};
use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use convene_core::consts::*;
use convene_core::events::{EventRegistrations, organization_event_registrations};
use convene_core::input::*;
use convene_core::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeOrganizationRequest {
    pub name: String,
    pub organization_url: String,
    pub street: Option<String>,
    pub post_code: String,
    pub city: Option<String>,
}

impl MakeOrganizationRequest {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        errors.check(
            "Name",
            validate_required(&self.name, ORGANIZATION_NAME_MAX_LENGTH),
        );
        errors.check("Website", validate_url(&self.organization_url));
        errors.check("Post code", validate_post_code(self.post_code.trim()));

        if let Some(street) = &self.street {
            errors.check("Street", validate_max_length(street, STREET_MAX_LENGTH));
        }

        if let Some(city) = &self.city {
            errors.check("City", validate_max_length(city, CITY_MAX_LENGTH));
        }

        errors.into_result()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PatchOrganizationRequest {
    pub name: Option<String>,
    pub organization_url: Option<String>,
    pub street: Option<String>,
    pub post_code: Option<String>,
    pub city: Option<String>,
}

pub async fn get(
    state: State<Arc<ServerState>>,
) -> WebResult<Json<BaseResponse<Vec<MOrganization>>>> {
    let organizations = EOrganization::find()
        .order_by_asc(COrganization::Name)
        .all(&state.db)
        .await?;

    let res = BaseResponse {
        error: false,
        message: organizations,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiJson(body): ApiJson<MakeOrganizationRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    body.validate()?;

    let organization = AOrganization {
        id: Set(Uuid::new_v4()),
        name: Set(body.name.trim().to_string()),
        organization_url: Set(body.organization_url.trim().to_string()),
        street: Set(optional_text(body.street)),
        post_code: Set(body.post_code.trim().to_string()),
        city: Set(optional_text(body.city)),
        authenticity_checked: Set(false),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&state.db)
    .await?;

    info!(
        organization = %organization.name,
        created_by = %user.username,
        "Organization created"
    );

    let res = BaseResponse {
        error: false,
        message: organization.id.to_string(),
    };

    Ok(Json(res))
}

async fn get_organization(state: &ServerState, organization_id: Uuid) -> WebResult<MOrganization> {
    EOrganization::find_by_id(organization_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| WebError::not_found("Organization"))
}

pub async fn get_organization_detail(
    state: State<Arc<ServerState>>,
    ApiPath(organization_id): ApiPath<Uuid>,
) -> WebResult<Json<BaseResponse<MOrganization>>> {
    let organization = get_organization(&state, organization_id).await?;

    let res = BaseResponse {
        error: false,
        message: organization,
    };

    Ok(Json(res))
}

pub async fn patch_organization(
    state: State<Arc<ServerState>>,
    ApiPath(organization_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PatchOrganizationRequest>,
) -> WebResult<Json<BaseResponse<MOrganization>>> {
    let organization = get_organization(&state, organization_id).await?;

    let merged = MakeOrganizationRequest {
        name: body.name.unwrap_or(organization.name.clone()),
        organization_url: body
            .organization_url
            .unwrap_or(organization.organization_url.clone()),
        street: body.street.or(organization.street.clone()),
        post_code: body.post_code.unwrap_or(organization.post_code.clone()),
        city: body.city.or(organization.city.clone()),
    };
    merged.validate()?;

    let mut aorganization: AOrganization = organization.into();
    aorganization.name = Set(merged.name.trim().to_string());
    aorganization.organization_url = Set(merged.organization_url.trim().to_string());
    aorganization.street = Set(optional_text(merged.street));
    aorganization.post_code = Set(merged.post_code.trim().to_string());
    aorganization.city = Set(optional_text(merged.city));
    let organization = aorganization.update(&state.db).await?;

    let res = BaseResponse {
        error: false,
        message: organization,
    };

    Ok(Json(res))
}

pub async fn delete_organization(
    state: State<Arc<ServerState>>,
    ApiPath(organization_id): ApiPath<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let organization = get_organization(&state, organization_id).await?;

    let events = EEvent::find()
        .filter(CEvent::Organization.eq(organization.id))
        .count(&state.db)
        .await?;

    if events > 0 {
        return Err(WebError::Conflict(
            "Organization cannot be deleted while events reference it".to_string(),
        ));
    }

    let aorganization: AOrganization = organization.into();
    aorganization.delete(&state.db).await?;

    let res = BaseResponse {
        error: false,
        message: "Organization deleted".to_string(),
    };

    Ok(Json(res))
}

pub async fn post_organization_verify(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiPath(organization_id): ApiPath<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let organization = get_organization(&state, organization_id).await?;

    let mut aorganization: AOrganization = organization.into();
    aorganization.authenticity_checked = Set(true);
    let organization = aorganization.update(&state.db).await?;

    info!(
        organization = %organization.name,
        reviewer = %user.username,
        "Organization authenticity checked"
    );

    let res = BaseResponse {
        error: false,
        message: "Organization verified".to_string(),
    };

    Ok(Json(res))
}

pub async fn get_organization_registrations(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiPath(organization_id): ApiPath<Uuid>,
) -> WebResult<Json<BaseResponse<Vec<EventRegistrations>>>> {
    get_organization(&state, organization_id).await?;

    let registrations = organization_event_registrations(&state, &user, organization_id).await?;

    let res = BaseResponse {
        error: false,
        message: registrations,
    };

    Ok(Json(res))
}
