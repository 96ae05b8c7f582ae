/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::{WebError, WebResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use convene_core::database::get_user_organizations;
use convene_core::events::*;
use convene_core::input::*;
use convene_core::types::*;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct LookupRegistrationsRequest {
    pub email: String,
}

async fn get_visible_event(
    state: &ServerState,
    user: Option<&MUser>,
    event_id: Uuid,
) -> WebResult<MEvent> {
    EEvent::find_by_id(event_id)
        .one(&state.db)
        .await?
        .filter(|event| event.is_public || user.is_some())
        .ok_or_else(|| WebError::not_found("Event"))
}

async fn get_editable_event(state: &ServerState, user: &MUser, event_id: Uuid) -> WebResult<MEvent> {
    let event = get_visible_event(state, Some(user), event_id).await?;

    if event.created_by != Some(user.id) && !user.is_admin() {
        return Err(WebError::Forbidden(
            "Only the creator of an event can change it".to_string(),
        ));
    }

    Ok(event)
}

async fn validate_for_user(state: &ServerState, user: &MUser, form: &EventForm) -> WebResult<()> {
    let memberships = get_user_organizations(&state.db, user.id)
        .await?
        .into_iter()
        .map(|o| o.id)
        .collect::<Vec<Uuid>>();

    validate_event_form(form, &memberships)?;
    Ok(())
}

pub async fn get(
    state: State<Arc<ServerState>>,
    user: Option<Extension<MUser>>,
    ApiQuery(filter): ApiQuery<EventFilter>,
) -> WebResult<Json<BaseResponse<Vec<MEvent>>>> {
    let events = list_events(&state.db, &filter, user.is_some()).await?;

    let res = BaseResponse {
        error: false,
        message: events,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiJson(body): ApiJson<EventForm>,
) -> WebResult<Json<BaseResponse<String>>> {
    validate_for_user(&state, &user, &body).await?;

    let now = Utc::now().naive_utc();
    let event = AEvent {
        id: Set(Uuid::new_v4()),
        title: Set(body.title.trim().to_string()),
        event_url: Set(optional_text(body.event_url)),
        organization: Set(body.organization),
        created_by: Set(Some(user.id)),
        description: Set(body.description),
        location: Set(body.location),
        target_group: Set(body.target_group),
        start_date: Set(body.start_date),
        end_date: Set(body.end_date),
        is_public: Set(body.is_public),
        registration_required: Set(body.registration_required),
        max_participants: Set(body.max_participants),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(event = %event.id, created_by = %user.username, "Event created");

    let res = BaseResponse {
        error: false,
        message: event.id.to_string(),
    };

    Ok(Json(res))
}

pub async fn get_event(
    state: State<Arc<ServerState>>,
    user: Option<Extension<MUser>>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> WebResult<Json<BaseResponse<EventDetail>>> {
    let user = user.map(|Extension(user)| user);
    let event = get_visible_event(&state, user.as_ref(), event_id).await?;
    let detail = event_detail(&state.db, event).await?;

    let res = BaseResponse {
        error: false,
        message: detail,
    };

    Ok(Json(res))
}

pub async fn patch_event(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<EventForm>,
) -> WebResult<Json<BaseResponse<MEvent>>> {
    let event = get_editable_event(&state, &user, event_id).await?;
    validate_for_user(&state, &user, &body).await?;

    let mut aevent: AEvent = event.into();
    aevent.title = Set(body.title.trim().to_string());
    aevent.event_url = Set(optional_text(body.event_url));
    aevent.organization = Set(body.organization);
    aevent.description = Set(body.description);
    aevent.location = Set(body.location);
    aevent.target_group = Set(body.target_group);
    aevent.start_date = Set(body.start_date);
    aevent.end_date = Set(body.end_date);
    aevent.is_public = Set(body.is_public);
    aevent.registration_required = Set(body.registration_required);
    aevent.max_participants = Set(body.max_participants);
    aevent.updated_at = Set(Utc::now().naive_utc());
    let event = aevent.update(&state.db).await?;

    let res = BaseResponse {
        error: false,
        message: event,
    };

    Ok(Json(res))
}

pub async fn delete_event(
    state: State<Arc<ServerState>>,
    Extension(user): Extension<MUser>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> WebResult<Json<BaseResponse<String>>> {
    let event = get_editable_event(&state, &user, event_id).await?;

    let aevent: AEvent = event.into();
    aevent.delete(&state.db).await?;

    let res = BaseResponse {
        error: false,
        message: "Event deleted".to_string(),
    };

    Ok(Json(res))
}

pub async fn post_event_register(
    state: State<Arc<ServerState>>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<RegistrationForm>,
) -> WebResult<Json<BaseResponse<String>>> {
    register_for_event(&state, event_id, body).await?;

    let res = BaseResponse {
        error: false,
        message: "Registration successful".to_string(),
    };

    Ok(Json(res))
}

pub async fn post_my_registrations(
    state: State<Arc<ServerState>>,
    ApiJson(body): ApiJson<LookupRegistrationsRequest>,
) -> WebResult<Json<BaseResponse<String>>> {
    match lookup_registrations(&state, &body.email).await? {
        LookupOutcome::Sent(_) => {
            let res = BaseResponse {
                error: false,
                message: "An email listing your registrations has been sent".to_string(),
            };

            Ok(Json(res))
        }
        LookupOutcome::NotFound => Err(WebError::not_found("Registrations for this email address")),
    }
}
