/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::access::AccessError;
use crate::consts::*;
use crate::database::is_member;
use crate::email::registrations_summary_email;
use crate::input::*;
use crate::types::*;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Remaining places of an event, `None` when the event has no participant limit.
pub fn available_spots(max_participants: Option<i32>, count: u64) -> Option<u64> {
    max_participants.map(|max| (max.max(0) as u64).saturating_sub(count))
}

pub fn is_full(max_participants: Option<i32>, count: u64) -> bool {
    match max_participants {
        Some(max) => count >= max.max(0) as u64,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationAccessStatus {
    NoOrg,
    Authorized,
    Unauthorized,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Event not found")]
    NotFound,
    #[error("Registration is not required for this event")]
    NotRequired,
    #[error("This event is already fully booked")]
    Full,
    #[error("You are already registered for this event")]
    AlreadyRegistered,
    #[error("{0}")]
    Invalid(#[from] FormErrors),
    #[error("Email could not be sent")]
    MailFailed,
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.check(
            "First name",
            validate_required(&self.first_name, PARTICIPANT_NAME_MAX_LENGTH),
        );
        errors.check(
            "Last name",
            validate_required(&self.last_name, PARTICIPANT_NAME_MAX_LENGTH),
        );
        errors.check("Email address", validate_email(&self.email));

        if let Some(phone) = optional_text(self.phone.clone()) {
            errors.check("Phone number", validate_phone(&phone));
        }

        errors.into_result()
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub target_group: String,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub event_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub organization: Option<Uuid>,
    #[serde(default)]
    pub registration_required: bool,
    pub max_participants: Option<i32>,
}

/// Validates an event form. `memberships` are the organizations the author
/// may publish events for.
pub fn validate_event_form(form: &EventForm, memberships: &[Uuid]) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    errors.check("Title", validate_required(&form.title, EVENT_TITLE_MAX_LENGTH));
    errors.check(
        "Location",
        validate_max_length(&form.location, EVENT_TEXT_MAX_LENGTH),
    );
    errors.check(
        "Target group",
        validate_max_length(&form.target_group, EVENT_TEXT_MAX_LENGTH),
    );

    if form.end_date.is_some_and(|end_date| end_date < form.start_date) {
        errors.add("End date", "The end date must not be before the start date");
    }

    if let Some(url) = optional_text(form.event_url.clone()) {
        errors.check("Event URL", validate_url(&url));
    }

    match form.max_participants {
        Some(max) if max < 1 => {
            errors.add("Max participants", "Ensure this value is greater than or equal to 1")
        }
        None if form.registration_required => errors.add(
            "Max participants",
            "A participant limit is required when registration is required",
        ),
        _ => {}
    }

    if form
        .organization
        .is_some_and(|organization| !memberships.contains(&organization))
    {
        errors.add("Organization", "You are not a member of this organization");
    }

    errors.into_result()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub organization: Option<Uuid>,
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub registration_open: Option<bool>,
}

pub async fn list_events<C: ConnectionTrait>(
    db: &C,
    filter: &EventFilter,
    include_private: bool,
) -> Result<Vec<MEvent>, DbErr> {
    let mut condition = Condition::all();

    if !include_private {
        condition = condition.add(CEvent::IsPublic.eq(true));
    }

    if let Some(organization) = filter.organization {
        condition = condition.add(CEvent::Organization.eq(organization));
    }

    if let Some(search) = optional_text(filter.search.clone()) {
        condition = condition.add(
            Condition::any()
                .add(CEvent::Title.contains(&search))
                .add(CEvent::Description.contains(&search)),
        );
    }

    if let Some(date_from) = filter.date_from {
        condition = condition.add(CEvent::StartDate.gte(date_from.and_time(NaiveTime::MIN)));
    }

    if let Some(date_to) = filter.date_to {
        condition = condition.add(
            CEvent::StartDate.lt(date_to.and_time(NaiveTime::MIN) + Duration::days(1)),
        );
    }

    if filter.registration_open == Some(true) {
        condition = condition
            .add(CEvent::RegistrationRequired.eq(true))
            .add(CEvent::StartDate.gte(Utc::now().naive_utc()));
    }

    EEvent::find()
        .filter(condition)
        .order_by_desc(CEvent::CreatedAt)
        .all(db)
        .await
}

pub async fn registration_count<C: ConnectionTrait>(db: &C, event_id: Uuid) -> Result<u64, DbErr> {
    EEventRegistration::find()
        .filter(CEventRegistration::Event.eq(event_id))
        .count(db)
        .await
}

pub async fn organization_access_status<C: ConnectionTrait>(
    db: &C,
    event: &MEvent,
) -> anyhow::Result<OrganizationAccessStatus> {
    let Some(organization) = event.organization else {
        return Ok(OrganizationAccessStatus::NoOrg);
    };

    let Some(created_by) = event.created_by else {
        return Ok(OrganizationAccessStatus::Unauthorized);
    };

    if is_member(db, created_by, organization).await? {
        Ok(OrganizationAccessStatus::Authorized)
    } else {
        Ok(OrganizationAccessStatus::Unauthorized)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: MEvent,
    pub registration_count: u64,
    pub available_spots: Option<u64>,
    pub is_full: bool,
    pub organization_access_status: OrganizationAccessStatus,
}

pub async fn event_detail<C: ConnectionTrait>(db: &C, event: MEvent) -> anyhow::Result<EventDetail> {
    let count = registration_count(db, event.id).await?;
    let organization_access_status = organization_access_status(db, &event).await?;

    Ok(EventDetail {
        available_spots: available_spots(event.max_participants, count),
        is_full: is_full(event.max_participants, count),
        registration_count: count,
        organization_access_status,
        event,
    })
}

pub async fn register_for_event(
    state: &ServerState,
    event_id: Uuid,
    form: RegistrationForm,
) -> Result<MEventRegistration, RegistrationError> {
    form.validate()?;

    let txn = state.db.begin().await?;

    let event = EEvent::find_by_id(event_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .filter(|e| e.is_public)
        .ok_or(RegistrationError::NotFound)?;

    if !event.registration_required {
        return Err(RegistrationError::NotRequired);
    }

    let count = registration_count(&txn, event.id).await?;
    if is_full(event.max_participants, count) {
        return Err(RegistrationError::Full);
    }

    let email = normalize_email(&form.email);

    let duplicate = EEventRegistration::find()
        .filter(
            Condition::all()
                .add(CEventRegistration::Event.eq(event.id))
                .add(CEventRegistration::Email.eq(email.clone())),
        )
        .one(&txn)
        .await?;

    if duplicate.is_some() {
        return Err(RegistrationError::AlreadyRegistered);
    }

    let registration = AEventRegistration {
        id: Set(Uuid::new_v4()),
        event: Set(event.id),
        first_name: Set(form.first_name.trim().to_string()),
        last_name: Set(form.last_name.trim().to_string()),
        email: Set(email),
        phone: Set(optional_text(form.phone)),
        notes: Set(optional_text(form.notes)),
        registration_date: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RegistrationError::AlreadyRegistered,
        _ => RegistrationError::Database(e),
    })?;

    txn.commit().await?;

    info!(event = %event.id, "New event registration");
    Ok(registration)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Sent(usize),
    NotFound,
}

/// Mails the list of events an email address is registered for.
pub async fn lookup_registrations(
    state: &ServerState,
    email: &str,
) -> Result<LookupOutcome, RegistrationError> {
    validate_email(email).map_err(|e| FormErrors::from(InputError::new("Email address", e)))?;
    let email = normalize_email(email);

    let registrations = EEventRegistration::find()
        .filter(CEventRegistration::Email.eq(email.clone()))
        .all(&state.db)
        .await?;

    if registrations.is_empty() {
        return Ok(LookupOutcome::NotFound);
    }

    let event_ids = registrations.iter().map(|r| r.event).collect::<Vec<Uuid>>();
    let events = EEvent::find()
        .filter(CEvent::Id.is_in(event_ids))
        .order_by_asc(CEvent::StartDate)
        .all(&state.db)
        .await?;

    if let Err(e) = state
        .mailer
        .send(registrations_summary_email(&email, &events))
        .await
    {
        error!(error = %e, "Failed to send registrations summary");
        return Err(RegistrationError::MailFailed);
    }

    Ok(LookupOutcome::Sent(events.len()))
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRegistrations {
    pub event: MEvent,
    pub registrations: Vec<MEventRegistration>,
}

pub async fn organization_event_registrations(
    state: &ServerState,
    user: &MUser,
    organization_id: Uuid,
) -> Result<Vec<EventRegistrations>, AccessError> {
    if !is_member(&state.db, user.id, organization_id).await? {
        return Err(AccessError::NotMember);
    }

    let events = EEvent::find()
        .filter(CEvent::Organization.eq(organization_id))
        .order_by_desc(CEvent::StartDate)
        .all(&state.db)
        .await?;

    if events.is_empty() {
        return Ok(Vec::new());
    }

    let event_ids = events.iter().map(|e| e.id).collect::<Vec<Uuid>>();
    let mut registrations: HashMap<Uuid, Vec<MEventRegistration>> = HashMap::new();

    for registration in EEventRegistration::find()
        .filter(CEventRegistration::Event.is_in(event_ids))
        .order_by_asc(CEventRegistration::RegistrationDate)
        .all(&state.db)
        .await?
    {
        registrations
            .entry(registration.event)
            .or_default()
            .push(registration);
    }

    Ok(events
        .into_iter()
        .map(|event| EventRegistrations {
            registrations: registrations.remove(&event.id).unwrap_or_default(),
            event,
        })
        .collect())
}
