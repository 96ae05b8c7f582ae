/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::database::{add_membership, get_admins, get_or_create_profile};
use crate::email::{access_approved_email, access_request_notification};
use crate::types::*;
use chrono::{NaiveDateTime, Utc};
use entity::organization_access_request::AccessRequestStatus;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Data consent is required")]
    ConsentRequired,
    #[error("Organization not found")]
    OrganizationNotFound,
    #[error("An access request for this organization already exists")]
    AlreadyRequested,
    #[error("Access request not found")]
    RequestNotFound,
    #[error("Access request has already been reviewed")]
    AlreadyReviewed,
    #[error("Only administrators can review access requests")]
    Forbidden,
    #[error("Decision must be either approved or rejected")]
    InvalidDecision,
    #[error("You are not a member of this organization")]
    NotMember,
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessRequestSummary {
    pub id: Uuid,
    pub user: Uuid,
    pub username: Option<String>,
    pub organization: Uuid,
    pub organization_name: Option<String>,
    pub status: AccessRequestStatus,
    pub requested_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
}

pub async fn request_organization_access(
    state: &ServerState,
    user: &MUser,
    organization_id: Uuid,
    data_consent: bool,
) -> Result<MOrganizationAccessRequest, AccessError> {
    if !data_consent {
        return Err(AccessError::ConsentRequired);
    }

    let organization = EOrganization::find_by_id(organization_id)
        .one(&state.db)
        .await?
        .ok_or(AccessError::OrganizationNotFound)?;

    let existing = EOrganizationAccessRequest::find()
        .filter(
            Condition::all()
                .add(COrganizationAccessRequest::User.eq(user.id))
                .add(COrganizationAccessRequest::Organization.eq(organization.id)),
        )
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AccessError::AlreadyRequested);
    }

    let request = AOrganizationAccessRequest {
        id: Set(Uuid::new_v4()),
        user: Set(user.id),
        organization: Set(organization.id),
        status: Set(AccessRequestStatus::Pending),
        data_consent: Set(true),
        requested_at: Set(Utc::now().naive_utc()),
        reviewed_at: Set(None),
        reviewed_by: Set(None),
    }
    .insert(&state.db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AccessError::AlreadyRequested,
        _ => AccessError::Database(e),
    })?;

    info!(
        user = %user.username,
        organization = %organization.name,
        "Access request created"
    );

    notify_admins(state, user, &organization).await;

    Ok(request)
}

async fn notify_admins(state: &ServerState, requester: &MUser, organization: &MOrganization) {
    if !state.mailer.is_enabled() {
        return;
    }

    let admins = match get_admins(&state.db).await {
        Ok(admins) => admins,
        Err(e) => {
            warn!(error = %e, "Could not load administrators for notification");
            return;
        }
    };

    for admin in admins {
        let email =
            access_request_notification(&admin, requester, organization, &state.cli.serve_url);

        if let Err(e) = state.mailer.send(email).await {
            warn!(error = %e, admin = %admin.username, "Failed to notify administrator");
        }
    }
}

pub async fn review_access_request_detail(
    state: &ServerState,
    reviewer: &MUser,
    request_id: Uuid,
    decision: AccessRequestStatus,
) -> Result<MOrganizationAccessRequest, AccessError> {
    if !reviewer.is_admin() {
        return Err(AccessError::Forbidden);
    }

    if decision == AccessRequestStatus::Pending {
        return Err(AccessError::InvalidDecision);
    }

    let txn = state.db.begin().await?;

    let request = EOrganizationAccessRequest::find_by_id(request_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(AccessError::RequestNotFound)?;

    if !request.is_pending() {
        return Err(AccessError::AlreadyReviewed);
    }

    let mut arequest: AOrganizationAccessRequest = request.into();
    arequest.status = Set(decision);
    arequest.reviewed_at = Set(Some(Utc::now().naive_utc()));
    arequest.reviewed_by = Set(Some(reviewer.id));
    let request = arequest.update(&txn).await?;

    if decision == AccessRequestStatus::Approved {
        let profile = get_or_create_profile(&txn, request.user).await?;
        add_membership(&txn, &profile, request.organization).await?;
    }

    txn.commit().await?;

    info!(
        request = %request.id,
        reviewer = %reviewer.username,
        status = %request.status,
        "Access request reviewed"
    );

    if decision == AccessRequestStatus::Approved {
        notify_approved(state, &request).await;
    }

    Ok(request)
}

async fn notify_approved(state: &ServerState, request: &MOrganizationAccessRequest) {
    if !state.mailer.is_enabled() {
        return;
    }

    let user = EUser::find_by_id(request.user).one(&state.db).await;
    let organization = EOrganization::find_by_id(request.organization)
        .one(&state.db)
        .await;

    match (user, organization) {
        (Ok(Some(user)), Ok(Some(organization))) => {
            if let Err(e) = state
                .mailer
                .send(access_approved_email(&user, &organization))
                .await
            {
                warn!(error = %e, user = %user.username, "Failed to send approval email");
            }
        }
        _ => warn!(request = %request.id, "Could not load approval email recipients"),
    }
}

pub async fn my_access_requests(
    state: &ServerState,
    user: &MUser,
) -> Result<Vec<AccessRequestSummary>, AccessError> {
    let requests = EOrganizationAccessRequest::find()
        .filter(COrganizationAccessRequest::User.eq(user.id))
        .order_by_desc(COrganizationAccessRequest::RequestedAt)
        .all(&state.db)
        .await?;

    summarize(state, requests).await
}

pub async fn review_access_requests(
    state: &ServerState,
    status: Option<AccessRequestStatus>,
) -> Result<Vec<AccessRequestSummary>, AccessError> {
    let mut query = EOrganizationAccessRequest::find();

    if let Some(status) = status {
        query = query.filter(COrganizationAccessRequest::Status.eq(status));
    }

    let requests = query
        .order_by_desc(COrganizationAccessRequest::RequestedAt)
        .all(&state.db)
        .await?;

    summarize(state, requests).await
}

async fn summarize(
    state: &ServerState,
    requests: Vec<MOrganizationAccessRequest>,
) -> Result<Vec<AccessRequestSummary>, AccessError> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids = requests.iter().map(|r| r.user).collect::<Vec<Uuid>>();
    let organization_ids = requests.iter().map(|r| r.organization).collect::<Vec<Uuid>>();

    let usernames = EUser::find()
        .filter(CUser::Id.is_in(user_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect::<HashMap<Uuid, String>>();

    let organization_names = EOrganization::find()
        .filter(COrganization::Id.is_in(organization_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|o| (o.id, o.name))
        .collect::<HashMap<Uuid, String>>();

    Ok(requests
        .into_iter()
        .map(|r| AccessRequestSummary {
            id: r.id,
            user: r.user,
            username: usernames.get(&r.user).cloned(),
            organization: r.organization,
            organization_name: organization_names.get(&r.organization).cloned(),
            status: r.status,
            requested_at: r.requested_at,
            reviewed_at: r.reviewed_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NULL_TIME;
    use crate::email::MockMailer;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_mock_cli() -> Cli {
        Cli {
            log_level: "info".to_string(),
            ip: "127.0.0.1".to_string(),
            port: 3000,
            serve_url: "http://127.0.0.1:8000".to_string(),
            database_url: Some("mock://test".to_string()),
            database_url_file: None,
            jwt_secret_file: "test_jwt".to_string(),
            disable_registration: false,
            email_enabled: true,
            email_smtp_host: None,
            email_smtp_port: 587,
            email_smtp_username: None,
            email_smtp_password_file: None,
            email_from_address: None,
            email_from_name: "Convene".to_string(),
            email_disable_tls: false,
            admin_username: None,
            admin_email: None,
            admin_password_file: None,
            report_errors: false,
            sentry_dsn: None,
        }
    }

    fn user(username: &str, is_staff: bool) -> MUser {
        MUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{}@example.com", username),
            password: "hash".to_string(),
            is_active: true,
            is_staff,
            is_superuser: false,
            email_verification_token: None,
            email_verification_token_expires: None,
            last_login_at: *NULL_TIME,
            created_at: *NULL_TIME,
        }
    }

    fn organization() -> MOrganization {
        MOrganization {
            id: Uuid::new_v4(),
            name: "Sportverein".to_string(),
            organization_url: "https://verein.example.com".to_string(),
            street: None,
            post_code: "12345".to_string(),
            city: Some("Berlin".to_string()),
            authenticity_checked: false,
            created_at: *NULL_TIME,
        }
    }

    fn access_request(user: Uuid, organization: Uuid, status: AccessRequestStatus) -> MOrganizationAccessRequest {
        MOrganizationAccessRequest {
            id: Uuid::new_v4(),
            user,
            organization,
            status,
            data_consent: true,
            requested_at: *NULL_TIME,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    fn state(db: sea_orm::DatabaseConnection, mailer: MockMailer) -> ServerState {
        ServerState {
            db,
            cli: create_mock_cli(),
            mailer: Arc::new(mailer),
        }
    }

    #[tokio::test]
    async fn test_request_requires_consent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db, MockMailer::new());

        let result =
            request_organization_access(&state, &user("alice", false), Uuid::new_v4(), false).await;

        assert!(matches!(result, Err(AccessError::ConsentRequired)));
    }

    #[tokio::test]
    async fn test_request_unknown_organization() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<MOrganization>::new()])
            .into_connection();
        let state = state(db, MockMailer::new());

        let result =
            request_organization_access(&state, &user("alice", false), Uuid::new_v4(), true).await;

        assert!(matches!(result, Err(AccessError::OrganizationNotFound)));
    }

    #[tokio::test]
    async fn test_request_rejects_duplicate() {
        let requester = user("alice", false);
        let org = organization();
        let existing = access_request(requester.id, org.id, AccessRequestStatus::Rejected);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![org.clone()]])
            .append_query_results([vec![existing]])
            .into_connection();
        let state = state(db, MockMailer::new());

        let result = request_organization_access(&state, &requester, org.id, true).await;

        assert!(matches!(result, Err(AccessError::AlreadyRequested)));
    }

    #[tokio::test]
    async fn test_request_creates_pending_and_notifies_admins() {
        let requester = user("alice", false);
        let admin = user("admin", true);
        let org = organization();
        let created = access_request(requester.id, org.id, AccessRequestStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![org.clone()]])
            .append_query_results([Vec::<MOrganizationAccessRequest>::new(), vec![created.clone()]])
            .append_query_results([vec![admin.clone()]])
            .into_connection();

        let mut mailer = MockMailer::new();
        mailer.expect_is_enabled().return_const(true);
        mailer
            .expect_send()
            .withf(|email| email.to_email == "admin@example.com")
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("smtp unavailable")));

        let state = state(db, mailer);
        let request = request_organization_access(&state, &requester, org.id, true)
            .await
            .unwrap();

        assert_eq!(request.status, AccessRequestStatus::Pending);
        assert_eq!(request.user, requester.id);
        assert_eq!(request.organization, org.id);
    }

    #[tokio::test]
    async fn test_review_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db, MockMailer::new());

        let result = review_access_request_detail(
            &state,
            &user("alice", false),
            Uuid::new_v4(),
            AccessRequestStatus::Approved,
        )
        .await;

        assert!(matches!(result, Err(AccessError::Forbidden)));
    }

    #[tokio::test]
    async fn test_review_rejects_pending_decision() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db, MockMailer::new());

        let result = review_access_request_detail(
            &state,
            &user("admin", true),
            Uuid::new_v4(),
            AccessRequestStatus::Pending,
        )
        .await;

        assert!(matches!(result, Err(AccessError::InvalidDecision)));
    }

    #[tokio::test]
    async fn test_review_already_reviewed() {
        let reviewer = user("admin", true);
        let request = access_request(Uuid::new_v4(), Uuid::new_v4(), AccessRequestStatus::Approved);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request.clone()]])
            .into_connection();
        let state = state(db, MockMailer::new());

        let result = review_access_request_detail(
            &state,
            &reviewer,
            request.id,
            AccessRequestStatus::Rejected,
        )
        .await;

        assert!(matches!(result, Err(AccessError::AlreadyReviewed)));

        let log = format!("{:?}", state.db.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_approve_adds_membership_and_emails_user() {
        let reviewer = user("admin", true);
        let requester = user("alice", false);
        let org = organization();
        let pending = access_request(requester.id, org.id, AccessRequestStatus::Pending);
        let approved = MOrganizationAccessRequest {
            status: AccessRequestStatus::Approved,
            reviewed_at: Some(*NULL_TIME),
            reviewed_by: Some(reviewer.id),
            ..pending.clone()
        };
        let profile = MUserProfile {
            id: Uuid::new_v4(),
            user: requester.id,
            phone: None,
        };
        let membership = MOrganizationMember {
            id: Uuid::new_v4(),
            profile: profile.id,
            organization: org.id,
            created_at: *NULL_TIME,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()], vec![approved.clone()]])
            .append_query_results([vec![profile]])
            .append_query_results([Vec::<MOrganizationMember>::new(), vec![membership]])
            .append_query_results([vec![requester.clone()]])
            .append_query_results([vec![org.clone()]])
            .into_connection();

        let mut mailer = MockMailer::new();
        mailer.expect_is_enabled().return_const(true);
        mailer
            .expect_send()
            .withf(|email| email.to_email == "alice@example.com")
            .times(1)
            .returning(|_| Ok(()));

        let state = state(db, mailer);
        let request =
            review_access_request_detail(&state, &reviewer, pending.id, AccessRequestStatus::Approved)
                .await
                .unwrap();

        assert_eq!(request.status, AccessRequestStatus::Approved);
        assert_eq!(request.reviewed_by, Some(reviewer.id));
    }

    #[tokio::test]
    async fn test_approve_does_not_duplicate_membership() {
        let reviewer = user("admin", true);
        let requester = user("alice", false);
        let org = organization();
        let pending = access_request(requester.id, org.id, AccessRequestStatus::Pending);
        let approved = MOrganizationAccessRequest {
            status: AccessRequestStatus::Approved,
            ..pending.clone()
        };
        let profile = MUserProfile {
            id: Uuid::new_v4(),
            user: requester.id,
            phone: None,
        };
        let membership = MOrganizationMember {
            id: Uuid::new_v4(),
            profile: profile.id,
            organization: org.id,
            created_at: *NULL_TIME,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()], vec![approved]])
            .append_query_results([vec![profile]])
            .append_query_results([vec![membership]])
            .into_connection();

        let mut mailer = MockMailer::new();
        mailer.expect_is_enabled().return_const(false);
        mailer.expect_send().never();

        let state = state(db, mailer);
        review_access_request_detail(&state, &reviewer, pending.id, AccessRequestStatus::Approved)
            .await
            .unwrap();

        let log = format!("{:?}", state.db.into_transaction_log());
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_reject_only_updates_status() {
        let reviewer = user("admin", true);
        let pending = access_request(Uuid::new_v4(), Uuid::new_v4(), AccessRequestStatus::Pending);
        let rejected = MOrganizationAccessRequest {
            status: AccessRequestStatus::Rejected,
            ..pending.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()], vec![rejected]])
            .into_connection();

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let state = state(db, mailer);
        let request =
            review_access_request_detail(&state, &reviewer, pending.id, AccessRequestStatus::Rejected)
                .await
                .unwrap();

        assert_eq!(request.status, AccessRequestStatus::Rejected);
    }

    #[tokio::test]
    async fn test_my_access_requests_includes_names() {
        let requester = user("alice", false);
        let org = organization();
        let request = access_request(requester.id, org.id, AccessRequestStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request]])
            .append_query_results([vec![requester.clone()]])
            .append_query_results([vec![org.clone()]])
            .into_connection();
        let state = state(db, MockMailer::new());

        let summaries = my_access_requests(&state, &requester).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].username.as_deref(), Some("alice"));
        assert_eq!(summaries[0].organization_name.as_deref(), Some("Sportverein"));
    }
}
