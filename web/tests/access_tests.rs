/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use axum::http::StatusCode;
use common::*;
use convene_core::types::*;
use entity::organization_access_request::AccessRequestStatus;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use web::authorization::encode_jwt;
use web::create_router;

#[tokio::test]
async fn test_request_access_notifies_admins() {
    let user = test_user("erika", false);
    let admin = test_user("admin", true);
    let organization = test_organization();
    let created = test_access_request(user.id, organization.id, AccessRequestStatus::Pending);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![organization.clone()]])
        .append_query_results([Vec::<MOrganizationAccessRequest>::new(), vec![created.clone()]])
        .append_query_results([vec![admin]])
        .into_connection();
    let mailer = Arc::new(RecordingMailer::new(true, false));
    let state = create_mock_state(db, Arc::clone(&mailer));
    let token = encode_jwt(&state, user.id).unwrap();
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(authorized_json_request(
            "POST",
            "/api/v1/access-requests",
            json!({ "organization": organization.id, "data_consent": true }),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], false);
    assert_eq!(body["message"], created.id.to_string());
    assert_eq!(mailer.sent_count(), 1);
    assert_eq!(mailer.sent.lock().unwrap()[0].to_email, "admin@example.com");
}

#[tokio::test]
async fn test_request_access_requires_consent() {
    let user = test_user("erika", false);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .into_connection();
    let state = create_mock_state(db, Arc::new(RecordingMailer::new(true, false)));
    let token = encode_jwt(&state, user.id).unwrap();
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(authorized_json_request(
            "POST",
            "/api/v1/access-requests",
            json!({ "organization": test_organization().id }),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Data consent is required");
}

#[tokio::test]
async fn test_review_rejects_request() {
    let admin = test_user("admin", true);
    let pending = test_access_request(
        test_user("erika", false).id,
        test_organization().id,
        AccessRequestStatus::Pending,
    );
    let rejected = MOrganizationAccessRequest {
        status: AccessRequestStatus::Rejected,
        reviewed_at: Some(pending.requested_at),
        reviewed_by: Some(admin.id),
        ..pending.clone()
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin.clone()]])
        .append_query_results([vec![pending.clone()], vec![rejected]])
        .into_connection();
    let mailer = Arc::new(RecordingMailer::new(true, false));
    let state = create_mock_state(db, Arc::clone(&mailer));
    let token = encode_jwt(&state, admin.id).unwrap();
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(authorized_json_request(
            "POST",
            &format!("/api/v1/admin/access-requests/{}", pending.id),
            json!({ "decision": "rejected" }),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Access request rejected");
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_review_already_reviewed_conflict() {
    let admin = test_user("admin", true);
    let approved = test_access_request(
        test_user("erika", false).id,
        test_organization().id,
        AccessRequestStatus::Approved,
    );

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin.clone()]])
        .append_query_results([vec![approved.clone()]])
        .into_connection();
    let state = create_mock_state(db, Arc::new(RecordingMailer::new(true, false)));
    let token = encode_jwt(&state, admin.id).unwrap();
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(authorized_json_request(
            "POST",
            &format!("/api/v1/admin/access-requests/{}", approved.id),
            json!({ "decision": "rejected" }),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Access request has already been reviewed");
}
