/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use axum::http::StatusCode;
use common::*;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;
use web::create_router;

fn registration_body() -> serde_json::Value {
    json!({
        "first_name": "Max",
        "last_name": "Mustermann",
        "email": "max@example.com"
    })
}

fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(count)))])
}

#[tokio::test]
async fn test_list_events_anonymous() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_event(true, Some(10))]])
        .into_connection();
    let state = create_mock_state(db, Arc::new(RecordingMailer::new(false, false)));
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(empty_request(
            "GET",
            "/api/v1/events?search=fest&registration_open=true",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"].as_array().unwrap().len(), 1);
    assert_eq!(body["message"][0]["title"], "Vereinsfest");
}

#[tokio::test]
async fn test_event_detail_reports_capacity() {
    let event = test_event(true, Some(10));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![event.clone()]])
        .append_query_results([vec![count_row(7)]])
        .into_connection();
    let state = create_mock_state(db, Arc::new(RecordingMailer::new(false, false)));
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(empty_request("GET", &format!("/api/v1/events/{}", event.id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"]["available_spots"], 3);
    assert_eq!(body["message"]["is_full"], false);
    assert_eq!(body["message"]["organization_access_status"], "no_org");
}

#[tokio::test]
async fn test_register_not_required() {
    let event = test_event(false, None);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![event.clone()]])
        .into_connection();
    let state = create_mock_state(db, Arc::new(RecordingMailer::new(false, false)));
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/events/{}/register", event.id),
            registration_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Registration is not required for this event"
    );
}

#[tokio::test]
async fn test_register_full_event() {
    let event = test_event(true, Some(5));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![event.clone()]])
        .append_query_results([vec![count_row(5)]])
        .into_connection();
    let state = create_mock_state(db, Arc::new(RecordingMailer::new(false, false)));
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/events/{}/register", event.id),
            registration_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["message"],
        "This event is already fully booked"
    );
}

#[tokio::test]
async fn test_my_registrations_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<convene_core::types::MEventRegistration>::new()])
        .into_connection();
    let mailer = Arc::new(RecordingMailer::new(true, false));
    let state = create_mock_state(db, Arc::clone(&mailer));
    let app = create_router(state).unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/events/my-registrations",
            json!({ "email": "nobody@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(mailer.sent_count(), 0);
}
