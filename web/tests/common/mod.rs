/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::NaiveDate;
use convene_core::email::{Mailer, OutgoingEmail};
use convene_core::types::*;
use entity::organization_access_request::AccessRequestStatus;
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct RecordingMailer {
    enabled: bool,
    fail: bool,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn new(enabled: bool, fail: bool) -> Self {
        Self {
            enabled,
            fail,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        self.sent.lock().unwrap().push(email);

        if self.fail {
            bail!("SMTP server unavailable");
        }

        Ok(())
    }
}

pub fn create_mock_cli() -> Cli {
    let jwt_secret_file = std::env::temp_dir().join(format!("convene-jwt-{}", Uuid::new_v4()));
    std::fs::write(&jwt_secret_file, "test-jwt-secret").unwrap();

    Cli {
        log_level: "info".to_string(),
        ip: "127.0.0.1".to_string(),
        port: 3000,
        serve_url: "http://127.0.0.1:8000".to_string(),
        database_url: Some("mock://test".to_string()),
        database_url_file: None,
        jwt_secret_file: jwt_secret_file.to_string_lossy().to_string(),
        disable_registration: false,
        email_enabled: false,
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

pub fn create_mock_state(db: DatabaseConnection, mailer: Arc<RecordingMailer>) -> Arc<ServerState> {
    Arc::new(ServerState {
        db,
        cli: create_mock_cli(),
        mailer,
    })
}

pub fn test_user(username: &str, is_staff: bool) -> MUser {
    let created = NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

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
        last_login_at: created,
        created_at: created,
    }
}

pub fn test_organization() -> MOrganization {
    MOrganization {
        id: Uuid::new_v4(),
        name: "Turnverein".to_string(),
        organization_url: "https://turnverein.example.com".to_string(),
        street: None,
        post_code: "10115".to_string(),
        city: Some("Berlin".to_string()),
        authenticity_checked: true,
        created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

pub fn test_access_request(
    user: Uuid,
    organization: Uuid,
    status: AccessRequestStatus,
) -> MOrganizationAccessRequest {
    MOrganizationAccessRequest {
        id: Uuid::new_v4(),
        user,
        organization,
        status,
        data_consent: true,
        requested_at: NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        reviewed_at: None,
        reviewed_by: None,
    }
}

pub fn test_event(registration_required: bool, max_participants: Option<i32>) -> MEvent {
    let start = NaiveDate::from_ymd_opt(2026, 9, 12)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    MEvent {
        id: Uuid::new_v4(),
        title: "Vereinsfest".to_string(),
        event_url: None,
        organization: None,
        created_by: None,
        description: "Jahresfest".to_string(),
        location: "Vereinsheim".to_string(),
        target_group: "Mitglieder".to_string(),
        start_date: start,
        end_date: None,
        is_public: true,
        registration_required,
        max_participants,
        created_at: start,
        updated_at: start,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authorized_json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn raw_json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
