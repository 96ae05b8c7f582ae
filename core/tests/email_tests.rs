/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for composed email messages

use chrono::NaiveDate;
use convene_core::consts::NULL_TIME;
use convene_core::email::*;
use convene_core::types::*;
use uuid::Uuid;

fn user(username: &str) -> MUser {
    MUser {
        id: Uuid::new_v4(),
        username: username.to_string(),
        first_name: "Erika".to_string(),
        last_name: "Mustermann".to_string(),
        email: format!("{}@example.com", username),
        password: "hash".to_string(),
        is_active: false,
        is_staff: false,
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
        name: "Turnverein".to_string(),
        organization_url: "https://turnverein.example.com".to_string(),
        street: None,
        post_code: "10115".to_string(),
        city: None,
        authenticity_checked: true,
        created_at: *NULL_TIME,
    }
}

fn event(title: &str, day: u32) -> MEvent {
    let start = NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap();

    MEvent {
        id: Uuid::new_v4(),
        title: title.to_string(),
        event_url: None,
        organization: None,
        created_by: None,
        description: String::new(),
        location: String::new(),
        target_group: String::new(),
        start_date: start,
        end_date: None,
        is_public: true,
        registration_required: true,
        max_participants: Some(10),
        created_at: start,
        updated_at: start,
    }
}

#[test]
fn test_generate_verification_token() {
    let token = generate_verification_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(token, generate_verification_token());
}

#[test]
fn test_confirmation_email() {
    let email = confirmation_email(&user("erika"), "abc123", "https://convene.example.com/");

    assert_eq!(email.to_email, "erika@example.com");
    assert_eq!(email.to_name, "Erika Mustermann");
    assert!(
        email
            .body
            .contains("https://convene.example.com/api/v1/auth/verify-email?token=abc123")
    );
}

#[test]
fn test_access_request_notification() {
    let email = access_request_notification(
        &user("admin"),
        &user("erika"),
        &organization(),
        "https://convene.example.com",
    );

    assert_eq!(email.to_email, "admin@example.com");
    assert_eq!(email.subject, "New access request for Turnverein");
    assert!(email.body.contains("erika (erika@example.com)"));
}

#[test]
fn test_access_approved_email() {
    let email = access_approved_email(&user("erika"), &organization());

    assert_eq!(email.to_email, "erika@example.com");
    assert!(email.body.contains("\"Turnverein\" was approved"));
}

#[test]
fn test_registrations_summary_email() {
    let events = vec![event("Yoga", 2), event("Lauftreff", 14)];
    let email = registrations_summary_email("erika@example.com", &events);

    assert_eq!(email.to_email, "erika@example.com");
    assert!(email.to_name.is_empty());
    assert!(
        email
            .body
            .contains("- Yoga on 02.03.2026 09:05\n- Lauftreff on 14.03.2026 09:05")
    );
}
