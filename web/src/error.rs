/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Error as AnyhowError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use convene_core::access::AccessError;
use convene_core::events::RegistrationError;
use convene_core::input::{FormErrors, InputError};
use convene_core::types::BaseResponse;
use sea_orm::DbErr;
use std::fmt;

#[derive(Debug)]
pub enum WebError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InternalServerError(String),
    Database(DbErr),
    Form(FormErrors),
    JsonParsing(JsonRejection),
    QueryParsing(QueryRejection),
    PathParsing(PathRejection),
    Internal(AnyhowError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            WebError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            WebError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            WebError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            WebError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            WebError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            WebError::Database(err) => write!(f, "Database error: {}", err),
            WebError::Form(err) => write!(f, "Input validation error: {}", err),
            WebError::JsonParsing(err) => write!(f, "JSON parsing error: {}", err),
            WebError::QueryParsing(err) => write!(f, "Query parsing error: {}", err),
            WebError::PathParsing(err) => write!(f, "Path parsing error: {}", err),
            WebError::Internal(err) => write!(f, "Internal error: {}", err),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebError::Database(err) => Some(err),
            WebError::Form(err) => Some(err),
            WebError::JsonParsing(err) => Some(err),
            WebError::QueryParsing(err) => Some(err),
            WebError::PathParsing(err) => Some(err),
            WebError::Internal(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DbErr> for WebError {
    fn from(err: DbErr) -> Self {
        WebError::Database(err)
    }
}

impl From<InputError> for WebError {
    fn from(err: InputError) -> Self {
        WebError::Form(err.into())
    }
}

impl From<FormErrors> for WebError {
    fn from(err: FormErrors) -> Self {
        WebError::Form(err)
    }
}

impl From<JsonRejection> for WebError {
    fn from(err: JsonRejection) -> Self {
        WebError::JsonParsing(err)
    }
}

impl From<QueryRejection> for WebError {
    fn from(err: QueryRejection) -> Self {
        WebError::QueryParsing(err)
    }
}

impl From<PathRejection> for WebError {
    fn from(err: PathRejection) -> Self {
        WebError::PathParsing(err)
    }
}

impl From<AnyhowError> for WebError {
    fn from(err: AnyhowError) -> Self {
        WebError::Internal(err)
    }
}

impl From<AccessError> for WebError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::ConsentRequired | AccessError::InvalidDecision => {
                WebError::BadRequest(err.to_string())
            }
            AccessError::OrganizationNotFound | AccessError::RequestNotFound => {
                WebError::NotFound(err.to_string())
            }
            AccessError::AlreadyRequested | AccessError::AlreadyReviewed => {
                WebError::Conflict(err.to_string())
            }
            AccessError::Forbidden | AccessError::NotMember => {
                WebError::Forbidden(err.to_string())
            }
            AccessError::Database(err) => WebError::Database(err),
            AccessError::Internal(err) => WebError::Internal(err),
        }
    }
}

impl From<RegistrationError> for WebError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::NotFound => WebError::NotFound(err.to_string()),
            RegistrationError::NotRequired | RegistrationError::MailFailed => {
                WebError::BadRequest(err.to_string())
            }
            RegistrationError::Full | RegistrationError::AlreadyRegistered => {
                WebError::Conflict(err.to_string())
            }
            RegistrationError::Invalid(errors) => WebError::Form(errors),
            RegistrationError::Database(err) => WebError::Database(err),
            RegistrationError::Internal(err) => WebError::Internal(err),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if let WebError::Form(errors) = self {
            let body = Json(BaseResponse {
                error: true,
                message: errors.messages(),
            });

            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, error_message) = match self {
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            WebError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            WebError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            WebError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            WebError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            WebError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            WebError::Form(errors) => (StatusCode::BAD_REQUEST, errors.to_string()),
            WebError::JsonParsing(err) => (err.status(), err.body_text()),
            WebError::QueryParsing(err) => (err.status(), err.body_text()),
            WebError::PathParsing(err) => (err.status(), err.body_text()),
            WebError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(BaseResponse {
            error: true,
            message: error_message,
        });

        (status, body).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn not_found(resource: &str) -> Self {
        WebError::NotFound(format!("{} not found", resource))
    }

    pub fn invalid_credentials() -> Self {
        WebError::Unauthorized("Invalid credentials".to_string())
    }

    pub fn account_inactive() -> Self {
        WebError::Unauthorized("Account is not activated".to_string())
    }

    pub fn registration_disabled() -> Self {
        WebError::BadRequest("Registration is disabled".to_string())
    }

    pub fn confirmation_email_failed() -> Self {
        WebError::BadRequest("Confirmation email could not be sent".to_string())
    }

    pub fn failed_to_generate_token() -> Self {
        WebError::InternalServerError("Failed to generate token".to_string())
    }

    pub fn admin_required() -> Self {
        WebError::Forbidden("Administrator privileges required".to_string())
    }
}
