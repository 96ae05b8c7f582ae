/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use email_address::EmailAddress;
use std::fmt;
use url::Url;

use super::consts::*;

/// A validation failure attached to the user-facing label of a form field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct InputError {
    pub field: String,
    pub message: String,
}

impl InputError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<InputError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(InputError::new(field, message));
    }

    /// Records the error of a validator result under the given field label.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[InputError] {
        &self.errors
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl From<InputError> for FormErrors {
    fn from(err: InputError) -> Self {
        Self { errors: vec![err] }
    }
}

pub fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a port number"))?;

    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn load_secret(f: &str) -> String {
    let s = std::fs::read_to_string(f).unwrap_or_default();
    s.trim().replace(char::from(25), "")
}

pub fn validate_required(s: &str, max_length: usize) -> Result<(), String> {
    if s.trim().is_empty() {
        return Err("This field is required".to_string());
    }

    validate_max_length(s, max_length)
}

pub fn validate_max_length(s: &str, max_length: usize) -> Result<(), String> {
    if s.chars().count() > max_length {
        return Err(format!(
            "Ensure this value has at most {} characters",
            max_length
        ));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    validate_required(username, USERNAME_MAX_LENGTH)?;

    if username
        .chars()
        .any(|c| !c.is_alphanumeric() && !"@.+-_".contains(c))
    {
        return Err(
            "Username may only contain letters, numbers and @/./+/-/_ characters".to_string(),
        );
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password cannot exceed 128 characters".to_string());
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }

    if password.to_lowercase().contains("password") {
        return Err("Password cannot contain the word 'password'".to_string());
    }

    // 3+ identical characters in a row
    if password
        .chars()
        .collect::<Vec<_>>()
        .windows(3)
        .any(|w| w[0] == w[1] && w[1] == w[2])
    {
        return Err("Password cannot contain repeated characters (e.g., 'aaa', '111')".to_string());
    }

    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("This field is required".to_string());
    }

    if !EmailAddress::is_valid(email.trim()) {
        return Err("Enter a valid email address".to_string());
    }

    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    validate_max_length(phone, PHONE_MAX_LENGTH)?;

    if phone
        .chars()
        .any(|c| !c.is_ascii_digit() && !" +-/()".contains(c))
    {
        return Err("Phone number may only contain digits, spaces and +-/()".to_string());
    }

    Ok(())
}

pub fn validate_post_code(post_code: &str) -> Result<(), String> {
    if post_code.len() != POST_CODE_LENGTH || !post_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "Post code must consist of {} digits",
            POST_CODE_LENGTH
        ));
    }

    Ok(())
}

pub fn validate_url(s: &str) -> Result<(), String> {
    let url = Url::parse(s.trim()).map_err(|_| "Enter a valid URL".to_string())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err("URL must start with http:// or https://".to_string());
    }

    if url.host_str().is_none() {
        return Err("Enter a valid URL".to_string());
    }

    Ok(())
}

/// Empty optional text inputs are stored as `NULL`.
pub fn optional_text(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
