/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::consts::EVENT_DATE_FORMAT;
use crate::types::{Cli, MEvent, MOrganization, MUser};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    fn is_enabled(&self) -> bool;

    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
    from_name: String,
    enabled: bool,
}

impl EmailService {
    pub async fn new(cli: &Cli) -> Result<Self> {
        if !cli.email_enabled {
            return Ok(Self {
                transport: None,
                from_address: String::new(),
                from_name: cli.email_from_name.clone(),
                enabled: false,
            });
        }

        let smtp_host = cli
            .email_smtp_host
            .as_ref()
            .context("SMTP host is required when email is enabled")?;

        let smtp_username = cli
            .email_smtp_username
            .as_ref()
            .context("SMTP username is required when email is enabled")?;

        let smtp_password_file = cli
            .email_smtp_password_file
            .as_ref()
            .context("SMTP password file is required when email is enabled")?;

        let from_address = cli
            .email_from_address
            .as_ref()
            .context("From address is required when email is enabled")?;

        let smtp_password = fs::read_to_string(smtp_password_file)
            .await
            .context("Failed to read SMTP password file")?
            .trim()
            .to_string();

        let credentials = Credentials::new(smtp_username.clone(), smtp_password);

        let transport = if cli.email_disable_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
                .credentials(credentials)
                .port(cli.email_smtp_port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                .context("Failed to create SMTP transport")?
                .credentials(credentials)
                .port(cli.email_smtp_port)
                .build()
        };

        Ok(Self {
            transport: Some(transport),
            from_address: from_address.clone(),
            from_name: cli.email_from_name.clone(),
            enabled: true,
        })
    }
}

#[async_trait]
impl Mailer for EmailService {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if !self.enabled {
            bail!("Email service is not enabled");
        }

        let transport = self
            .transport
            .as_ref()
            .context("SMTP transport not initialized")?;

        let to = if email.to_name.is_empty() {
            email.to_email.clone()
        } else {
            format!("{} <{}>", email.to_name, email.to_email)
        };

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_address)
                    .parse()
                    .context("Invalid from address")?,
            )
            .to(to.parse().context("Invalid to address")?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .context("Failed to build email")?;

        transport
            .send(message)
            .await
            .context("Failed to send email")?;

        info!(subject = %email.subject, "Email sent to {}", email.to_email);
        Ok(())
    }
}

pub fn generate_verification_token() -> String {
    let token: [u8; 32] = rand::random();
    hex::encode(token)
}

pub fn confirmation_email(user: &MUser, token: &str, base_url: &str) -> OutgoingEmail {
    let link = format!(
        "{}/api/v1/auth/verify-email?token={}",
        base_url.trim_end_matches('/'),
        token
    );

    OutgoingEmail {
        to_email: user.email.clone(),
        to_name: user.full_name(),
        subject: "Confirm your account".to_string(),
        body: format!(
            "Hello {},\n\nplease confirm your account by opening the following link:\n\n{}\n\nThe link expires in 24 hours.",
            user.username, link
        ),
    }
}

pub fn access_request_notification(
    admin: &MUser,
    requester: &MUser,
    organization: &MOrganization,
    base_url: &str,
) -> OutgoingEmail {
    OutgoingEmail {
        to_email: admin.email.clone(),
        to_name: admin.full_name(),
        subject: format!("New access request for {}", organization.name),
        body: format!(
            "Hello {},\n\n{} ({}) requested access to the organization \"{}\".\n\nReview pending requests at {}/api/v1/admin/access-requests?status=pending",
            admin.username,
            requester.username,
            requester.email,
            organization.name,
            base_url.trim_end_matches('/')
        ),
    }
}

pub fn access_approved_email(user: &MUser, organization: &MOrganization) -> OutgoingEmail {
    OutgoingEmail {
        to_email: user.email.clone(),
        to_name: user.full_name(),
        subject: format!("Access to {} approved", organization.name),
        body: format!(
            "Hello {},\n\nyour request to join \"{}\" was approved. You can now create events for this organization.",
            user.username, organization.name
        ),
    }
}

pub fn registrations_summary_email(email: &str, events: &[MEvent]) -> OutgoingEmail {
    let event_list = events
        .iter()
        .map(|e| format!("- {} on {}", e.title, e.start_date.format(EVENT_DATE_FORMAT)))
        .collect::<Vec<String>>()
        .join("\n");

    OutgoingEmail {
        to_email: email.to_string(),
        to_name: String::new(),
        subject: "Your event registrations".to_string(),
        body: format!(
            "Hello,\n\nyou are registered for the following events:\n\n{}\n\nKind regards\nYour event team",
            event_list
        ),
    }
}
