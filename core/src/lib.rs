/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod access;
pub mod consts;
pub mod database;
pub mod email;
pub mod events;
pub mod input;
pub mod types;

use anyhow::Result;
use database::connect_db;
use email::EmailService;
use std::sync::Arc;
use tracing::info;
use types::*;

pub async fn init_state(cli: Cli) -> Result<Arc<ServerState>> {
    info!(ip = %cli.ip, port = cli.port, "Starting Convene server");

    let db = connect_db(&cli).await?;
    let mailer = Arc::new(EmailService::new(&cli).await?);

    Ok(Arc::new(ServerState { db, cli, mailer }))
}
