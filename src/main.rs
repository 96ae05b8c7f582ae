/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use clap::Parser;
use convene_core::init_state;
use convene_core::types::Cli;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", cli.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let _guard = match (cli.report_errors, cli.sentry_dsn.as_deref()) {
        (true, Some(dsn)) => {
            info!("Error reporting enabled");
            Some(sentry::init(dsn))
        }
        _ => None,
    };

    let state = init_state(cli).await?;
    web::serve_web(Arc::clone(&state)).await?;

    Ok(())
}
