/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod authorization;
pub mod endpoints;
pub mod error;
pub mod extract;

use anyhow::{Context, Result};
use authorization::{authorize, optional_authorize, require_admin};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use convene_core::types::ServerState;
use endpoints::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn create_router(state: Arc<ServerState>) -> Result<Router> {
    let public_routes = Router::new()
        .route("/health", get(get_health))
        .route("/auth/register", post(auth::post_register))
        .route("/auth/verify-email", get(auth::get_verify_email))
        .route("/auth/check-username", get(auth::get_check_username))
        .route("/auth/login", post(auth::post_login))
        .route("/auth/logout", post(auth::post_logout))
        .route("/events/{event}/register", post(events::post_event_register))
        .route("/events/my-registrations", post(events::post_my_registrations));

    let optional_routes = Router::new()
        .route("/events", get(events::get))
        .route("/events/{event}", get(events::get_event))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            optional_authorize,
        ));

    let user_routes = Router::new()
        .route("/user", get(user::get))
        .route("/orgs", get(orgs::get).post(orgs::post))
        .route("/orgs/{organization}", get(orgs::get_organization_detail))
        .route(
            "/orgs/{organization}/registrations",
            get(orgs::get_organization_registrations),
        )
        .route("/access-requests", get(access::get).post(access::post))
        .route("/events", post(events::post))
        .route(
            "/events/{event}",
            patch(events::patch_event).delete(events::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            authorize,
        ));

    let admin_routes = Router::new()
        .route(
            "/orgs/{organization}",
            patch(orgs::patch_organization).delete(orgs::delete_organization),
        )
        .route(
            "/orgs/{organization}/verify",
            post(orgs::post_organization_verify),
        )
        .route("/admin/access-requests", get(access::get_admin))
        .route(
            "/admin/access-requests/{request}",
            post(access::post_admin_review),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            authorize,
        ));

    let api = Router::new()
        .merge(public_routes)
        .merge(optional_routes)
        .merge(user_routes)
        .merge(admin_routes);

    let origin = HeaderValue::from_str(state.cli.serve_url.trim_end_matches('/'))
        .context("Invalid serve url")?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", api)
        .fallback(handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

pub async fn serve_web(state: Arc<ServerState>) -> Result<()> {
    let server_url = format!("{}:{}", state.cli.ip, state.cli.port);
    let app = create_router(Arc::clone(&state))?;

    let listener = tokio::net::TcpListener::bind(&server_url)
        .await
        .with_context(|| format!("Failed to bind {}", server_url))?;

    info!("Listening on {}", server_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server stopped unexpectedly")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutting down");
}
