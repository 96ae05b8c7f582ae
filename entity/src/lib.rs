/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod event;
pub mod event_registration;
pub mod organization;
pub mod organization_access_request;
pub mod organization_member;
pub mod user;
pub mod user_profile;
