/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, NaiveDateTime};
use std::ops::RangeInclusive;
use std::sync::LazyLock;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

pub static NULL_TIME: LazyLock<NaiveDateTime> =
    LazyLock::new(|| DateTime::from_timestamp(0, 0).unwrap_or_default().naive_utc());

pub const JWT_LIFETIME_HOURS: i64 = 24;
pub const VERIFICATION_TOKEN_LIFETIME_HOURS: i64 = 24;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const PHONE_MAX_LENGTH: usize = 15;
pub const ORGANIZATION_NAME_MAX_LENGTH: usize = 150;
pub const STREET_MAX_LENGTH: usize = 100;
pub const CITY_MAX_LENGTH: usize = 100;
pub const POST_CODE_LENGTH: usize = 5;
pub const EVENT_TITLE_MAX_LENGTH: usize = 100;
pub const EVENT_TEXT_MAX_LENGTH: usize = 200;
pub const PARTICIPANT_NAME_MAX_LENGTH: usize = 100;

/// Date format used in mails listing event registrations.
pub const EVENT_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";
