//! Refill countdown and pill supply math for list display.
//!
//! # Invariants
//! - Day counts round up, so a refill due later today reads as 1 day and
//!   an overdue refill reads as zero or negative.
//! - Supply is only reported when both counts are present and non-zero.

use crate::model::medication::parse_timestamp;
use chrono::{DateTime, Utc};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const SOON_THRESHOLD_DAYS: i64 = 7;
const CRITICAL_PERCENT: f64 = 20.0;
const LOW_PERCENT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillUrgency {
    /// Due within a week, or overdue.
    Soon,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyLevel {
    Critical,
    Low,
    Healthy,
}

/// Remaining pill inventory relative to a full prescription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillSupply {
    pub remaining: u32,
    pub total: u32,
    /// `remaining / total * 100`; may exceed 100 when over-counted.
    pub percentage: f64,
    pub level: SupplyLevel,
}

/// Whole days from `now` until `refill_at`, rounded up.
pub fn days_until(refill_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_ms = (refill_at - now).num_milliseconds();
    let days = diff_ms.div_euclid(DAY_MS);
    if diff_ms.rem_euclid(DAY_MS) == 0 {
        days
    } else {
        days + 1
    }
}

/// Days until a stored refill date; `None` when unset or unparseable.
pub fn days_until_refill(refill_date: Option<&str>, now: DateTime<Utc>) -> Option<i64> {
    refill_date
        .and_then(parse_timestamp)
        .map(|refill_at| days_until(refill_at, now))
}

pub fn refill_urgency(days: i64) -> RefillUrgency {
    if days <= SOON_THRESHOLD_DAYS {
        RefillUrgency::Soon
    } else {
        RefillUrgency::Scheduled
    }
}

/// Computes supply state, or `None` unless both counts are set and non-zero.
pub fn pill_supply(remaining: Option<u32>, total: Option<u32>) -> Option<PillSupply> {
    let (remaining, total) = match (remaining, total) {
        (Some(remaining), Some(total)) if remaining > 0 && total > 0 => (remaining, total),
        _ => return None,
    };
    let percentage = f64::from(remaining) / f64::from(total) * 100.0;
    let level = if percentage <= CRITICAL_PERCENT {
        SupplyLevel::Critical
    } else if percentage <= LOW_PERCENT {
        SupplyLevel::Low
    } else {
        SupplyLevel::Healthy
    };
    Some(PillSupply {
        remaining,
        total,
        percentage,
        level,
    })
}
