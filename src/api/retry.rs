//
//  open-toolchain-sdk
//  api/retry.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Retry Policy
//!
//! Retries are opt-in through
//! [`OpenToolchainV1::enable_retries`](crate::OpenToolchainV1::enable_retries).
//!
//! ## Classification
//!
//! | Failure | Idempotent (GET, PUT, DELETE) | Non-idempotent (POST, PATCH) |
//! |---------|-------------------------------|------------------------------|
//! | connection refused / DNS | retry | retry |
//! | timeout, reset mid-request | retry | no |
//! | 429 | retry | retry |
//! | 500, 502, 503, 504 | retry | no |
//! | other 4xx / 5xx | no | no |
//!
//! ## Backoff
//!
//! `min(1s * 2^attempt, max_interval)` plus 0-25% jitter, kept within
//! `max_interval`. A `Retry-After` header given in seconds replaces the computed
//! delay, still capped at `max_interval`.

use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;

/// Retries used when `enable_retries` is called with `0`.
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Interval cap used when `enable_retries` is called with a zero duration.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);

/// First backoff delay before growth.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry settings held by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_retries: u32,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: DEFAULT_MAX_RETRIES,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl RetryPolicy {
    /// An enabled policy; zero values select the defaults.
    pub fn enabled(max_retries: u32, max_interval: Duration) -> Self {
        Self {
            enabled: true,
            max_retries: if max_retries == 0 {
                DEFAULT_MAX_RETRIES
            } else {
                max_retries
            },
            max_interval: if max_interval.is_zero() {
                DEFAULT_MAX_INTERVAL
            } else {
                max_interval
            },
        }
    }

    /// Number of retries allowed after the first attempt.
    pub fn retries_allowed(&self) -> u32 {
        if self.enabled {
            self.max_retries
        } else {
            0
        }
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint.min(self.max_interval);
        }
        calculate_backoff(attempt, self.max_interval, true)
    }
}

/// Exponential backoff with optional jitter, never exceeding `max`.
pub fn calculate_backoff(attempt: u32, max: Duration, jitter: bool) -> Duration {
    let factor = 2u32.saturating_pow(attempt.min(30));
    let duration = INITIAL_BACKOFF.saturating_mul(factor).min(max);

    let duration = if jitter {
        let jitter_factor = rand::rng().random_range(0.0..=0.25);
        duration + duration.mul_f64(jitter_factor)
    } else {
        duration
    };

    duration.min(max)
}

/// Whether a response status may be retried.
pub fn is_retryable_status(status: StatusCode, idempotent: bool) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    idempotent && RETRYABLE_STATUSES.contains(&status.as_u16())
}

/// Whether a transport failure may be retried.
///
/// Connection failures never reached the server, so they are safe for every
/// method. Anything else may have been partially processed.
pub fn is_retryable_transport(err: &reqwest::Error, idempotent: bool) -> bool {
    if err.is_builder() || err.is_redirect() || err.is_decode() {
        return false;
    }
    if err.is_connect() {
        return true;
    }
    idempotent && (err.is_timeout() || err.is_request() || err.is_body())
}

/// Parses a `Retry-After` header given in whole seconds.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
