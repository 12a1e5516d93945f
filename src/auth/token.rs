//
//  open-toolchain-sdk
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Token Cache
//!
//! IAM-style authenticators exchange long-lived credentials for short-lived
//! bearer tokens. This module holds the cached token and guarantees that at
//! most one refresh runs per authenticator at any time.
//!
//! ## Refresh Window
//!
//! A token is refreshed once 80% of its lifetime has elapsed:
//!
//! ```text
//! issued ------------------------------ refresh_at ------ expiration
//!        |<------------- 80% ------------>|<--- 20% --->|
//! ```
//!
//! ## Single Flight
//!
//! Callers queue on an async mutex. The first caller through performs the
//! refresh while holding it. Callers that were already queued when that
//! refresh started do not start their own: they take the refreshed token, or
//! the same error if the refresh failed.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::common::{ErrorKind, Result, SdkError};

/// Lifetime assumed when the token service omits `expires_in`.
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Share of the lifetime kept in reserve before expiry.
const SAFETY_MARGIN: f64 = 0.2;

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseRaw {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expiration: Option<i64>,
}

/// A bearer token issued by the token service.
#[derive(Debug, Clone)]
pub struct IamToken {
    /// The bearer token sent in `Authorization` headers.
    pub access_token: String,

    /// Refresh token, when the service issues one.
    pub refresh_token: Option<String>,

    /// Usually `Bearer`.
    pub token_type: String,

    /// Lifetime in seconds as reported by the service.
    pub expires_in: i64,

    /// Unix timestamp at which the token stops working.
    pub expiration: i64,

    /// Unix timestamp after which the token is refreshed.
    pub refresh_at: i64,
}

impl IamToken {
    pub(crate) fn from_raw(raw: TokenResponseRaw, now: i64) -> Self {
        let expires_in = raw.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS).max(0);
        let expiration = raw.expiration.unwrap_or(now + expires_in);
        let margin = (expires_in as f64 * SAFETY_MARGIN) as i64;

        Self {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            token_type: raw.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in,
            expiration,
            refresh_at: expiration - margin,
        }
    }

    /// Whether the token is past its expiration.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expiration
    }

    /// Whether the token has entered its safety margin.
    pub fn needs_refresh(&self, now: i64) -> bool {
        now >= self.refresh_at
    }
}

#[derive(Debug, Default)]
struct TokenSlot {
    token: Option<IamToken>,
    generation: u64,
    last_error: Option<RefreshFailure>,
}

/// A failed refresh, kept so queued callers get the same error.
#[derive(Debug, Clone)]
struct RefreshFailure {
    kind: ErrorKind,
    message: String,
}

impl RefreshFailure {
    fn capture(err: &SdkError) -> Self {
        let message = match err {
            SdkError::Authentication(m) | SdkError::Config(m) | SdkError::Validation(m) => {
                m.clone()
            }
            other => other.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }

    /// Rebuilds the error. Transport errors cannot be cloned and come back
    /// as authentication failures carrying the original message.
    fn replay(&self) -> SdkError {
        match self.kind {
            ErrorKind::Config => SdkError::Config(self.message.clone()),
            ErrorKind::Validation => SdkError::Validation(self.message.clone()),
            _ => SdkError::Authentication(self.message.clone()),
        }
    }
}

/// Single-slot token cache with deduplicated refresh.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    generation: AtomicU64,
    slot: Mutex<TokenSlot>,
}

impl TokenCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns a valid access token, running `fetch` when a refresh is due.
    pub(crate) async fn access_token<F, Fut>(&self, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IamToken>>,
    {
        let seen = self.generation.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = slot.token.as_ref().filter(|t| !t.needs_refresh(now)) {
            return Ok(token.access_token.clone());
        }

        if slot.generation != seen {
            // A refresh finished while we were queued; share its outcome.
            if let Some(failure) = &slot.last_error {
                return Err(failure.replay());
            }
            if let Some(token) = slot.token.as_ref().filter(|t| !t.is_expired(now)) {
                return Ok(token.access_token.clone());
            }
        }

        debug!(generation = slot.generation, "Refreshing access token");
        let outcome = fetch().await;

        slot.generation += 1;
        self.generation.store(slot.generation, Ordering::Release);

        match outcome {
            Ok(token) => {
                let access_token = token.access_token.clone();
                slot.token = Some(token);
                slot.last_error = None;
                Ok(access_token)
            }
            Err(err) => {
                slot.last_error = Some(RefreshFailure::capture(&err));
                Err(err)
            }
        }
    }

    /// Drops the cached token so the next call refreshes.
    pub(crate) async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        slot.token = None;
    }
}
