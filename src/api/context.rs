//
//  open-toolchain-sdk
//  api/context.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Cancellation Scopes
//!
//! Every operation has a `_with_context` variant taking a [`RequestContext`].
//! A context combines an optional deadline with an optional
//! [`CancellationToken`]; whichever fires first stops the call, including
//! token refreshes and retry backoff waits.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use open_toolchain::api::RequestContext;
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let ctx = RequestContext::with_timeout(Duration::from_secs(5))
//!     .and_cancellation(token.clone());
//!
//! // Elsewhere: token.cancel();
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::common::{CancelReason, Result, SdkError};

/// Cancellation scope for a single SDK call.
///
/// The default context never fires.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    token: Option<CancellationToken>,
}

impl RequestContext {
    /// A context that never fires.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: None,
        }
    }

    /// A context that fires when `token` is cancelled.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            deadline: None,
            token: Some(token),
        }
    }

    /// Adds a cancellation token to this context.
    pub fn and_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context has fired, if it has.
    pub fn fired(&self) -> Option<CancelReason> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Some(CancelReason::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fails with [`SdkError::Cancelled`] if the context has already fired.
    pub fn check(&self) -> Result<()> {
        match self.fired() {
            Some(reason) => Err(SdkError::Cancelled(reason)),
            None => Ok(()),
        }
    }

    /// Resolves when the context fires. Pending forever for [`background`](Self::background).
    pub async fn done(&self) -> CancelReason {
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => CancelReason::Canceled,
            _ = expired => CancelReason::DeadlineExceeded,
        }
    }

    /// Runs `fut` inside this scope.
    ///
    /// The future is dropped as soon as the context fires, so any partially read
    /// response is discarded.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.done() => Err(SdkError::Cancelled(reason)),
            result = fut => result,
        }
    }

    /// Sleeps for `duration` unless the context fires first.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}
