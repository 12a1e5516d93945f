//
//  open-toolchain-sdk
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Common API Types for the Open Toolchain service
//!
//! This module provides the types shared by every operation: the unified
//! [`SdkError`], the [`ApiResponse`] wrapper returned by operations that decode a
//! body, and the [`ErrorEnvelope`] the service uses to describe failures.
//!
//! # Example
//!
//! ```rust
//! use open_toolchain::api::common::{ErrorKind, SdkError};
//!
//! fn describe(err: &SdkError) -> &'static str {
//!     match err.kind() {
//!         ErrorKind::Validation => "fix the request options",
//!         ErrorKind::Http => "the service rejected the request",
//!         ErrorKind::Cancelled => "the caller gave up",
//!         _ => "something else went wrong",
//!     }
//! }
//!
//! let err = SdkError::Validation("GUID is required".to_string());
//! assert_eq!(describe(&err), "fix the request options");
//! ```
//!
//! # Notes
//!
//! - Configuration and validation errors never carry a [`DetailedResponse`]
//! - HTTP and decode errors always carry one, see [`SdkError::response`]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::client::DetailedResponse;

/// Message carried by [`SdkError::ServiceUrlMissing`].
pub const ERRORMSG_SERVICE_URL_MISSING: &str = "service URL missing";

/// Convenience alias used by every fallible SDK function.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Why a [`RequestContext`](crate::api::RequestContext) stopped a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The scope's deadline elapsed.
    DeadlineExceeded,
    /// The scope was cancelled explicitly.
    Canceled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
            Self::Canceled => f.write_str("context canceled"),
        }
    }
}

/// Coarse classification of an [`SdkError`].
///
/// | Kind | Raised by | Carries a response |
/// |------|-----------|--------------------|
/// | `Config` | service construction, URL and region lookup | never |
/// | `Validation` | options checks, missing service URL | never |
/// | `Authentication` | token acquisition | never |
/// | `Transport` | connection, TLS and timeout failures | never |
/// | `Http` | non-2xx status | always |
/// | `Decode` | unparseable success body | always |
/// | `Cancelled` | the caller's scope fired | never |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Validation,
    Authentication,
    Transport,
    Http,
    Decode,
    Cancelled,
}

/// Unified error type for all Open Toolchain SDK operations.
///
/// # Example
///
/// ```rust
/// use open_toolchain::api::common::SdkError;
///
/// let err = SdkError::RegionNotFound("mars-north".to_string());
/// assert!(err.to_string().contains("region not found"));
/// assert!(err.response().is_none());
/// ```
#[derive(Error, Debug)]
pub enum SdkError {
    /// The service configuration is unusable (bad property values, missing
    /// credentials, file problems).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A URL could not be parsed as an absolute URL.
    #[error("invalid service URL: {0}")]
    InvalidServiceUrl(String),

    /// The configured authentication type is not one the SDK knows.
    #[error("unrecognized authentication kind: {0}")]
    UnknownAuthType(String),

    /// No regional endpoint is registered for this region.
    #[error("region not found: {0}")]
    RegionNotFound(String),

    /// The options passed to an operation are incomplete or invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The service URL is empty at the time the request is prepared.
    #[error("{}", ERRORMSG_SERVICE_URL_MISSING)]
    ServiceUrlMissing,

    /// A bearer token could not be obtained from the token service.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A network-level error occurred during the request.
    ///
    /// This covers connection failures, timeouts, DNS resolution errors and TLS
    /// handshake failures.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Http {
        /// Human-readable message extracted from the body when possible.
        message: String,
        /// Structured error body, when the service sent one.
        envelope: Option<ErrorEnvelope>,
        /// The raw response for inspection.
        response: Box<DetailedResponse>,
    },

    /// A success response arrived but its body could not be decoded.
    #[error("response processing error: {message}")]
    Decode {
        /// The decoder's complaint.
        message: String,
        /// The raw response for inspection.
        response: Box<DetailedResponse>,
    },

    /// The caller's cancellation scope fired before the call completed.
    #[error("{0}")]
    Cancelled(CancelReason),
}

impl SdkError {
    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::InvalidServiceUrl(_)
            | Self::UnknownAuthType(_)
            | Self::RegionNotFound(_) => ErrorKind::Config,
            Self::Validation(_) | Self::ServiceUrlMissing => ErrorKind::Validation,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Http { .. } => ErrorKind::Http,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Returns the raw response attached to this error, if any.
    pub fn response(&self) -> Option<&DetailedResponse> {
        match self {
            Self::Http { response, .. } | Self::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns the HTTP status code for [`SdkError::Http`] errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { response, .. } => Some(response.status_code),
            _ => None,
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::Validation(format!("{field} is required and must not be empty"))
    }
}

/// Returns the value of a required option, rejecting absent and empty values.
pub(crate) fn require<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SdkError::required(field))
}

/// Serde helper for nested objects: true for `None` and for an object whose
/// fields are all absent. Not for scalars, where the default is a real value.
pub(crate) fn is_absent<T: Default + PartialEq>(value: &Option<&T>) -> bool {
    value.map_or(true, |inner| *inner == T::default())
}

/// [`is_absent`] for owned fields of the models themselves.
pub(crate) fn is_empty_object<T: Default + PartialEq>(value: &Option<T>) -> bool {
    value.as_ref().map_or(true, |inner| *inner == T::default())
}

/// A single entry in the service's `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub more_info: Option<String>,
}

/// Structured error body returned by the service.
///
/// Several shapes are in circulation:
///
/// ```json
/// {"errors": [{"code": "not_found", "message": "Toolchain not found"}], "trace": "abc"}
/// {"error": "Toolchain not found"}
/// {"message": "Toolchain not found"}
/// {"errorMessage": "Toolchain not found"}
/// ```
///
/// [`ErrorEnvelope::message`] picks the first message present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Option<Vec<ErrorDetail>>,

    #[serde(default)]
    pub trace: Option<String>,

    #[serde(default)]
    pub error: Option<serde_json::Value>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default, rename = "errorMessage")]
    pub error_message: Option<String>,

    #[serde(default)]
    pub status_code: Option<u16>,
}

impl ErrorEnvelope {
    /// Extracts the most specific human-readable message in the envelope.
    pub fn message(&self) -> Option<String> {
        if let Some(message) = self
            .errors
            .as_ref()
            .and_then(|errors| errors.first())
            .and_then(|e| e.message.clone())
        {
            return Some(message);
        }

        match &self.error {
            Some(serde_json::Value::String(s)) => return Some(s.clone()),
            Some(serde_json::Value::Object(obj)) => {
                if let Some(m) = obj.get("message").and_then(|m| m.as_str()) {
                    return Some(m.to_string());
                }
            }
            _ => {}
        }

        self.message.clone().or_else(|| self.error_message.clone())
    }
}

/// Typed result of an operation together with the raw response.
///
/// `result` is `None` when the service answered with a success status but no
/// body; callers must handle that case.
///
/// # Example
///
/// ```rust,no_run
/// use open_toolchain::{GetToolchainOptions, OpenToolchainV1};
///
/// # async fn example(service: OpenToolchainV1) -> open_toolchain::Result<()> {
/// let options = GetToolchainOptions::new("my-guid", "ibm:yp:us-south");
/// let response = service.get_toolchain(&options).await?;
/// println!("status {}", response.raw.status_code);
/// if let Some(toolchain) = response.result {
///     println!("toolchain {:?}", toolchain.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// The decoded body, if the service sent one.
    pub result: Option<T>,

    /// Status, headers and body bytes as received.
    pub raw: DetailedResponse,
}
