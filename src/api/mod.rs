//
//  open-toolchain-sdk
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # API Layer
//!
//! This module provides the request/response machinery and the typed
//! operations of the Open Toolchain API.
//!
//! ## Architecture
//!
//! - [`client`]: HTTP envelope (request building, authentication, retries)
//! - [`context`]: cancellation scopes for `_with_context` operations
//! - [`retry`]: retry classification and backoff
//! - [`common`]: shared types (errors, error envelopes, typed responses)
//! - [`toolchains`]: toolchain options, models and operations
//! - [`service_instances`]: service instance options, models and operations
//! - [`tekton`]: Tekton pipeline and definition options, models and operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use open_toolchain::api::RequestContext;
//! use open_toolchain::{GetToolchainOptions, OpenToolchainV1};
//!
//! # async fn example(service: OpenToolchainV1) -> open_toolchain::Result<()> {
//! let ctx = RequestContext::with_timeout(Duration::from_secs(10));
//! let options = GetToolchainOptions::new("guid", "ibm:yp:us-south");
//! let response = service.get_toolchain_with_context(&ctx, &options).await?;
//! println!("HTTP {}", response.raw.status_code);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod context;
pub mod retry;
pub mod service_instances;
pub mod tekton;
pub mod toolchains;

pub use client::{DetailedResponse, RequestSpec, ServiceClient};
pub use common::{ApiResponse, CancelReason, ErrorEnvelope, ErrorKind, SdkError};
pub use context::RequestContext;
pub use retry::RetryPolicy;
