//
//  open-toolchain-sdk
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Open Toolchain SDK
//!
//! An async client for the IBM Cloud Open Toolchain API: toolchains, the
//! service instances bound to them, and their Tekton pipelines.
//!
//! ## Features
//!
//! - **Typed operations**: one async method per endpoint, each with a
//!   `_with_context` variant for deadlines and cancellation
//! - **Raw access**: every result comes with the [`DetailedResponse`]
//! - **Authentication**: no auth, basic, bearer token, IAM API key and
//!   container (trusted profile) authenticators
//! - **External configuration**: `OPEN_TOOLCHAIN_*` environment variables and
//!   `ibm-credentials.env` files
//! - **Opt-in retries**: exponential backoff with jitter that honors
//!   `Retry-After`
//!
//! ## Module Structure
//!
//! - [`api`]: operations, models and the HTTP envelope
//! - [`auth`]: authenticators and token caching
//! - [`config`]: external configuration and regional endpoints
//! - [`service`]: the [`OpenToolchainV1`] facade
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use open_toolchain::auth::Authenticator;
//! use open_toolchain::{GetToolchainOptions, OpenToolchainV1, ServiceOptions};
//!
//! # async fn example() -> open_toolchain::Result<()> {
//! let service = OpenToolchainV1::new(
//!     ServiceOptions::new()
//!         .url(OpenToolchainV1::get_service_url_for_region("us-south")?)
//!         .authenticator(Authenticator::iam("my-api-key")?),
//! )?;
//! service.enable_retries(3, Duration::from_secs(10));
//!
//! let response = service
//!     .get_toolchain(&GetToolchainOptions::new("toolchain-guid", "ibm:yp:us-south"))
//!     .await?;
//! if let Some(toolchain) = response.result {
//!     println!("{:?}", toolchain.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! | Kind | Typical cause | Raw response |
//! |------|---------------|--------------|
//! | Config | bad URL, unknown auth type, unknown region | no |
//! | Validation | missing `guid` or `env_id`, empty service URL | no |
//! | Authentication | IAM token exchange failed | no |
//! | Transport | connection refused, TLS failure | no |
//! | Http | non-2xx status | yes |
//! | Decode | unparseable success body | yes |
//! | Cancelled | deadline exceeded or token cancelled | no |

/// Operations, models and the HTTP envelope.
pub mod api;

/// Authenticators and token caching.
pub mod auth;

/// External configuration and regional endpoints.
pub mod config;

/// The service facade.
pub mod service;

pub use api::common::{ApiResponse, ErrorKind, Result, SdkError};
pub use api::context::RequestContext;
pub use api::client::DetailedResponse;
pub use api::service_instances::{
    CreateServiceInstanceOptions, CreateServiceInstanceResponse, DeleteServiceInstanceOptions,
    GetServiceInstanceOptions, PatchServiceInstanceOptions, ServiceInstance,
    ServiceInstanceEnvelope, ServiceInstanceParameters,
};
pub use api::tekton::{
    CreateTektonPipelineDefinitionOptions, GetTektonPipelineDefinitionOptions,
    GetTektonPipelineOptions, PatchTektonPipelineOptions, PipelineDefinition, TektonPipeline,
    TektonPipelineDefinition,
};
pub use api::toolchains::{
    CreateToolchainOptions, DeleteToolchainOptions, GetToolchainOptions, PatchToolchainOptions,
    Toolchain,
};
pub use auth::Authenticator;
pub use service::{OpenToolchainV1, ServiceOptions};

/// Library version, derived from Cargo.toml at compile time.
///
/// ```rust
/// use open_toolchain::VERSION;
///
/// assert!(!VERSION.is_empty());
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name used for external configuration and SDK analytics.
pub const DEFAULT_SERVICE_NAME: &str = "open_toolchain";

/// Base URL used when none is configured.
pub const DEFAULT_SERVICE_URL: &str = "https://cloud.ibm.com";
