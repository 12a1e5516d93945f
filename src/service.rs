//
//  open-toolchain-sdk
//  service.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Service Facade
//!
//! [`OpenToolchainV1`] is the entry point of the SDK. It owns the base URL,
//! the retry policy and the default headers, and shares its authenticator
//! with every clone.
//!
//! ## Construction
//!
//! ```rust,no_run
//! use open_toolchain::auth::Authenticator;
//! use open_toolchain::{OpenToolchainV1, ServiceOptions};
//!
//! // Explicit options
//! let service = OpenToolchainV1::new(
//!     ServiceOptions::new()
//!         .url("https://devops-api.us-south.devops.cloud.ibm.com")
//!         .authenticator(Authenticator::iam("my-api-key")?),
//! )?;
//!
//! // OPEN_TOOLCHAIN_* environment variables and ibm-credentials.env
//! let service = OpenToolchainV1::new_using_external_config(ServiceOptions::new())?;
//! # Ok::<(), open_toolchain::SdkError>(())
//! ```
//!
//! ## Thread Safety
//!
//! The service is `Send + Sync`. Settings changed through `&self` methods
//! apply to requests prepared afterwards; a request already in flight keeps
//! the settings it started with.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::info;

use crate::api::client::ServiceClient;
use crate::api::common::{Result, SdkError};
use crate::api::retry::RetryPolicy;
use crate::auth::Authenticator;
use crate::config::{self, ServiceProperties};
use crate::{DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_URL};

/// Options for constructing an [`OpenToolchainV1`].
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    /// Base URL; [`DEFAULT_SERVICE_URL`] when omitted.
    pub url: Option<String>,

    /// Authenticator; required by [`OpenToolchainV1::new`], resolved from
    /// external configuration by [`OpenToolchainV1::new_using_external_config`]
    /// when omitted.
    pub authenticator: Option<Arc<Authenticator>>,

    /// Name used to look up external configuration; `open_toolchain` when
    /// omitted.
    pub service_name: Option<String>,
}

impl ServiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Accepts an owned [`Authenticator`] or an existing `Arc`.
    pub fn authenticator(mut self, authenticator: impl Into<Arc<Authenticator>>) -> Self {
        self.authenticator = Some(authenticator.into());
        self
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }
}

/// Client for the Open Toolchain API.
///
/// Operations are grouped by resource:
///
/// - toolchains: [`create_toolchain`](Self::create_toolchain),
///   [`get_toolchain`](Self::get_toolchain),
///   [`patch_toolchain`](Self::patch_toolchain),
///   [`delete_toolchain`](Self::delete_toolchain)
/// - service instances: [`create_service_instance`](Self::create_service_instance),
///   [`get_service_instance`](Self::get_service_instance),
///   [`patch_service_instance`](Self::patch_service_instance),
///   [`delete_service_instance`](Self::delete_service_instance)
/// - Tekton pipelines: [`get_tekton_pipeline`](Self::get_tekton_pipeline),
///   [`patch_tekton_pipeline`](Self::patch_tekton_pipeline),
///   [`get_tekton_pipeline_definition`](Self::get_tekton_pipeline_definition),
///   [`create_tekton_pipeline_definition`](Self::create_tekton_pipeline_definition)
///
/// Cloning yields an independent service (URL, retry policy and headers are
/// copied) that shares the authenticator and the connection pool.
#[derive(Debug, Clone)]
pub struct OpenToolchainV1 {
    client: ServiceClient,
}

impl OpenToolchainV1 {
    /// Creates a service from explicit options.
    ///
    /// # Errors
    ///
    /// - [`SdkError::Config`] when no authenticator is given
    /// - [`SdkError::InvalidServiceUrl`] when the URL is malformed
    pub fn new(options: ServiceOptions) -> Result<Self> {
        let authenticator = options
            .authenticator
            .ok_or_else(|| SdkError::Config("an authenticator is required".into()))?;
        let url = options
            .url
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

        Ok(Self {
            client: ServiceClient::new(&url, authenticator)?,
        })
    }

    /// Creates a service from external configuration.
    ///
    /// Properties are read from the environment and the credentials file (see
    /// [`config`]). An authenticator in `options` is used as is; otherwise one
    /// is built from the properties. An explicit URL in `options` overrides
    /// the configured one.
    ///
    /// # Errors
    ///
    /// - [`SdkError::UnknownAuthType`] for an unrecognized `AUTH_TYPE`
    /// - [`SdkError::Config`] for missing credentials or bad property values
    /// - [`SdkError::InvalidServiceUrl`] when a URL is malformed
    pub fn new_using_external_config(options: ServiceOptions) -> Result<Self> {
        let service_name = options
            .service_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
        let mut props = config::get_service_properties(&service_name)?;
        if options.url.is_some() {
            props.remove(config::PROPNAME_SVC_URL);
        }

        let authenticator = match options.authenticator {
            Some(authenticator) => authenticator,
            None => Arc::new(config::authenticator_from_properties(&props)?),
        };

        let service = Self::new(ServiceOptions {
            url: None,
            authenticator: Some(authenticator),
            service_name: None,
        })?;
        service.configure_service(&props)?;
        if let Some(url) = &options.url {
            service.set_service_url(url)?;
        }

        info!(
            service = %service_name,
            url = %service.service_url(),
            auth = %service.authenticator().auth_type(),
            retries = service.retry_policy().enabled,
            "Configured service from external configuration"
        );
        Ok(service)
    }

    /// Applies URL, TLS and retry settings from `props`.
    ///
    /// Properties that are absent leave the current setting untouched.
    pub fn configure_service(&self, props: &ServiceProperties) -> Result<()> {
        if let Some(url) = props.url() {
            self.set_service_url(url)?;
        }
        if props.flag(config::PROPNAME_SVC_DISABLE_SSL) {
            self.disable_ssl_verification()?;
        }
        if props.flag(config::PROPNAME_SVC_ENABLE_RETRIES) {
            let max_retries = props
                .parse_u32(config::PROPNAME_SVC_MAX_RETRIES)?
                .unwrap_or(0);
            let max_interval = props
                .parse_seconds(config::PROPNAME_SVC_RETRY_INTERVAL)?
                .unwrap_or(Duration::ZERO);
            self.enable_retries(max_retries, max_interval);
        }
        Ok(())
    }

    /// Looks up the base URL of the service in `region`.
    pub fn get_service_url_for_region(region: &str) -> Result<String> {
        config::get_service_url_for_region(region)
    }

    /// Validates and stores a new base URL. An empty URL is accepted, but
    /// operations fail until a real one is set.
    pub fn set_service_url(&self, url: &str) -> Result<()> {
        self.client.set_service_url(url)
    }

    pub fn service_url(&self) -> String {
        self.client.service_url()
    }

    /// Turns on automatic retries.
    ///
    /// `0` and `Duration::ZERO` select the defaults (4 retries, 30 s cap).
    pub fn enable_retries(&self, max_retries: u32, max_interval: Duration) {
        self.client
            .set_retry_policy(RetryPolicy::enabled(max_retries, max_interval));
    }

    pub fn disable_retries(&self) {
        self.client.set_retry_policy(RetryPolicy::default());
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.client.retry_policy()
    }

    /// The authenticator shared by this service and its clones.
    pub fn authenticator(&self) -> &Arc<Authenticator> {
        self.client.authenticator()
    }

    /// Replaces the headers sent with every request.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Validation`] for names or values that are not valid
    /// HTTP header text.
    pub fn set_default_headers(&self, headers: &HashMap<String, String>) -> Result<()> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SdkError::Validation(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SdkError::Validation(format!("invalid header value '{value}': {e}")))?;
            map.insert(name, value);
        }
        self.client.set_default_headers(map);
        Ok(())
    }

    pub fn default_headers(&self) -> HeaderMap {
        self.client.default_headers()
    }

    /// Stops verifying server certificates for this service.
    pub fn disable_ssl_verification(&self) -> Result<()> {
        self.client.disable_ssl_verification()
    }

    pub fn ssl_verification_disabled(&self) -> bool {
        self.client.ssl_verification_disabled()
    }

    pub(crate) fn client(&self) -> &ServiceClient {
        &self.client
    }
}
