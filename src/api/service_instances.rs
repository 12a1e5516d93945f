//
//  open-toolchain-sdk
//  api/service_instances.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Service instance API types and operations.
//!
//! A service instance is a tool (Slack, a Git repository, a pipeline, ...)
//! bound to a toolchain. Its settings travel in [`ServiceInstanceParameters`],
//! a flat bag of optional fields; which ones matter depends on the service.
//!
//! # Endpoints
//!
//! | Operation | Method | Path | Success |
//! |-----------|--------|------|---------|
//! | [`create_service_instance`](OpenToolchainV1::create_service_instance) | POST | `/devops/service_instances` | 200 |
//! | [`get_service_instance`](OpenToolchainV1::get_service_instance) | GET | `/devops/service_instances/{guid}` | 200 |
//! | [`patch_service_instance`](OpenToolchainV1::patch_service_instance) | PATCH | `/devops/service_instances/{guid}` | 200 |
//! | [`delete_service_instance`](OpenToolchainV1::delete_service_instance) | DELETE | `/devops/service_instances/{guid}` | 204 |
//!
//! Request bodies carry `toolchainId`, `serviceId` and `parameters`; the
//! parameters themselves are snake_case.
//!
//! # Example
//!
//! ```rust,no_run
//! use open_toolchain::{CreateServiceInstanceOptions, OpenToolchainV1, ServiceInstanceParameters};
//!
//! # async fn example(service: OpenToolchainV1) -> open_toolchain::Result<()> {
//! let slack = ServiceInstanceParameters {
//!     api_token: Some("xoxp-...".into()),
//!     channel_name: Some("#deploys".into()),
//!     team_url: Some("my-team".into()),
//!     ..Default::default()
//! };
//! let options = CreateServiceInstanceOptions::new("ibm:yp:us-south")
//!     .toolchain_id("toolchain-guid")
//!     .service_id("slack")
//!     .parameters(slack);
//! let created = service.create_service_instance(&options).await?;
//! println!("{:?}", created.result.and_then(|r| r.status));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{decode_response, DetailedResponse, RequestSpec};
use crate::api::common::{is_absent, require, ApiResponse, Result};
use crate::api::context::RequestContext;
use crate::OpenToolchainV1;

/// Settings of a service instance.
///
/// Every field is optional and only present fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_repo: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_traceability: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_root_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_crn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Body shared by create and patch.
#[derive(Debug, Serialize)]
struct ServiceInstanceBody<'a> {
    #[serde(rename = "toolchainId", skip_serializing_if = "Option::is_none")]
    toolchain_id: Option<&'a str>,

    #[serde(rename = "serviceId", skip_serializing_if = "Option::is_none")]
    service_id: Option<&'a str>,

    #[serde(skip_serializing_if = "is_absent")]
    parameters: Option<&'a ServiceInstanceParameters>,
}

/// Options for [`OpenToolchainV1::create_service_instance`].
#[derive(Debug, Clone, Default)]
pub struct CreateServiceInstanceOptions {
    /// Environment ID. Required.
    pub env_id: Option<String>,

    /// Toolchain to bind the instance to.
    pub toolchain_id: Option<String>,

    /// Service type, e.g. `slack` or `githubconsolidated`.
    pub service_id: Option<String>,

    pub parameters: Option<ServiceInstanceParameters>,

    pub headers: HashMap<String, String>,
}

impl CreateServiceInstanceOptions {
    pub fn new(env_id: impl Into<String>) -> Self {
        Self {
            env_id: Some(env_id.into()),
            ..Default::default()
        }
    }

    pub fn toolchain_id(mut self, id: impl Into<String>) -> Self {
        self.toolchain_id = Some(id.into());
        self
    }

    pub fn service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }

    pub fn parameters(mut self, parameters: ServiceInstanceParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require("env_id", &self.env_id).map(|_| ())
    }
}

/// Options for [`OpenToolchainV1::get_service_instance`].
#[derive(Debug, Clone, Default)]
pub struct GetServiceInstanceOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,

    /// Owning toolchain, sent as the `toolchainId` query parameter. Required.
    pub toolchain_id: Option<String>,

    pub headers: HashMap<String, String>,
}

impl GetServiceInstanceOptions {
    pub fn new(
        guid: impl Into<String>,
        env_id: impl Into<String>,
        toolchain_id: impl Into<String>,
    ) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
            toolchain_id: Some(toolchain_id.into()),
            headers: HashMap::new(),
        }
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require("guid", &self.guid)?;
        require("env_id", &self.env_id)?;
        require("toolchain_id", &self.toolchain_id)?;
        Ok(())
    }
}

/// Options for [`OpenToolchainV1::patch_service_instance`].
#[derive(Debug, Clone, Default)]
pub struct PatchServiceInstanceOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,
    pub toolchain_id: Option<String>,
    pub service_id: Option<String>,
    pub parameters: Option<ServiceInstanceParameters>,
    pub headers: HashMap<String, String>,
}

impl PatchServiceInstanceOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
            ..Default::default()
        }
    }

    pub fn toolchain_id(mut self, id: impl Into<String>) -> Self {
        self.toolchain_id = Some(id.into());
        self
    }

    pub fn service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }

    pub fn parameters(mut self, parameters: ServiceInstanceParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require("guid", &self.guid)?;
        require("env_id", &self.env_id)?;
        Ok(())
    }
}

/// Options for [`OpenToolchainV1::delete_service_instance`].
#[derive(Debug, Clone, Default)]
pub struct DeleteServiceInstanceOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,

    /// Owning toolchain, sent as `toolchainId` when set.
    pub toolchain_id: Option<String>,

    pub headers: HashMap<String, String>,
}

impl DeleteServiceInstanceOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
            ..Default::default()
        }
    }

    pub fn toolchain_id(mut self, id: impl Into<String>) -> Self {
        self.toolchain_id = Some(id.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require("guid", &self.guid)?;
        require("env_id", &self.env_id)?;
        Ok(())
    }
}

/// Response of [`OpenToolchainV1::create_service_instance`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A service instance as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_id: Option<String>,

    /// Free-form settings as stored by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, serde_json::Value>>,
}

/// Response of [`OpenToolchainV1::get_service_instance`].
///
/// The service wraps the instance under `serviceInstance`; bare instances are
/// accepted too and end up in the same field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceInstanceEnvelope {
    #[serde(rename = "serviceInstance", skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<ServiceInstance>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceInstanceShape {
    Wrapped {
        #[serde(rename = "serviceInstance")]
        service_instance: ServiceInstance,
    },
    Bare(ServiceInstance),
}

impl<'de> Deserialize<'de> for ServiceInstanceEnvelope {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let service_instance = match ServiceInstanceShape::deserialize(deserializer)? {
            ServiceInstanceShape::Wrapped { service_instance } => service_instance,
            ServiceInstanceShape::Bare(instance) => instance,
        };
        Ok(Self {
            service_instance: Some(service_instance),
        })
    }
}

impl OpenToolchainV1 {
    /// Binds a new service instance to a toolchain.
    pub async fn create_service_instance(
        &self,
        options: &CreateServiceInstanceOptions,
    ) -> Result<ApiResponse<CreateServiceInstanceResponse>> {
        self.create_service_instance_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn create_service_instance_with_context(
        &self,
        ctx: &RequestContext,
        options: &CreateServiceInstanceOptions,
    ) -> Result<ApiResponse<CreateServiceInstanceResponse>> {
        options.validate()?;
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let body = ServiceInstanceBody {
            toolchain_id: options.toolchain_id.as_deref(),
            service_id: options.service_id.as_deref(),
            parameters: options.parameters.as_ref(),
        };
        let spec = RequestSpec::new(Method::POST, "CreateServiceInstance")
            .path(&["devops", "service_instances"])
            .query("env_id", env_id)
            .headers(&options.headers)
            .accept_json()
            .json_body(&body)?
            .success_codes(&[200]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }

    /// Returns a service instance of a toolchain.
    pub async fn get_service_instance(
        &self,
        options: &GetServiceInstanceOptions,
    ) -> Result<ApiResponse<ServiceInstanceEnvelope>> {
        self.get_service_instance_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn get_service_instance_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetServiceInstanceOptions,
    ) -> Result<ApiResponse<ServiceInstanceEnvelope>> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();
        let toolchain_id = options.toolchain_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::GET, "GetServiceInstance")
            .path(&["devops", "service_instances"])
            .path_param(guid)
            .query("env_id", env_id)
            .query("toolchainId", toolchain_id)
            .headers(&options.headers)
            .accept_json()
            .success_codes(&[200]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }

    /// Updates a service instance.
    pub async fn patch_service_instance(
        &self,
        options: &PatchServiceInstanceOptions,
    ) -> Result<DetailedResponse> {
        self.patch_service_instance_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn patch_service_instance_with_context(
        &self,
        ctx: &RequestContext,
        options: &PatchServiceInstanceOptions,
    ) -> Result<DetailedResponse> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let body = ServiceInstanceBody {
            toolchain_id: options.toolchain_id.as_deref(),
            service_id: options.service_id.as_deref(),
            parameters: options.parameters.as_ref(),
        };
        let spec = RequestSpec::new(Method::PATCH, "PatchServiceInstance")
            .path(&["devops", "service_instances"])
            .path_param(guid)
            .query("env_id", env_id)
            .headers(&options.headers)
            .json_body(&body)?
            .success_codes(&[200]);

        self.client().execute(ctx, spec).await
    }

    /// Unbinds and deletes a service instance.
    pub async fn delete_service_instance(
        &self,
        options: &DeleteServiceInstanceOptions,
    ) -> Result<DetailedResponse> {
        self.delete_service_instance_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn delete_service_instance_with_context(
        &self,
        ctx: &RequestContext,
        options: &DeleteServiceInstanceOptions,
    ) -> Result<DetailedResponse> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::DELETE, "DeleteServiceInstance")
            .path(&["devops", "service_instances"])
            .path_param(guid)
            .query("env_id", env_id)
            .query_opt("toolchainId", options.toolchain_id.as_deref())
            .headers(&options.headers)
            .success_codes(&[204]);

        self.client().execute(ctx, spec).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_body_omits_empty_parameters() {
        let empty = ServiceInstanceParameters::default();
        let body = ServiceInstanceBody {
            toolchain_id: Some("t"),
            service_id: None,
            parameters: Some(&empty),
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"toolchainId": "t"}));
    }

    #[test]
    fn test_body_contains_exactly_present_fields() {
        let parameters = ServiceInstanceParameters {
            name: Some("repo".into()),
            private_repo: Some(false),
            ..Default::default()
        };
        let body = ServiceInstanceBody {
            toolchain_id: None,
            service_id: Some("githubconsolidated"),
            parameters: Some(&parameters),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "serviceId": "githubconsolidated",
                "parameters": {"name": "repo", "private_repo": false}
            })
        );
    }

    #[test]
    fn test_envelope_accepts_wrapped_and_bare() {
        let wrapped: ServiceInstanceEnvelope = serde_json::from_str(
            r#"{"serviceInstance": {"instance_id": "i1", "parameters": {"k": "v"}}}"#,
        )
        .unwrap();
        assert_eq!(
            wrapped.service_instance.unwrap().instance_id.as_deref(),
            Some("i1")
        );

        let bare: ServiceInstanceEnvelope =
            serde_json::from_str(r#"{"instance_id": "i2", "service_id": "slack"}"#).unwrap();
        let instance = bare.service_instance.unwrap();
        assert_eq!(instance.instance_id.as_deref(), Some("i2"));
        assert_eq!(instance.service_id.as_deref(), Some("slack"));
    }

    #[test]
    fn test_get_requires_toolchain_id() {
        let options = GetServiceInstanceOptions {
            guid: Some("g".into()),
            env_id: Some("ibm:yp:us-south".into()),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("toolchain_id"));
    }
}
