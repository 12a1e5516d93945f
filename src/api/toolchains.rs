//
//  open-toolchain-sdk
//  api/toolchains.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Toolchain API types and operations.
//!
//! A toolchain is a named grouping of DevOps service instances owned by a
//! tenant. This module provides the options for creating, reading, updating
//! and deleting toolchains, and the [`Toolchain`] model the service returns.
//!
//! # Endpoints
//!
//! | Operation | Method | Path | Success |
//! |-----------|--------|------|---------|
//! | [`create_toolchain`](OpenToolchainV1::create_toolchain) | POST | `/devops/setup/deploy` | 201 |
//! | [`get_toolchain`](OpenToolchainV1::get_toolchain) | GET | `/devops/toolchains/{guid}` | 200 |
//! | [`delete_toolchain`](OpenToolchainV1::delete_toolchain) | DELETE | `/devops/toolchains/{guid}` | 200 |
//! | [`patch_toolchain`](OpenToolchainV1::patch_toolchain) | PATCH | `/devops/toolchains/{guid}` | 204 |
//!
//! Wire field names are snake_case.
//!
//! # Example
//!
//! ```rust,no_run
//! use open_toolchain::{GetToolchainOptions, OpenToolchainV1, PatchToolchainOptions};
//!
//! # async fn example(service: OpenToolchainV1) -> open_toolchain::Result<()> {
//! let response = service
//!     .get_toolchain(&GetToolchainOptions::new("guid", "ibm:yp:us-south"))
//!     .await?;
//! if let Some(toolchain) = response.result {
//!     println!("{:?} has {} services", toolchain.name, toolchain.services.unwrap_or_default().len());
//! }
//!
//! let rename = PatchToolchainOptions::new("guid", "ibm:yp:us-south").name("renamed");
//! service.patch_toolchain(&rename).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{decode_response, DetailedResponse, RequestSpec};
use crate::api::common::{is_empty_object, require, ApiResponse, Result};
use crate::api::context::RequestContext;
use crate::OpenToolchainV1;

/// Options for [`OpenToolchainV1::create_toolchain`].
///
/// Everything but the headers is sent as query parameters.
#[derive(Debug, Clone, Default)]
pub struct CreateToolchainOptions {
    /// Environment ID, e.g. `ibm:yp:us-south`. Required.
    pub env_id: Option<String>,

    /// URL of the template repository to deploy from. Required.
    pub repository: Option<String>,

    /// Create the toolchain without showing the setup page.
    pub autocreate: Option<bool>,

    /// Resource group for the new toolchain.
    pub resource_group_id: Option<String>,

    /// Token for a private template repository.
    pub repository_token: Option<String>,

    /// Template repository branch.
    pub branch: Option<String>,

    /// Per-call request headers.
    pub headers: HashMap<String, String>,
}

impl CreateToolchainOptions {
    pub fn new(env_id: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            env_id: Some(env_id.into()),
            repository: Some(repository.into()),
            ..Default::default()
        }
    }

    pub fn autocreate(mut self, autocreate: bool) -> Self {
        self.autocreate = Some(autocreate);
        self
    }

    pub fn resource_group_id(mut self, id: impl Into<String>) -> Self {
        self.resource_group_id = Some(id.into());
        self
    }

    pub fn repository_token(mut self, token: impl Into<String>) -> Self {
        self.repository_token = Some(token.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Checks the required fields.
    pub fn validate(&self) -> Result<()> {
        require("env_id", &self.env_id)?;
        require("repository", &self.repository)?;
        Ok(())
    }
}

/// Options for [`OpenToolchainV1::get_toolchain`].
#[derive(Debug, Clone, Default)]
pub struct GetToolchainOptions {
    /// Toolchain GUID. Required.
    pub guid: Option<String>,

    /// Environment ID. Required.
    pub env_id: Option<String>,

    pub headers: HashMap<String, String>,
}

impl GetToolchainOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
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
        Ok(())
    }
}

/// Options for [`OpenToolchainV1::delete_toolchain`].
#[derive(Debug, Clone, Default)]
pub struct DeleteToolchainOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,
    pub headers: HashMap<String, String>,
}

impl DeleteToolchainOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
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
        Ok(())
    }
}

/// Options for [`OpenToolchainV1::patch_toolchain`].
///
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default)]
pub struct PatchToolchainOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,

    /// New toolchain name.
    pub name: Option<String>,

    /// New toolchain description.
    pub description: Option<String>,

    pub headers: HashMap<String, String>,
}

impl PatchToolchainOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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

#[derive(Debug, Serialize)]
struct PatchToolchainBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// A toolchain as returned by the service.
///
/// # Fields
///
/// * `toolchain_guid` - Unique identifier
/// * `container` - The org or resource group that owns the toolchain
/// * `template` - The template the toolchain was created from
/// * `services` - Service instances bound to the toolchain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toolchain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_guid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub container: Option<Container>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,

    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub template: Option<ToolchainTemplate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_messaging_webhook_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ToolchainService>>,
}

/// Owner of a toolchain or service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,

    /// `organization` or `resource_group`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
}

/// Template metadata of a toolchain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolchainTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getting_started: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_total: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// A service bound to a toolchain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolchainService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub container: Option<Container>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Service-specific settings; the shape depends on the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub status: Option<ServiceStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub toolchain_binding: Option<ToolchainBinding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// How a service is attached to its toolchain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolchainBinding {
    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub status: Option<ServiceStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
}

impl OpenToolchainV1 {
    /// Deploys a new toolchain from a template repository.
    ///
    /// The service answers `201` without a body.
    pub async fn create_toolchain(
        &self,
        options: &CreateToolchainOptions,
    ) -> Result<DetailedResponse> {
        self.create_toolchain_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn create_toolchain_with_context(
        &self,
        ctx: &RequestContext,
        options: &CreateToolchainOptions,
    ) -> Result<DetailedResponse> {
        options.validate()?;
        let env_id = options.env_id.as_deref().unwrap_or_default();
        let repository = options.repository.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::POST, "CreateToolchain")
            .path(&["devops", "setup", "deploy"])
            .query("env_id", env_id)
            .query("repository", repository)
            .query_opt("autocreate", options.autocreate)
            .query_opt("resourceGroupId", options.resource_group_id.as_deref())
            .query_opt("repository_token", options.repository_token.as_deref())
            .query_opt("branch", options.branch.as_deref())
            .headers(&options.headers)
            .success_codes(&[201]);

        self.client().execute(ctx, spec).await
    }

    /// Returns details about a toolchain.
    ///
    /// # Errors
    ///
    /// - [`SdkError::Validation`](crate::SdkError::Validation) when `guid` or
    ///   `env_id` is missing; no request is sent
    /// - [`SdkError::Http`](crate::SdkError::Http) for non-2xx responses
    /// - [`SdkError::Decode`](crate::SdkError::Decode) for an unreadable body
    pub async fn get_toolchain(
        &self,
        options: &GetToolchainOptions,
    ) -> Result<ApiResponse<Toolchain>> {
        self.get_toolchain_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn get_toolchain_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetToolchainOptions,
    ) -> Result<ApiResponse<Toolchain>> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::GET, "GetToolchain")
            .path(&["devops", "toolchains"])
            .path_param(guid)
            .query("env_id", env_id)
            .headers(&options.headers)
            .accept_json()
            .success_codes(&[200]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }

    /// Deletes a toolchain.
    pub async fn delete_toolchain(
        &self,
        options: &DeleteToolchainOptions,
    ) -> Result<DetailedResponse> {
        self.delete_toolchain_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn delete_toolchain_with_context(
        &self,
        ctx: &RequestContext,
        options: &DeleteToolchainOptions,
    ) -> Result<DetailedResponse> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::DELETE, "DeleteToolchain")
            .path(&["devops", "toolchains"])
            .path_param(guid)
            .query("env_id", env_id)
            .headers(&options.headers)
            .success_codes(&[200]);

        self.client().execute(ctx, spec).await
    }

    /// Updates the name or description of a toolchain.
    pub async fn patch_toolchain(
        &self,
        options: &PatchToolchainOptions,
    ) -> Result<DetailedResponse> {
        self.patch_toolchain_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn patch_toolchain_with_context(
        &self,
        ctx: &RequestContext,
        options: &PatchToolchainOptions,
    ) -> Result<DetailedResponse> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let body = PatchToolchainBody {
            name: options.name.as_deref(),
            description: options.description.as_deref(),
        };
        let spec = RequestSpec::new(Method::PATCH, "PatchToolchain")
            .path(&["devops", "toolchains"])
            .path_param(guid)
            .query("env_id", env_id)
            .headers(&options.headers)
            .json_body(&body)?
            .success_codes(&[204]);

        self.client().execute(ctx, spec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_first_missing_field() {
        let err = DeleteToolchainOptions::default().validate().unwrap_err();
        assert!(err.to_string().contains("guid"));

        let err = GetToolchainOptions {
            guid: Some("g".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("env_id"));

        assert!(CreateToolchainOptions::new("ibm:yp:us-south", "https://github.com/open-toolchain/simple-toolchain")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_patch_body_omits_absent_fields() {
        let body = PatchToolchainBody {
            name: Some("n"),
            description: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!({"name": "n"}));

        let empty = PatchToolchainBody {
            name: None,
            description: None,
        };
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }

    #[test]
    fn test_toolchain_deserializes_nested_models() {
        let json = r#"{
            "toolchain_guid": "ToolchainGUID",
            "container": {"guid": "GUID", "type": "Type"},
            "created": "2019-01-01T12:00:00.000Z",
            "template": {"services_total": 13, "type": "Type"},
            "services": [{
                "service_id": "ServiceID",
                "parameters": {"api_token": "APIToken", "channel_name": "ChannelName"},
                "toolchain_binding": {"status": {"state": "State"}, "webhook_id": "WebhookID"}
            }]
        }"#;
        let toolchain: Toolchain = serde_json::from_str(json).unwrap();

        assert_eq!(toolchain.toolchain_guid.as_deref(), Some("ToolchainGUID"));
        assert_eq!(
            toolchain.container.as_ref().unwrap().container_type.as_deref(),
            Some("Type")
        );
        assert_eq!(toolchain.template.as_ref().unwrap().services_total, Some(13));
        assert_eq!(
            toolchain.created.unwrap().to_rfc3339(),
            "2019-01-01T12:00:00+00:00"
        );

        let service = &toolchain.services.as_ref().unwrap()[0];
        assert_eq!(
            service.parameters.as_ref().unwrap()["api_token"],
            serde_json::json!("APIToken")
        );
        assert_eq!(
            service
                .toolchain_binding
                .as_ref()
                .and_then(|b| b.status.as_ref())
                .and_then(|s| s.state.as_deref()),
            Some("State")
        );
    }

    #[test]
    fn test_toolchain_tolerates_unknown_fields() {
        let toolchain: Toolchain =
            serde_json::from_str(r#"{"name": "n", "brand_new_field": [1, 2]}"#).unwrap();
        assert_eq!(toolchain.name.as_deref(), Some("n"));
    }
}
