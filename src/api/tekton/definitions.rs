//
//  open-toolchain-sdk
//  api/tekton/definitions.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Tekton pipeline definitions.
//!
//! A definition pins the repository, branch and path a pipeline loads its
//! Tekton resources from. Creating a definition takes a list of inputs and
//! returns the stored definition alongside the inputs the service accepted.

use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{TektonPipelineInput, TEKTON_API};
use crate::api::client::{decode_response, RequestSpec};
use crate::api::common::{is_empty_object, require, ApiResponse, Result};
use crate::api::context::RequestContext;
use crate::OpenToolchainV1;

/// A stored pipeline definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Commit the definition was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub definition_type: Option<String>,

    /// Additional repositories the definition is sharded across.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_repos: Option<Vec<String>>,
}

/// Response of the definition endpoints: the definition and its inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TektonPipelineDefinition {
    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub definition: Option<PipelineDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<TektonPipelineInput>>,
}

/// Options for [`OpenToolchainV1::get_tekton_pipeline_definition`].
#[derive(Debug, Clone, Default)]
pub struct GetTektonPipelineDefinitionOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,
    pub headers: HashMap<String, String>,
}

impl GetTektonPipelineDefinitionOptions {
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

/// Options for [`OpenToolchainV1::create_tekton_pipeline_definition`].
#[derive(Debug, Clone, Default)]
pub struct CreateTektonPipelineDefinitionOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,

    /// Inputs to read the Tekton resources from.
    pub inputs: Option<Vec<TektonPipelineInput>>,

    pub headers: HashMap<String, String>,
}

impl CreateTektonPipelineDefinitionOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
            ..Default::default()
        }
    }

    pub fn inputs(mut self, inputs: Vec<TektonPipelineInput>) -> Self {
        self.inputs = Some(inputs);
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
struct CreateDefinitionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<&'a [TektonPipelineInput]>,
}

impl OpenToolchainV1 {
    /// Returns the definition of a Tekton pipeline.
    pub async fn get_tekton_pipeline_definition(
        &self,
        options: &GetTektonPipelineDefinitionOptions,
    ) -> Result<ApiResponse<TektonPipelineDefinition>> {
        self.get_tekton_pipeline_definition_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn get_tekton_pipeline_definition_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetTektonPipelineDefinitionOptions,
    ) -> Result<ApiResponse<TektonPipelineDefinition>> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::GET, "GetTektonPipelineDefinition")
            .path(&TEKTON_API)
            .path_param(guid)
            .path(&["definition"])
            .query("env_id", env_id)
            .headers(&options.headers)
            .accept_json()
            .success_codes(&[200]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }

    /// Creates or replaces the definition of a Tekton pipeline.
    pub async fn create_tekton_pipeline_definition(
        &self,
        options: &CreateTektonPipelineDefinitionOptions,
    ) -> Result<ApiResponse<TektonPipelineDefinition>> {
        self.create_tekton_pipeline_definition_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn create_tekton_pipeline_definition_with_context(
        &self,
        ctx: &RequestContext,
        options: &CreateTektonPipelineDefinitionOptions,
    ) -> Result<ApiResponse<TektonPipelineDefinition>> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let body = CreateDefinitionBody {
            inputs: options.inputs.as_deref(),
        };
        let spec = RequestSpec::new(Method::POST, "CreateTektonPipelineDefinition")
            .path(&TEKTON_API)
            .path_param(guid)
            .path(&["definition"])
            .query("env_id", env_id)
            .headers(&options.headers)
            .accept_json()
            .json_body(&body)?
            .success_codes(&[200]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::tekton::InputScmSource;

    #[test]
    fn test_definition_deserializes() {
        let definition: TektonPipelineDefinition = serde_json::from_value(json!({
            "definition": {
                "id": "d1",
                "pipelineId": "p1",
                "repoUrl": "https://github.com/o/r",
                "branch": "main",
                "path": ".tekton",
                "sha": "abc123",
                "type": "tekton",
                "shardRepos": ["https://github.com/o/shard"]
            },
            "inputs": [{"type": "scm", "serviceInstanceId": "si"}]
        }))
        .unwrap();

        let record = definition.definition.unwrap();
        assert_eq!(record.pipeline_id.as_deref(), Some("p1"));
        assert_eq!(record.repo_url.as_deref(), Some("https://github.com/o/r"));
        assert_eq!(record.shard_repos.unwrap().len(), 1);
        assert_eq!(
            definition.inputs.unwrap()[0].service_instance_id.as_deref(),
            Some("si")
        );
    }

    #[test]
    fn test_create_body() {
        let options = CreateTektonPipelineDefinitionOptions::new("g", "e").inputs(vec![
            TektonPipelineInput {
                input_type: Some("scm".into()),
                scm_source: Some(InputScmSource {
                    url: Some("https://github.com/o/r".into()),
                    branch: Some("main".into()),
                    path: Some(".tekton".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ]);
        let body = CreateDefinitionBody {
            inputs: options.inputs.as_deref(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"inputs": [{
                "type": "scm",
                "scmSource": {"url": "https://github.com/o/r", "branch": "main", "path": ".tekton"}
            }]})
        );

        let empty = CreateDefinitionBody { inputs: None };
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }
}
