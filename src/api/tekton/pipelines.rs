//
//  open-toolchain-sdk
//  api/tekton/pipelines.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Reading and reconfiguring Tekton pipelines.

use std::collections::HashMap;

use reqwest::Method;
use serde::Serialize;

use super::{
    EnvProperty, TektonPipeline, TektonPipelineInput, TektonPipelineTrigger, Worker, TEKTON_API,
};
use crate::api::client::{decode_response, RequestSpec};
use crate::api::common::{is_absent, require, ApiResponse, Result};
use crate::api::context::RequestContext;
use crate::OpenToolchainV1;

/// Options for [`OpenToolchainV1::get_tekton_pipeline`].
#[derive(Debug, Clone, Default)]
pub struct GetTektonPipelineOptions {
    /// Pipeline GUID. Required.
    pub guid: Option<String>,

    /// Environment ID. Required.
    pub env_id: Option<String>,

    pub headers: HashMap<String, String>,
}

impl GetTektonPipelineOptions {
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

/// Options for [`OpenToolchainV1::patch_tekton_pipeline`].
///
/// Only the sections that are set are sent; an unset section is left as is
/// by the service.
///
/// ```rust
/// use open_toolchain::api::tekton::{EnvProperty, PatchTektonPipelineOptions};
///
/// let options = PatchTektonPipelineOptions::new("pipeline-guid", "ibm:yp:us-south")
///     .worker_id("public")
///     .env_properties(vec![EnvProperty::new("API_KEY", "secret", "SECURE")]);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatchTektonPipelineOptions {
    pub guid: Option<String>,
    pub env_id: Option<String>,
    pub worker: Option<Worker>,
    pub env_properties: Option<Vec<EnvProperty>>,
    pub inputs: Option<Vec<TektonPipelineInput>>,
    pub triggers: Option<Vec<TektonPipelineTrigger>>,
    pub headers: HashMap<String, String>,
}

impl PatchTektonPipelineOptions {
    pub fn new(guid: impl Into<String>, env_id: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            env_id: Some(env_id.into()),
            ..Default::default()
        }
    }

    pub fn worker(mut self, worker: Worker) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Shorthand for a worker identified only by id.
    pub fn worker_id(self, worker_id: impl Into<String>) -> Self {
        self.worker(Worker {
            worker_id: Some(worker_id.into()),
            ..Default::default()
        })
    }

    pub fn env_properties(mut self, properties: Vec<EnvProperty>) -> Self {
        self.env_properties = Some(properties);
        self
    }

    pub fn inputs(mut self, inputs: Vec<TektonPipelineInput>) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn triggers(mut self, triggers: Vec<TektonPipelineTrigger>) -> Self {
        self.triggers = Some(triggers);
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
#[serde(rename_all = "camelCase")]
struct PatchTektonPipelineBody<'a> {
    #[serde(skip_serializing_if = "is_absent")]
    worker: Option<&'a Worker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    env_properties: Option<&'a [EnvProperty]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<&'a [TektonPipelineInput]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    triggers: Option<&'a [TektonPipelineTrigger]>,
}

impl<'a> From<&'a PatchTektonPipelineOptions> for PatchTektonPipelineBody<'a> {
    fn from(options: &'a PatchTektonPipelineOptions) -> Self {
        Self {
            worker: options.worker.as_ref(),
            env_properties: options.env_properties.as_deref(),
            inputs: options.inputs.as_deref(),
            triggers: options.triggers.as_deref(),
        }
    }
}

impl OpenToolchainV1 {
    /// Returns a Tekton pipeline with its full configuration.
    pub async fn get_tekton_pipeline(
        &self,
        options: &GetTektonPipelineOptions,
    ) -> Result<ApiResponse<TektonPipeline>> {
        self.get_tekton_pipeline_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn get_tekton_pipeline_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetTektonPipelineOptions,
    ) -> Result<ApiResponse<TektonPipeline>> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::GET, "GetTektonPipeline")
            .path(&TEKTON_API)
            .path_param(guid)
            .query("env_id", env_id)
            .headers(&options.headers)
            .accept_json()
            .success_codes(&[200]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }

    /// Updates the configuration of a Tekton pipeline.
    ///
    /// Both `200` with the updated pipeline and `204` without a body count as
    /// success; in the latter case `result` is `None`.
    pub async fn patch_tekton_pipeline(
        &self,
        options: &PatchTektonPipelineOptions,
    ) -> Result<ApiResponse<TektonPipeline>> {
        self.patch_tekton_pipeline_with_context(&RequestContext::background(), options)
            .await
    }

    pub async fn patch_tekton_pipeline_with_context(
        &self,
        ctx: &RequestContext,
        options: &PatchTektonPipelineOptions,
    ) -> Result<ApiResponse<TektonPipeline>> {
        options.validate()?;
        let guid = options.guid.as_deref().unwrap_or_default();
        let env_id = options.env_id.as_deref().unwrap_or_default();

        let spec = RequestSpec::new(Method::PATCH, "PatchTektonPipeline")
            .path(&TEKTON_API)
            .path_param(guid)
            .path(&["config"])
            .query("env_id", env_id)
            .headers(&options.headers)
            .accept_json()
            .json_body(&PatchTektonPipelineBody::from(options))?
            .success_codes(&[200, 204]);

        let raw = self.client().execute(ctx, spec).await?;
        decode_response(raw)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::tekton::{InputScmSource, TriggerEvents, TriggerScmSource};

    #[test]
    fn test_patch_body_sends_only_set_sections() {
        let options = PatchTektonPipelineOptions::new("g", "e").worker_id("public");
        let body = PatchTektonPipelineBody::from(&options);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"worker": {"workerId": "public"}})
        );
    }

    #[test]
    fn test_patch_body_drops_empty_worker_keeps_empty_lists() {
        let options = PatchTektonPipelineOptions::new("g", "e")
            .worker(Worker::default())
            .triggers(Vec::new());
        let body = PatchTektonPipelineBody::from(&options);
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"triggers": []}));
    }

    #[test]
    fn test_patch_body_drops_empty_nested_objects() {
        let options = PatchTektonPipelineOptions::new("g", "e")
            .inputs(vec![TektonPipelineInput {
                input_type: Some("scm".into()),
                scm_source: Some(InputScmSource::default()),
                ..Default::default()
            }])
            .triggers(vec![TektonPipelineTrigger {
                name: Some("t".into()),
                events: Some(TriggerEvents::default()),
                scm_source: Some(TriggerScmSource::default()),
                ..Default::default()
            }]);
        let body = PatchTektonPipelineBody::from(&options);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"inputs": [{"type": "scm"}], "triggers": [{"name": "t"}]})
        );
    }

    #[test]
    fn test_patch_body_keeps_partly_set_nested_objects() {
        let options = PatchTektonPipelineOptions::new("g", "e").triggers(vec![
            TektonPipelineTrigger {
                events: Some(TriggerEvents {
                    push: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ]);
        let body = PatchTektonPipelineBody::from(&options);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"triggers": [{"events": {"push": false}}]})
        );
    }

    #[test]
    fn test_validate() {
        assert!(GetTektonPipelineOptions::default().validate().is_err());
        assert!(GetTektonPipelineOptions::new("g", "e").validate().is_ok());
        let err = PatchTektonPipelineOptions {
            guid: Some("g".into()),
            env_id: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("env_id"));
    }
}
