//
//  open-toolchain-sdk
//  api/tekton/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Tekton pipeline API types and data structures.
//!
//! This module provides types for the Tekton pipelines attached to a
//! toolchain: their configuration (environment properties, inputs, triggers,
//! worker) and their definitions.
//!
//! # Overview
//!
//! A Tekton pipeline pulls its Tekton resources from one or more *inputs*
//! (usually Git repositories), runs on a *worker* and is started by
//! *triggers*. The *definition* records which repository, branch and path
//! the pipeline reads its resources from.
//!
//! ```text
//! TektonPipeline
//!   |- envProperties[]   name/value/type
//!   |- inputs[]          scmSource{url, branch, path}
//!   |- triggers[]        manual | scm | timer | generic
//!   |- worker            workerId, workerName, workerType
//!   `- pipelineDefinitionId
//! ```
//!
//! Unlike the rest of the API, Tekton resources use camelCase on the wire
//! (`pipelineDefinitionId`, `envProperties`, `scmSource`).
//!
//! # Submodules
//!
//! - [`pipelines`]: get and patch pipeline configuration
//! - [`definitions`]: get and create pipeline definitions

pub mod definitions;
pub mod pipelines;

pub use definitions::*;
pub use pipelines::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::common::is_empty_object;

/// Path prefix shared by every Tekton endpoint.
const TEKTON_API: [&str; 5] = ["devops", "pipelines", "tekton", "api", "v1"];

/// A Tekton pipeline and its configuration.
///
/// # Example
///
/// ```rust,no_run
/// use open_toolchain::api::tekton::TektonPipeline;
///
/// fn enabled_triggers(pipeline: &TektonPipeline) -> Vec<&str> {
///     pipeline
///         .triggers
///         .iter()
///         .flatten()
///         .filter(|t| !t.disabled.unwrap_or(false))
///         .filter_map(|t| t.name.as_deref())
///         .collect()
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TektonPipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `configured` or `configuring`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_definition_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_properties: Option<Vec<EnvProperty>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<TektonPipelineInput>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Vec<TektonPipelineTrigger>>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub worker: Option<Worker>,

    /// Dashboard URL of the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,

    /// Latest run number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An environment property passed to every pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// `TEXT`, `SECURE`, `SINGLE_SELECT` ...
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
}

impl EnvProperty {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        property_type: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            property_type: Some(property_type.into()),
        }
    }
}

/// A source of Tekton resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TektonPipelineInput {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_definition_id: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub scm_source: Option<InputScmSource>,
}

/// Repository location of an input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputScmSource {
    /// Directory inside the repository holding the Tekton resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    /// Whether the repository sits behind a private endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blind_connection: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// What starts a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TektonPipelineTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Event listener the trigger fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_listener: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub scm_source: Option<TriggerScmSource>,

    /// `manual`, `scm`, `timer` or `generic`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_object")]
    pub events: Option<TriggerEvents>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance_id: Option<String>,
}

/// Repository watched by an SCM trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerScmSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Branch pattern, used instead of `branch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Repository events an SCM trigger reacts to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_closed: Option<bool>,
}

/// The worker pipeline runs are scheduled on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_pipeline_uses_camel_case() {
        let pipeline = TektonPipeline {
            pipeline_definition_id: Some("def".into()),
            env_properties: Some(vec![EnvProperty::new("REGION", "us-south", "TEXT")]),
            worker: Some(Worker {
                worker_id: Some("public".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&pipeline).unwrap(),
            json!({
                "pipelineDefinitionId": "def",
                "envProperties": [{"name": "REGION", "value": "us-south", "type": "TEXT"}],
                "worker": {"workerId": "public"}
            })
        );
    }

    #[test]
    fn test_trigger_deserializes() {
        let trigger: TektonPipelineTrigger = serde_json::from_value(json!({
            "id": "t1",
            "eventListener": "listener",
            "disabled": false,
            "type": "scm",
            "scmSource": {"url": "https://github.com/o/r", "type": "github", "pattern": "release-*"},
            "events": {"push": true, "pullRequest": false, "pullRequestClosed": true},
            "serviceInstanceId": "si"
        }))
        .unwrap();

        assert_eq!(trigger.trigger_type.as_deref(), Some("scm"));
        assert_eq!(trigger.event_listener.as_deref(), Some("listener"));
        assert_eq!(
            trigger.scm_source.as_ref().unwrap().pattern.as_deref(),
            Some("release-*")
        );
        let events = trigger.events.unwrap();
        assert_eq!(events.pull_request, Some(false));
        assert_eq!(events.pull_request_closed, Some(true));
    }

    #[test]
    fn test_input_blind_connection() {
        let input: TektonPipelineInput = serde_json::from_value(json!({
            "type": "scm",
            "shardDefinitionId": "shard",
            "scmSource": {"path": ".tekton", "blindConnection": true}
        }))
        .unwrap();
        let source = input.scm_source.unwrap();
        assert_eq!(source.blind_connection, Some(true));
        assert_eq!(source.path.as_deref(), Some(".tekton"));
    }
}
