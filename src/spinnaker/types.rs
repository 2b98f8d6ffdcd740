use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Result, SpinnakerError};

// Trigger refs look like "/pipelines/<id>"; the id is the third segment.
static EXECUTION_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/]*/[^/]*/(?P<id>[^/]+)").unwrap());

/// One run of a Spinnaker pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineExecution {
    /// Execution identifier
    pub id: String,
    /// Execution status as reported by Spinnaker (e.g. "RUNNING", "SUCCEEDED")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PipelineExecution {
    /// Build an execution from the `ref` returned by a trigger call.
    pub fn from_ref(reference: &str) -> Result<Self> {
        let id = EXECUTION_REF
            .captures(reference)
            .and_then(|caps| caps.name("id"))
            .map(|id| id.as_str().to_string())
            .ok_or_else(|| {
                SpinnakerError::Decode(format!("unexpected pipeline execution ref: {reference:?}"))
            })?;

        Ok(Self { id, status: None })
    }
}

/// Entry of `/applications/{app}/pipelineConfigs`; only the name is used.
#[derive(Debug, Deserialize)]
pub(super) struct PipelineConfig {
    pub name: String,
}

/// Body returned by `POST /pipelines/{app}/{pipeline}`.
#[derive(Debug, Deserialize)]
pub(super) struct TriggerResponse {
    #[serde(rename = "ref")]
    pub reference: String,
}
