use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Map, Value};
use url::Url;

use crate::auth::{provider_for, AuthMethod};
use crate::config::Source;
use crate::error::{Result, SpinnakerError};

use super::types::{PipelineConfig, PipelineExecution, TriggerResponse};

/// Number of executions returned by [`SpinnakerClient::pipeline_executions`].
pub const EXECUTION_LIST_LIMIT: usize = 25;

/// Client for one Spinnaker application/pipeline pair.
///
/// Construction verifies that both the application and the pipeline exist,
/// so every instance handed out points at a real pipeline.
pub struct SpinnakerClient {
    client: Client,
    api_url: Url,
    source: Source,
}

impl SpinnakerClient {
    /// Authenticates and validates the configured application and pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `auth_method` is missing or unknown, or the base URL is invalid
    /// - the auth provider cannot build a client from the credentials
    /// - the application or pipeline does not exist
    /// - Spinnaker answers a validation call with a status >= 400
    pub async fn new(source: Source) -> Result<Self> {
        let method = AuthMethod::from_source(&source)?;

        let api_url = Url::parse(&source.spinnaker_api)
            .map_err(|e| SpinnakerError::Config(format!("Invalid spinnaker_api URL: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(SpinnakerError::Config(format!(
                "Invalid spinnaker_api URL: {api_url}"
            )));
        }

        let client = provider_for(method, &source).client(&api_url)?;

        let spin_client = Self {
            client,
            api_url,
            source,
        };

        spin_client.validate_application().await?;
        spin_client.validate_pipeline().await?;

        info!(
            "Connected to spinnaker pipeline {}/{}",
            spin_client.source.spinnaker_application, spin_client.source.spinnaker_pipeline
        );

        Ok(spin_client)
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    async fn validate_application(&self) -> Result<()> {
        let application = self.source.spinnaker_application.as_str();
        let url = self.endpoint(&["applications", application]);

        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SpinnakerError::ApplicationNotFound(application.to_string()));
        }
        check_status(response).await?;

        Ok(())
    }

    async fn validate_pipeline(&self) -> Result<()> {
        let application = self.source.spinnaker_application.as_str();
        let pipeline = self.source.spinnaker_pipeline.as_str();
        let url = self.endpoint(&["applications", application, "pipelineConfigs"]);

        let response = check_status(self.get(url).await?).await?;
        let body = response.bytes().await?;
        let configs: Vec<PipelineConfig> = serde_json::from_slice(&body)?;

        if !configs.iter().any(|config| config.name == pipeline) {
            return Err(SpinnakerError::PipelineNotFound(pipeline.to_string()));
        }

        Ok(())
    }

    /// Fetch the execution's metadata as the exact bytes Spinnaker returned.
    pub async fn pipeline_execution_raw(&self, execution_id: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&["pipelines", execution_id]);

        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SpinnakerError::ExecutionNotFound(execution_id.to_string()));
        }
        let response = check_status(response).await?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch the execution's metadata as an untyped JSON object.
    pub async fn pipeline_execution(&self, execution_id: &str) -> Result<Map<String, Value>> {
        let body = self.pipeline_execution_raw(execution_id).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// The most recent executions of the application, newest first as Spinnaker orders them.
    pub async fn pipeline_executions(&self) -> Result<Vec<PipelineExecution>> {
        let mut url = self.endpoint(&[
            "applications",
            self.source.spinnaker_application.as_str(),
            "pipelines",
        ]);
        url.query_pairs_mut()
            .append_pair("limit", &EXECUTION_LIST_LIMIT.to_string());

        let response = check_status(self.get(url).await?).await?;
        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Start a new execution of the configured pipeline.
    ///
    /// `body` is sent as-is with `Content-Type: application/json`.
    pub async fn invoke_pipeline_execution(&self, body: &[u8]) -> Result<PipelineExecution> {
        let url = self.endpoint(&[
            "pipelines",
            self.source.spinnaker_application.as_str(),
            self.source.spinnaker_pipeline.as_str(),
        ]);

        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.bytes().await?;
        let trigger: TriggerResponse = serde_json::from_slice(&body)?;

        PipelineExecution::from_ref(&trigger.reference)
    }

    async fn get(&self, url: Url) -> Result<Response> {
        debug!("GET {url}");
        Ok(self.client.get(url).send().await?)
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // Checked in `new`: the base URL can always carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Turn any status >= 400 into an `Api` error carrying the response body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.as_u16() < 400 {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(SpinnakerError::Api {
        status: status.as_u16(),
        body,
    })
}
