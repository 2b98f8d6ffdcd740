use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpinnakerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Authentication setup failed: {0}")]
    Auth(String),

    #[error("spinnaker application {0} not found")]
    ApplicationNotFound(String),

    #[error("spinnaker pipeline {0} not found")]
    PipelineNotFound(String),

    #[error("pipeline execution ID not found (ID: {0})")]
    ExecutionNotFound(String),

    #[error("spinnaker api responded with status code: {status}, body: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpinnakerError {
    /// True for the 404-derived lookups (application, pipeline, execution).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ApplicationNotFound(_) | Self::PipelineNotFound(_) | Self::ExecutionNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SpinnakerError>;
