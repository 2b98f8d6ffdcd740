//! Client adapter that lets a CI resource trigger and poll Spinnaker pipeline executions.

pub mod auth;
pub mod config;
pub mod error;
pub mod spinnaker;

pub use config::Source;
pub use error::{Result, SpinnakerError};
pub use spinnaker::{PipelineExecution, SpinnakerClient};
