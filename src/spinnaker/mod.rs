mod client;
mod types;


pub use client::{SpinnakerClient, EXECUTION_LIST_LIMIT};
pub use types::PipelineExecution;
