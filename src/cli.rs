use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use spinnaker_resource::{SpinnakerClient, Source};

#[derive(Parser)]
#[command(name = "spinnaker-resource")]
#[command(author, version, about = "Trigger and poll Spinnaker pipeline executions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Source configuration file (TOML, JSON or YAML)
    #[arg(
        short,
        long,
        global = true,
        env = "SPINNAKER_RESOURCE_CONFIG",
        default_value = "spinnaker.toml"
    )]
    config: PathBuf,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the most recent executions of the application
    List,

    /// Show one execution's metadata
    Get {
        id: String,

        /// Print the response body exactly as Spinnaker returned it
        #[arg(long, default_value_t = false)]
        raw: bool,
    },

    /// Start a new execution of the configured pipeline
    Trigger {
        /// JSON trigger body; read from stdin when omitted
        #[arg(short, long)]
        body: Option<PathBuf>,
    },
}

impl Cli {
    async fn connect(&self) -> Result<SpinnakerClient> {
        let source = Source::load(&self.config)
            .with_context(|| format!("Failed to load source config: {}", self.config.display()))?;

        info!(
            "Connecting to {} for pipeline {}/{}",
            source.spinnaker_api, source.spinnaker_application, source.spinnaker_pipeline
        );

        Ok(SpinnakerClient::new(source).await?)
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let json = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(json)
    }

    fn write_output(&self, bytes: &[u8]) -> Result<()> {
        if let Some(output_path) = &self.output {
            std::fs::write(output_path, bytes)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{}", String::from_utf8_lossy(bytes));
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let client = self.connect().await?;

        let output = match &self.command {
            Commands::List => {
                let executions = client.pipeline_executions().await?;
                info!("Fetched {} executions", executions.len());
                self.render(&executions)?
            }
            Commands::Get { id, raw: true } => client.pipeline_execution_raw(id).await?,
            Commands::Get { id, raw: false } => {
                let metadata = client.pipeline_execution(id).await?;
                self.render(&metadata)?
            }
            Commands::Trigger { body } => {
                let body = read_trigger_body(body.as_deref())?;
                let execution = client.invoke_pipeline_execution(&body).await?;
                info!("Started execution {}", execution.id);
                self.render(&execution)?
            }
        };

        self.write_output(&output)
    }
}

/// Read the trigger body from `path`, or stdin; empty input becomes `{}`.
fn read_trigger_body(path: Option<&Path>) -> Result<Vec<u8>> {
    let body = match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read trigger body: {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read trigger body from stdin")?;
            buf
        }
    };

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(b"{}".to_vec());
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parses_trigger() {
        let cli = Cli::try_parse_from([
            "spinnaker-resource",
            "--config",
            "source.yml",
            "trigger",
            "--body",
            "params.json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("source.yml"));
        assert!(matches!(
            cli.command,
            Commands::Trigger { body: Some(ref p) } if p == Path::new("params.json")
        ));
    }

    #[test]
    fn test_cli_parses_get_raw() {
        let cli = Cli::try_parse_from(["spinnaker-resource", "get", "exec-1", "--raw", "-p"]).unwrap();
        assert!(cli.pretty);
        assert!(matches!(cli.command, Commands::Get { ref id, raw: true } if id == "exec-1"));
    }

    #[test]
    fn test_read_trigger_body_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"type": "manual"}}"#).unwrap();

        let body = read_trigger_body(Some(temp_file.path())).unwrap();
        assert_eq!(body, br#"{"type": "manual"}"#);
    }

    #[test]
    fn test_read_trigger_body_defaults_empty_input() {
        let temp_file = NamedTempFile::new().unwrap();
        let body = read_trigger_body(Some(temp_file.path())).unwrap();
        assert_eq!(body, b"{}");
    }
}
