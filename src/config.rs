use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SpinnakerError};

/// Resource source configuration.
///
/// Mirrors the `source` block a pipeline author writes for the resource:
/// where the Spinnaker gateway lives, which application/pipeline to drive,
/// and how to authenticate against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Spinnaker API gateway base URL
    pub spinnaker_api: String,

    /// Application that owns the pipeline
    pub spinnaker_application: String,

    /// Pipeline name within the application
    pub spinnaker_pipeline: String,

    /// Authentication method tag ("ldap" or "x509", case-insensitive)
    #[serde(default)]
    pub auth_method: Option<String>,

    #[serde(default)]
    pub ldap_username: Option<String>,

    #[serde(default)]
    pub ldap_password: Option<String>,

    /// PEM-encoded client certificate
    #[serde(default)]
    pub x509_cert: Option<String>,

    /// PEM-encoded private key for `x509_cert`
    #[serde(default)]
    pub x509_key: Option<String>,
}

impl Source {
    /// Load a source configuration from a file.
    ///
    /// The format is picked from the extension (`.toml`, `.json`, `.yaml`,
    /// `.yml`); anything else is tried as TOML, then JSON, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let parse_error = |e: String| {
            SpinnakerError::Config(format!("Failed to parse {}: {e}", path.display()))
        };

        match extension {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error(e.to_string())),
            "json" => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))
            }
            _ => toml::from_str(&contents)
                .map_err(|e| e.to_string())
                .or_else(|_| serde_json::from_str(&contents).map_err(|e| e.to_string()))
                .or_else(|_| serde_yaml::from_str(&contents).map_err(|e| e.to_string()))
                .map_err(parse_error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_toml_source() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
spinnaker_api = "https://gate.example.com"
spinnaker_application = "checkout"
spinnaker_pipeline = "deploy-prod"
auth_method = "LDAP"
ldap_username = "deployer"
ldap_password = "hunter2"
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let source = Source::load(temp_file.path()).unwrap();
        assert_eq!(source.spinnaker_api, "https://gate.example.com");
        assert_eq!(source.spinnaker_application, "checkout");
        assert_eq!(source.spinnaker_pipeline, "deploy-prod");
        assert_eq!(source.auth_method.as_deref(), Some("LDAP"));
        assert_eq!(source.ldap_username.as_deref(), Some("deployer"));
        assert!(source.x509_cert.is_none());
    }

    #[test]
    fn test_load_json_source() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "spinnaker_api": "https://gate.example.com",
  "spinnaker_application": "checkout",
  "spinnaker_pipeline": "deploy-prod",
  "auth_method": "x509",
  "x509_cert": "cert",
  "x509_key": "key"
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let source = Source::load(temp_file.path()).unwrap();
        assert_eq!(source.auth_method.as_deref(), Some("x509"));
        assert_eq!(source.x509_cert.as_deref(), Some("cert"));
        assert_eq!(source.x509_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_load_yaml_source_without_extension_hint() {
        let mut temp_file = NamedTempFile::with_suffix(".conf").unwrap();
        let yaml_content = "spinnaker_api: https://gate.example.com\n\
                            spinnaker_application: checkout\n\
                            spinnaker_pipeline: deploy-prod\n";
        write!(temp_file, "{}", yaml_content).unwrap();

        let source = Source::load(temp_file.path()).unwrap();
        assert_eq!(source.spinnaker_application, "checkout");
        assert!(source.auth_method.is_none());
    }

    #[test]
    fn test_load_missing_required_field() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, r#"{{"spinnaker_api": "https://gate.example.com"}}"#).unwrap();

        let err = Source::load(temp_file.path()).unwrap_err();
        assert!(matches!(err, SpinnakerError::Config(_)));
    }

    #[test]
    fn test_load_nonexistent_source() {
        let err = Source::load(Path::new("nonexistent-source.toml")).unwrap_err();
        assert!(matches!(err, SpinnakerError::Io(_)));
    }
}
