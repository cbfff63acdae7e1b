//! Mapper configuration parsing
//!
//! Loads the external endpoint, organization policy, fallback tables and the
//! age-name translation table from YAML. The production tables ship with the
//! crate in `config/mapper.yaml`; any other environment supplies its own file.

use serde::Deserialize;
use std::collections::HashMap;

use crate::policy::fallback::WILDCARD_PROGRAM;

const BUILTIN_CONFIG: &str = include_str!("../../config/mapper.yaml");

/// Root configuration structure for the mapper
#[derive(Debug, Clone, Deserialize)]
pub struct MapperConfig {
    pub external: ExternalConfig,
    #[serde(default)]
    pub organizations: OrganizationConfig,
    pub fallback: FallbackConfig,
    /// Local age label -> external age label
    #[serde(default)]
    pub age_names: HashMap<String, String>,
}

/// Connection settings for the external catalog service
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the operator's access token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_env() -> String {
    "EXTERNAL_CATALOG_TOKEN".to_string()
}

/// Organization policy inputs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationConfig {
    /// Organization ids treated as headquarters
    #[serde(default)]
    pub headquarters: Vec<String>,
    /// Local program ids only headquarters organizations may resolve
    #[serde(default)]
    pub headquarters_programs: Vec<String>,
}

/// Default external ids used when name matching fails
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// External id every unmapped program collapses to
    pub default_program: String,
    /// Local program id (or `"*"`) -> per-program defaults
    #[serde(default)]
    pub programs: HashMap<String, ProgramDefaults>,
}

/// Per-program default external ids
///
/// A field left unset is a gap in the fallback chain and surfaces as
/// `NotFound` when resolution needs it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProgramDefaults {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

/// Errors raised while loading configuration or catalog files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl MapperConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: MapperConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The production tables shipped with the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_CONFIG)
    }

    /// Check structural requirements
    ///
    /// Hard failures: unparseable endpoint, empty default program, missing
    /// wildcard program entry. Default ids that are not UUIDs only warn,
    /// since test environments use readable ids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.external.endpoint).map_err(|e| {
            ConfigError::Invalid(format!(
                "external.endpoint '{}' is not a URL: {}",
                self.external.endpoint, e
            ))
        })?;

        if self.fallback.default_program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "fallback.default_program must not be empty".to_string(),
            ));
        }

        if !self.fallback.programs.contains_key(WILDCARD_PROGRAM) {
            return Err(ConfigError::Invalid(format!(
                "fallback.programs must contain a '{}' entry for unknown programs",
                WILDCARD_PROGRAM
            )));
        }

        for (id, field) in self.default_ids() {
            if uuid::Uuid::parse_str(id).is_err() {
                tracing::warn!(default_id = %id, field = %field, "Fallback id is not a UUID");
            }
        }

        for program in &self.organizations.headquarters_programs {
            if !self.fallback.programs.contains_key(program) {
                tracing::warn!(
                    program_id = %program,
                    "Headquarters program has no fallback entry, wildcard defaults apply"
                );
            }
        }

        Ok(())
    }

    /// Every configured default id with a label naming where it came from
    fn default_ids(&self) -> Vec<(&str, String)> {
        let mut ids = vec![(
            self.fallback.default_program.as_str(),
            "default_program".to_string(),
        )];

        for (program, defaults) in &self.fallback.programs {
            let fields = [
                ("subject", &defaults.subject),
                ("category", &defaults.category),
                ("grade", &defaults.grade),
            ];
            for (name, value) in fields {
                if let Some(id) = value {
                    ids.push((id.as_str(), format!("{}.{}", program, name)));
                }
            }
        }

        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
external:
  endpoint: "http://localhost:8080/graphql"

organizations:
  headquarters: ["org-hq"]
  headquarters_programs: ["program2"]

fallback:
  default_program: "default-program"
  programs:
    program2:
      subject: "math-subject"
    "*":
      subject: "none-subject"
      category: "none-category"
      grade: "none-grade"

age_names:
  "3-4": "3 - 4 year(s)"
"#;

    #[test]
    fn test_parse_config() {
        let config = MapperConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.external.timeout_secs, 30);
        assert_eq!(config.external.token_env, "EXTERNAL_CATALOG_TOKEN");
        assert_eq!(config.organizations.headquarters, vec!["org-hq"]);

        let math = config.fallback.programs.get("program2").unwrap();
        assert_eq!(math.subject.as_deref(), Some("math-subject"));
        assert_eq!(math.category, None);

        assert_eq!(
            config.age_names.get("3-4").map(String::as_str),
            Some("3 - 4 year(s)")
        );
    }

    #[test]
    fn test_missing_wildcard_rejected() {
        let yaml = MINIMAL.replace("\"*\":", "program9:");
        let err = MapperConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("'*'")));
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let yaml = MINIMAL.replace("http://localhost:8080/graphql", "localhost graphql");
        assert!(matches!(
            MapperConfig::from_yaml(&yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_builtin_config_is_valid() {
        let config = MapperConfig::builtin().unwrap();
        assert_eq!(
            config.fallback.default_program,
            "7565ae11-8130-4b7d-ac24-1d9dd6f792f2"
        );
        assert!(config
            .organizations
            .headquarters_programs
            .contains(&"program2".to_string()));
        for program in &config.organizations.headquarters_programs {
            assert!(config.fallback.programs.contains_key(program));
        }
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = MapperConfig::from_file("/nonexistent/mapper.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mapper.yaml"));
    }
}
