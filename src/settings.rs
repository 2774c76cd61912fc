use crate::ConfigError;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const ENV_PREFIX: &str = "OPENAI";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    #[default]
    #[serde(alias = "open_ai")]
    OpenAi,
    Azure,
}

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub api_type: ApiType,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Model name, or deployment id for Azure.
    pub deployment_name: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Loads settings from an optional TOML file, overridden by `OPENAI_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().set_default("deployment_name", DEFAULT_MODEL)?;
        if let Some(file) = file {
            if !file.exists() {
                return Err(ConfigError::MissingFile(file.to_path_buf()));
            }
            builder = builder.add_source(File::from(file).format(FileFormat::Toml));
        }
        let settings: Settings = builder
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key is empty".to_owned()));
        }
        if self.api_type == ApiType::Azure {
            if self.api_base.is_none() {
                return Err(ConfigError::Invalid("azure requires api_base".to_owned()));
            }
            if self.api_version.is_none() {
                return Err(ConfigError::Invalid("azure requires api_version".to_owned()));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn load_from_env_only() {
        let settings = Settings::load_from(None, env(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(
            settings,
            Settings {
                api_key: "sk-test".to_owned(),
                api_base: None,
                api_type: ApiType::OpenAi,
                api_version: None,
                deployment_name: DEFAULT_MODEL.to_owned(),
                timeout_secs: None,
            }
        );
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anglicize.toml");
        fs::write(
            &path,
            r#"
api_key = "from-file"
api_type = "azure"
api_base = "https://example.openai.azure.com"
api_version = "2024-02-01"
deployment_name = "translator"
timeout_secs = 30
"#,
        )
        .unwrap();

        let settings =
            Settings::load_from(Some(&path), env(&[("OPENAI_API_KEY", "from-env")])).unwrap();

        assert_eq!(settings.api_key, "from-env");
        assert_eq!(settings.api_type, ApiType::Azure);
        assert_eq!(
            settings.api_base.as_deref(),
            Some("https://example.openai.azure.com")
        );
        assert_eq!(settings.api_version.as_deref(), Some("2024-02-01"));
        assert_eq!(settings.deployment_name, "translator");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn timeout_from_env_string() {
        let settings = Settings::load_from(
            None,
            env(&[("OPENAI_API_KEY", "k"), ("OPENAI_TIMEOUT_SECS", "15")]),
        )
        .unwrap();
        assert_eq!(settings.timeout_secs, Some(15));
        assert_eq!(settings.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let res = Settings::load_from(None, env(&[]));
        assert!(matches!(res, Err(ConfigError::Source(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let res = Settings::load_from(Some(&path), env(&[("OPENAI_API_KEY", "k")]));
        assert!(matches!(res, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn azure_requires_base_and_version() {
        let res = Settings::load_from(
            None,
            env(&[("OPENAI_API_KEY", "k"), ("OPENAI_API_TYPE", "azure")]),
        );
        assert!(matches!(res, Err(ConfigError::Invalid(_))));
    }
}
