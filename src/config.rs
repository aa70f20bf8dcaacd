//! Configuration Management
//!
//! Handles loading and validating the provider configuration for ltsmap.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Default cloud domain used to derive service endpoints
pub const DEFAULT_CLOUD: &str = "myhuaweicloud.com";

/// Default per-request timeout handed to the transport
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Raw configuration as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Project the resources live in
    #[serde(default)]
    pub project_id: Option<String>,
    /// Default region for resources that don't declare one
    #[serde(default)]
    pub region: Option<String>,
    /// Cloud domain, e.g. `myhuaweicloud.com`
    #[serde(default)]
    pub cloud: Option<String>,
    /// Per-service base endpoint overrides (`lts`, `elb`)
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    /// IAM token sent as `X-Auth-Token`
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        let dir = dirs::config_dir()?.join("ltsmap");
        ["config.yaml", "config.yml", "config.json"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
    }

    /// Load configuration from a file, YAML or JSON by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        }
    }

    /// Load from the default location, or an empty config if none exists
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Apply CLI overrides (CLI > config file)
    pub fn with_overrides(mut self, project: Option<String>, region: Option<String>) -> Self {
        if project.is_some() {
            self.project_id = project;
        }
        if region.is_some() {
            self.region = region;
        }
        self
    }

    /// Check every setting and parse endpoints into URLs
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let project_id = self
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ConfigError::Missing("project_id"))?;

        let region = self
            .region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .ok_or(ConfigError::Missing("region"))?;
        validate_region(&region)?;

        let mut endpoints = BTreeMap::new();
        for (service, value) in &self.endpoints {
            endpoints.insert(service.clone(), parse_endpoint(service, value)?);
        }

        Ok(ValidatedConfig {
            project_id,
            region,
            cloud: self
                .cloud
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CLOUD.to_string()),
            endpoints,
            auth_token: self.auth_token.clone().filter(|t| !t.is_empty()),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

/// Configuration that passed validation; immutable once built
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub project_id: String,
    pub region: String,
    pub cloud: String,
    pub endpoints: BTreeMap<String, Url>,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
}

fn validate_region(region: &str) -> Result<(), ConfigError> {
    let ok = region
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Region(region.to_string()))
    }
}

/// Parse a base endpoint, rejecting anything that isn't `http(s)://host/...`
pub fn parse_endpoint(service: &str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |message: &str| ConfigError::Endpoint {
        service: service.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    };

    let mut url = Url::parse(value).map_err(|e| invalid(&e.to_string()))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid("scheme must be http or https"));
    }
    // `https//host` parses as a relative path and never gets here, but
    // `https:host` would; both lack a real authority.
    if url.host_str().map(str::is_empty).unwrap_or(true) || !value.contains("://") {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base endpoint must not carry a query or fragment"));
    }

    // Path joins are relative, so the base must end in a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base() -> Config {
        Config {
            project_id: Some("proj-1".to_string()),
            region: Some("cn-north-4".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_malformed_scheme_is_rejected() {
        let mut config = base();
        config
            .endpoints
            .insert("lts".to_string(), "https//lts.cn-north-4.myhuaweicloud.com/".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint { ref service, .. } if service == "lts"));
    }

    #[test]
    fn test_endpoint_gets_trailing_slash() {
        let url = parse_endpoint("lts", "https://lts.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://lts.example.com/api/");
    }

    #[test]
    fn test_endpoint_rejects_other_schemes() {
        assert!(parse_endpoint("lts", "ftp://lts.example.com/").is_err());
        assert!(parse_endpoint("lts", "https:lts.example.com").is_err());
    }

    #[test]
    fn test_missing_project_is_reported() {
        let config = Config {
            region: Some("cn-north-4".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Missing("project_id")
        ));
    }

    #[test]
    fn test_defaults_applied() {
        let validated = base().validate().unwrap();
        assert_eq!(validated.cloud, DEFAULT_CLOUD);
        assert_eq!(validated.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(validated.auth_token.is_none());
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = base().with_overrides(None, Some("ap-southeast-1".to_string()));
        assert_eq!(config.project_id.as_deref(), Some("proj-1"));
        assert_eq!(config.region.as_deref(), Some("ap-southeast-1"));
    }

    #[test]
    fn test_region_with_slash_rejected() {
        let mut config = base();
        config.region = Some("cn/north".to_string());
        assert!(matches!(config.validate().unwrap_err(), ConfigError::Region(_)));
    }

    #[test]
    fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("config.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(
            f,
            "project_id: p\nregion: cn-north-4\nendpoints:\n  elb: https://elb.example.com/"
        )
        .unwrap();
        let yaml = Config::load(&yaml_path).unwrap();
        assert_eq!(yaml.endpoints["elb"], "https://elb.example.com/");

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{"project_id":"p","region":"r1"}"#).unwrap();
        let json = Config::load(&json_path).unwrap();
        assert_eq!(json.region.as_deref(), Some("r1"));
    }
}
