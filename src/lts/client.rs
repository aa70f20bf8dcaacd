//! Provider context
//!
//! Immutable bundle of validated configuration and HTTP client that every
//! resource operation receives.

use super::endpoint;
use super::http::{ApiRequest, ApiResponse, LtsHttpClient};
use crate::config::ValidatedConfig;
use anyhow::Result;
use std::time::Duration;
use url::Url;

/// Shared, read-only context for resource operations
#[derive(Clone)]
pub struct ProviderContext {
    pub config: ValidatedConfig,
    pub http: LtsHttpClient,
}

impl ProviderContext {
    /// Create a context from validated configuration
    pub fn new(config: ValidatedConfig) -> Result<Self> {
        let http = LtsHttpClient::new(
            Duration::from_secs(config.request_timeout_secs),
            config.auth_token.clone(),
        )?;
        Ok(Self { config, http })
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Region of a resource, falling back to the configured default
    pub fn region<'a>(&'a self, declared: Option<&'a str>) -> &'a str {
        declared
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.config.region)
    }

    /// Build `{base}/{version}/{project}/{segments...}?{query}` for a service
    pub fn url(
        &self,
        service: &str,
        region: &str,
        version: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, url::ParseError> {
        let mut parts = vec![version, self.project_id()];
        parts.extend_from_slice(segments);
        let path = endpoint::api_path(&parts);
        endpoint::service_url(&self.config, service, region, &path, query)
    }

    pub async fn send(&self, request: &ApiRequest) -> reqwest::Result<ApiResponse> {
        self.http.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx() -> ProviderContext {
        let config = Config {
            project_id: Some("proj".to_string()),
            region: Some("cn-north-4".to_string()),
            ..Config::default()
        }
        .validate()
        .unwrap();
        ProviderContext::new(config).unwrap()
    }

    #[test]
    fn test_region_fallback() {
        let ctx = ctx();
        assert_eq!(ctx.region(None), "cn-north-4");
        assert_eq!(ctx.region(Some("")), "cn-north-4");
        assert_eq!(ctx.region(Some("ap-southeast-1")), "ap-southeast-1");
    }

    #[test]
    fn test_url_inserts_project() {
        let ctx = ctx();
        let url = ctx
            .url("lts", "cn-north-4", "v2", &["lts", "aom-mapping", "rule-1"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://lts.cn-north-4.myhuaweicloud.com/v2/proj/lts/aom-mapping/rule-1"
        );
    }
}
