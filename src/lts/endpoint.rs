//! Endpoint resolution
//!
//! Turns (service, region, versioned path, query) into a full URL, using the
//! configured override for a service when present and the
//! `https://{service}.{region}.{cloud}/` convention otherwise.

use crate::config::ValidatedConfig;
use url::Url;

/// Build a relative API path from segments, percent-encoding each one
pub fn api_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Base URL for a service in a region
pub fn service_base(config: &ValidatedConfig, service: &str, region: &str) -> Result<Url, url::ParseError> {
    if let Some(url) = config.endpoints.get(service) {
        return Ok(url.clone());
    }
    Url::parse(&format!("https://{}.{}.{}/", service, region, config.cloud))
}

/// Full URL for a service call
pub fn service_url(
    config: &ValidatedConfig,
    service: &str,
    region: &str,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Url, url::ParseError> {
    let mut url = service_base(config, service, region)?.join(path)?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter().copied());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config(endpoints: &[(&str, &str)]) -> ValidatedConfig {
        Config {
            project_id: Some("proj".to_string()),
            region: Some("cn-north-4".to_string()),
            endpoints: endpoints
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Config::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_derived_endpoint() {
        let cfg = config(&[]);
        let url = service_url(&cfg, "lts", "cn-north-4", "v2/proj/lts/struct/template", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://lts.cn-north-4.myhuaweicloud.com/v2/proj/lts/struct/template"
        );
    }

    #[test]
    fn test_override_keeps_base_path() {
        let cfg = config(&[("elb", "https://elb.internal/gateway")]);
        let url = service_url(&cfg, "elb", "ignored", "v3/proj/elb/logtanks", &[]).unwrap();
        assert_eq!(url.as_str(), "https://elb.internal/gateway/v3/proj/elb/logtanks");
    }

    #[test]
    fn test_query_pairs_are_encoded() {
        let cfg = config(&[]);
        let url = service_url(
            &cfg,
            "lts",
            "cn-north-4",
            "v2/proj/dashboard",
            &[("is_delete_charts", "true"), ("id", "a b&c")],
        )
        .unwrap();
        assert_eq!(url.query(), Some("is_delete_charts=true&id=a+b%26c"));
    }

    #[test]
    fn test_api_path_encodes_segments() {
        assert_eq!(api_path(&["v3", "p", "elb", "logtanks", "x/y"]), "v3/p/elb/logtanks/x%2Fy");
    }
}
