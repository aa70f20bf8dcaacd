//! AOM access-mapping rule resource
//!
//! Maps files of a cluster's deployments to LTS log streams. Updates resend
//! the whole rule to the collection endpoint with POST.

use super::{decode, region_of, FieldSetter, ReadResult, ResourceKind, ResourceState};
use crate::error::{Action, OperationError};
use crate::lts::client::ProviderContext;
use crate::lts::http::ApiRequest;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SERVICE: &str = "lts";
const MAPPING_PATH: &[&str] = &["lts", "aom-mapping"];

/// Target log stream of one mapped file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStreamTarget {
    pub target_log_group_id: String,
    pub target_log_group_name: String,
    pub target_log_stream_id: String,
    pub target_log_stream_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedFile {
    pub file_name: String,
    pub log_stream_info: LogStreamTarget,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AomMappingRuleFields {
    /// Sent as the `isBatch` query flag on create
    pub is_batch: String,
    pub rule_name: String,
    pub cluster_id: String,
    pub cluster_name: String,
    pub name_space: String,
    pub deployments: Vec<String>,
    pub files: Vec<MappedFile>,
    /// Computed by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedRule {
    rule_id: String,
}

#[derive(Debug, Deserialize)]
struct RuleInfo {
    #[serde(default)]
    cluster_id: Option<String>,
    #[serde(default)]
    cluster_name: Option<String>,
    #[serde(default)]
    container_name: Option<String>,
    #[serde(default)]
    deployments: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RuleRecord {
    #[serde(default)]
    rule_name: Option<String>,
    #[serde(default)]
    rule_info: Option<RuleInfo>,
}

pub struct AomMappingRule;

impl AomMappingRule {
    fn rule_body(ctx: &ProviderContext, f: &AomMappingRuleFields) -> Value {
        json!({
            "project_id": ctx.project_id(),
            "rule_name": f.rule_name,
            "rule_info": {
                "cluster_id": f.cluster_id,
                "cluster_name": f.cluster_name,
                "namespace": f.name_space,
                "deployments": f.deployments,
                "files": f.files,
            },
        })
    }
}

impl ResourceKind for AomMappingRule {
    type Fields = AomMappingRuleFields;

    const TYPE_NAME: &'static str = "lts_aom_mapping_rule";
    const CREATE_OK: &'static [u16] = &[201];
    const UPDATE_OK: &'static [u16] = &[200];

    fn create_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(
            SERVICE,
            region_of(ctx, state),
            "v2",
            MAPPING_PATH,
            &[("isBatch", state.fields.is_batch.as_str())],
        )?;
        Ok(ApiRequest::new(Method::POST, url).with_body(Self::rule_body(ctx, &state.fields)))
    }

    fn create_identity(
        body: &str,
        state: &ResourceState<Self::Fields>,
    ) -> Result<Option<String>, OperationError> {
        let rlt: Vec<CreatedRule> = decode(Self::TYPE_NAME, Action::Create, body)?;
        match rlt.into_iter().next() {
            Some(first) => Ok(Some(first.rule_id)),
            None => Err(OperationError::AlreadyCreated {
                kind: Self::TYPE_NAME,
                detail: format!("rule name {}", state.fields.rule_name),
            }),
        }
    }

    fn read_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(
            SERVICE,
            region_of(ctx, state),
            "v2",
            &["lts", "aom-mapping", state.id_str()],
            &[],
        )?;
        Ok(ApiRequest::new(Method::GET, url))
    }

    fn apply_read(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<ReadResult, OperationError> {
        let rlt: Vec<RuleRecord> = decode(Self::TYPE_NAME, Action::Read, body)?;
        let Some(record) = rlt.into_iter().next() else {
            return Ok(ReadResult::Gone);
        };

        let f = &mut state.fields;
        let mut setter = FieldSetter::new();
        setter.set("rule_name", &mut f.rule_name, record.rule_name);
        match record.rule_info {
            Some(info) => {
                setter.set("cluster_id", &mut f.cluster_id, info.cluster_id);
                setter.set("cluster_name", &mut f.cluster_name, info.cluster_name);
                setter.set_optional(&mut f.container_name, info.container_name);
                setter.set("deployments", &mut f.deployments, info.deployments);
            }
            None => setter.fail("rule_info", "missing in response"),
        }
        setter.finish(Self::TYPE_NAME)?;
        Ok(ReadResult::Applied)
    }

    fn update_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(SERVICE, region_of(ctx, state), "v2", MAPPING_PATH, &[])?;
        let mut body = Self::rule_body(ctx, &state.fields);
        body["rule_id"] = Value::String(state.id_str().to_string());
        Ok(ApiRequest::new(Method::POST, url).with_body(body))
    }

    fn delete_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(
            SERVICE,
            region_of(ctx, state),
            "v2",
            MAPPING_PATH,
            &[("id", state.id_str())],
        )?;
        Ok(ApiRequest::new(Method::DELETE, url))
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
        };
        ProviderContext::new(config.validate().unwrap()).unwrap()
    }

    fn state() -> ResourceState<AomMappingRuleFields> {
        ResourceState::new(AomMappingRuleFields {
            is_batch: "false".to_string(),
            rule_name: "rule-a".to_string(),
            cluster_id: "c-1".to_string(),
            cluster_name: "cce".to_string(),
            name_space: "default".to_string(),
            deployments: vec!["web".to_string()],
            files: vec![MappedFile {
                file_name: "/var/log/app.log".to_string(),
                log_stream_info: LogStreamTarget {
                    target_log_group_id: "g-1".to_string(),
                    target_log_group_name: "group".to_string(),
                    target_log_stream_id: "s-1".to_string(),
                    target_log_stream_name: "stream".to_string(),
                },
            }],
            container_name: None,
        })
    }

    #[test]
    fn test_create_request_shape() {
        let req = AomMappingRule::create_request(&ctx(), &state()).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.path(), "/v2/proj/lts/aom-mapping");
        assert_eq!(req.url.query(), Some("isBatch=false"));
        let body = req.body.unwrap();
        assert_eq!(body["project_id"], "proj");
        assert_eq!(body["rule_info"]["namespace"], "default");
        assert_eq!(
            body["rule_info"]["files"][0]["log_stream_info"]["target_log_stream_id"],
            "s-1"
        );
    }

    #[test]
    fn test_update_posts_full_rule_with_id() {
        let state = state().with_id("r-1");
        let req = AomMappingRule::update_request(&ctx(), &state).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.path(), "/v2/proj/lts/aom-mapping");
        let body = req.body.unwrap();
        assert_eq!(body["rule_id"], "r-1");
        assert_eq!(body["rule_name"], "rule-a");
    }

    #[test]
    fn test_read_writes_rule_info() {
        let mut state = state().with_id("r-1");
        let body = r#"[{"rule_name":"rule-b","rule_id":"r-1","rule_info":{"cluster_id":"c-2","cluster_name":"cce2","container_name":"app","deployments":["api"]}}]"#;
        assert_eq!(AomMappingRule::apply_read(body, &mut state).unwrap(), ReadResult::Applied);
        assert_eq!(state.fields.rule_name, "rule-b");
        assert_eq!(state.fields.cluster_id, "c-2");
        assert_eq!(state.fields.container_name.as_deref(), Some("app"));
        assert_eq!(state.fields.deployments, vec!["api".to_string()]);
    }

    #[test]
    fn test_read_empty_list_is_gone() {
        let mut state = state().with_id("r-1");
        assert_eq!(AomMappingRule::apply_read("[]", &mut state).unwrap(), ReadResult::Gone);
    }

    #[test]
    fn test_read_missing_rule_info_is_field_error() {
        let mut state = state().with_id("r-1");
        let err = AomMappingRule::apply_read(r#"[{"rule_name":"x"}]"#, &mut state).unwrap_err();
        assert!(matches!(err, OperationError::Fields { .. }));
    }
}
