//! Structuring template resource
//!
//! A custom template goes to the v2 API with split parsing on a fixed demo
//! line; a named system template goes to v3 by id/type/name. The template
//! itself is looked up by log group and stream, and its identity comes from
//! that lookup rather than from the create response.

use super::escape::unescape_body;
use super::{decode, region_of, without_nulls, FieldSetter, ReadResult, ResourceKind, ResourceState};
use crate::error::{Action, OperationError};
use crate::lts::client::ProviderContext;
use crate::lts::http::ApiRequest;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Discriminator value selecting the custom (v2) template API
pub const CUSTOM_TEMPLATE_TYPE: &str = "custom";

/// Sample log line sent with custom templates
pub const DEMO_CONTENT: &str =
    "127.0.0.1 10.142.203.101 8080 [18/Aug/2021:15:14:33 +0800] GET /apm HTTP/1.1 404 86 6";

const SERVICE: &str = "lts";
const TEMPLATE_PATH: &[&str] = &["lts", "struct", "template"];

/// One parsed field of the demo log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_analysis: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

/// Tag field attached to structured logs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_analysis: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructTemplateFields {
    pub log_group_id: String,
    pub log_stream_id: String,
    pub template_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub demo_fields: Vec<DemoField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_fields: Vec<TagField>,
    /// Computed by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_log: Option<String>,
}

impl StructTemplateFields {
    pub fn is_custom(&self) -> bool {
        self.template_type == CUSTOM_TEMPLATE_TYPE
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowTemplateResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    demo_log: Option<String>,
    #[serde(default)]
    log_group_id: Option<String>,
    #[serde(default)]
    log_stream_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateId {
    #[serde(default)]
    id: Option<String>,
}

pub struct StructTemplate;

impl ResourceKind for StructTemplate {
    type Fields = StructTemplateFields;

    const TYPE_NAME: &'static str = "lts_struct_template";
    const CREATE_OK: &'static [u16] = &[200, 201];
    const UPDATE_OK: &'static [u16] = &[201];

    fn create_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let f = &state.fields;
        let region = region_of(ctx, state);

        let (version, body) = if f.is_custom() {
            let body = json!({
                "log_group_id": f.log_group_id,
                "log_stream_id": f.log_stream_id,
                "project_id": f.project_id,
                "parse_type": "split",
                "tokenizer": " ",
                "content": DEMO_CONTENT,
                "regex_rules": f.regex_rules,
                "layers": f.layers,
                "log_format": f.log_format,
                "demo_fields": f.demo_fields,
                "tag_fields": f.tag_fields,
            });
            ("v2", body)
        } else {
            let body = json!({
                "log_group_id": f.log_group_id,
                "log_stream_id": f.log_stream_id,
                "project_id": f.project_id,
                "template_id": f.template_id,
                "template_type": f.template_type,
                "template_name": f.template_name,
            });
            ("v3", body)
        };

        let url = ctx.url(SERVICE, region, version, TEMPLATE_PATH, &[])?;
        Ok(ApiRequest::new(Method::POST, url).with_body(without_nulls(body)))
    }

    fn create_identity(
        body: &str,
        _state: &ResourceState<Self::Fields>,
    ) -> Result<Option<String>, OperationError> {
        // Identity normally arrives with the follow-up lookup
        let id = serde_json::from_str::<TemplateId>(body)
            .ok()
            .and_then(|r| r.id)
            .filter(|id| !id.is_empty());
        Ok(id)
    }

    fn read_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let f = &state.fields;
        let url = ctx.url(
            SERVICE,
            region_of(ctx, state),
            "v2",
            TEMPLATE_PATH,
            &[
                ("logGroupId", f.log_group_id.as_str()),
                ("logStreamId", f.log_stream_id.as_str()),
            ],
        )?;
        Ok(ApiRequest::new(Method::GET, url))
    }

    fn apply_read(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<ReadResult, OperationError> {
        let unescaped = unescape_body(body);
        let rlt: ShowTemplateResponse = decode(Self::TYPE_NAME, Action::Read, &unescaped)?;

        match rlt.id.filter(|id| !id.is_empty()) {
            Some(id) => state.set_id(id),
            None => return Ok(ReadResult::Gone),
        }

        let f = &mut state.fields;
        let mut setter = FieldSetter::new();
        setter.set_optional(&mut f.demo_log, rlt.demo_log);
        setter.set("log_group_id", &mut f.log_group_id, rlt.log_group_id);
        setter.set("log_stream_id", &mut f.log_stream_id, rlt.log_stream_id);
        setter.finish(Self::TYPE_NAME)?;
        Ok(ReadResult::Applied)
    }

    fn update_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let f = &state.fields;
        let url = ctx.url(SERVICE, region_of(ctx, state), "v2", TEMPLATE_PATH, &[])?;
        let body = json!({
            "log_group_id": f.log_group_id,
            "log_stream_id": f.log_stream_id,
            "template_id": f.template_id,
            "template_type": f.template_type,
            "template_name": f.template_name,
        });
        Ok(ApiRequest::new(Method::PUT, url).with_body(without_nulls(body)))
    }

    fn apply_update(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<(), OperationError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        let rlt: TemplateId = decode(Self::TYPE_NAME, Action::Update, body)?;
        if let Some(id) = rlt.id.filter(|id| !id.is_empty()) {
            state.set_id(id);
        }
        Ok(())
    }

    fn delete_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(SERVICE, region_of(ctx, state), "v2", TEMPLATE_PATH, &[])?;
        Ok(ApiRequest::new(Method::DELETE, url).with_body(json!({ "id": state.id_str() })))
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

    fn fields(template_type: &str) -> StructTemplateFields {
        StructTemplateFields {
            log_group_id: "group-1".to_string(),
            log_stream_id: "stream-1".to_string(),
            template_type: template_type.to_string(),
            template_id: Some("tpl-9".to_string()),
            template_name: Some("ELB".to_string()),
            ..StructTemplateFields::default()
        }
    }

    #[test]
    fn test_custom_template_uses_v2_split() {
        let state = ResourceState::new(fields("custom"));
        let req = StructTemplate::create_request(&ctx(), &state).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.path(), "/v2/proj/lts/struct/template");
        let body = req.body.unwrap();
        assert_eq!(body["parse_type"], "split");
        assert_eq!(body["tokenizer"], " ");
        assert_eq!(body["content"], DEMO_CONTENT);
        assert!(body.get("template_id").is_none());
    }

    #[test]
    fn test_named_template_uses_v3() {
        let state = ResourceState::new(fields("built_in"));
        let req = StructTemplate::create_request(&ctx(), &state).unwrap();
        assert_eq!(req.url.path(), "/v3/proj/lts/struct/template");
        let body = req.body.unwrap();
        assert_eq!(body["template_id"], "tpl-9");
        assert_eq!(body["template_type"], "built_in");
        assert_eq!(body["template_name"], "ELB");
        assert!(body.get("parse_type").is_none());
    }

    #[test]
    fn test_read_queries_by_group_and_stream() {
        let state = ResourceState::new(fields("custom"));
        let req = StructTemplate::read_request(&ctx(), &state).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.query(), Some("logGroupId=group-1&logStreamId=stream-1"));
    }

    #[test]
    fn test_apply_read_unescapes_and_sets_identity() {
        let mut state = ResourceState::new(fields("custom"));
        let body = r#""{\"id\":\"tpl-1\",\"demoLog\":\"GET /apm\",\"logGroupId\":\"group-1\",\"logStreamId\":\"stream-1\"}""#;
        let result = StructTemplate::apply_read(body, &mut state).unwrap();
        assert_eq!(result, ReadResult::Applied);
        assert_eq!(state.id.as_deref(), Some("tpl-1"));
        assert_eq!(state.fields.demo_log.as_deref(), Some("GET /apm"));
    }

    #[test]
    fn test_apply_read_reports_all_missing_fields() {
        let mut state = ResourceState::new(fields("custom"));
        let err = StructTemplate::apply_read(r#""{\"id\":\"tpl-1\"}""#, &mut state).unwrap_err();
        match err {
            OperationError::Fields { source, .. } => assert_eq!(source.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delete_sends_id_in_body() {
        let state = ResourceState::new(fields("custom")).with_id("tpl-1");
        let req = StructTemplate::delete_request(&ctx(), &state).unwrap();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.body.unwrap(), json!({"id": "tpl-1"}));
    }
}
