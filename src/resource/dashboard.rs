//! Dashboard resource
//!
//! Dashboards are created from templates against one log stream. Create and
//! update both answer with the list of dashboards they produced.

use super::{decode, region_of, without_nulls, FieldSetter, ReadResult, ResourceKind, ResourceState};
use crate::error::{Action, OperationError};
use crate::lts::client::ProviderContext;
use crate::lts::http::ApiRequest;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SERVICE: &str = "lts";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardFields {
    pub log_group_id: String,
    pub log_group_name: String,
    pub log_stream_id: String,
    pub log_stream_name: String,
    pub template_title: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_type: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Passed to delete: also remove the dashboard's charts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_delete_charts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DashboardRecord {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    last_update_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ReadDashboardResponse {
    #[serde(default)]
    results: Vec<DashboardRecord>,
}

pub struct Dashboard;

impl Dashboard {
    fn request_body(f: &DashboardFields) -> Value {
        without_nulls(json!({
            "log_group_id": f.log_group_id,
            "log_group_name": f.log_group_name,
            "log_stream_id": f.log_stream_id,
            "log_stream_name": f.log_stream_name,
            "template_title": f.template_title,
            "template_type": f.template_type,
            "group_name": f.group_name,
        }))
    }
}

impl ResourceKind for Dashboard {
    type Fields = DashboardFields;

    const TYPE_NAME: &'static str = "lts_dashboard";
    const CREATE_OK: &'static [u16] = &[201];
    const UPDATE_OK: &'static [u16] = &[200];

    fn create_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(SERVICE, region_of(ctx, state), "v2", &["lts", "template-dashboard"], &[])?;
        Ok(ApiRequest::new(Method::POST, url).with_body(Self::request_body(&state.fields)))
    }

    fn create_identity(
        body: &str,
        state: &ResourceState<Self::Fields>,
    ) -> Result<Option<String>, OperationError> {
        let rlt: Vec<DashboardRecord> = decode(Self::TYPE_NAME, Action::Create, body)?;
        match rlt.into_iter().next() {
            Some(first) => Ok(Some(first.id)),
            None => Err(OperationError::AlreadyCreated {
                kind: Self::TYPE_NAME,
                detail: format!("log stream name {}", state.fields.log_stream_name),
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
            &["dashboards"],
            &[("id", state.id_str())],
        )?;
        Ok(ApiRequest::new(Method::GET, url))
    }

    fn apply_read(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<ReadResult, OperationError> {
        let rlt: ReadDashboardResponse = decode(Self::TYPE_NAME, Action::Read, body)?;
        let Some(record) = rlt.results.into_iter().next() else {
            return Err(OperationError::EmptyResult {
                kind: Self::TYPE_NAME,
                action: Action::Read,
                id: state.id_str().to_string(),
            });
        };

        let f = &mut state.fields;
        let mut setter = FieldSetter::new();
        setter.set_optional(&mut f.title, record.title);
        if record.last_update_time.is_some() {
            setter.set_optional(&mut f.last_update_time, record.last_update_time);
        }
        setter.finish(Self::TYPE_NAME)?;
        Ok(ReadResult::Applied)
    }

    fn update_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let url = ctx.url(
            SERVICE,
            region_of(ctx, state),
            "v2",
            &["dashboard"],
            &[("id", state.id_str())],
        )?;
        Ok(ApiRequest::new(Method::PUT, url).with_body(Self::request_body(&state.fields)))
    }

    fn apply_update(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<(), OperationError> {
        let rlt: Vec<DashboardRecord> = decode(Self::TYPE_NAME, Action::Update, body)?;
        let Some(first) = rlt.into_iter().next() else {
            return Err(OperationError::EmptyResult {
                kind: Self::TYPE_NAME,
                action: Action::Update,
                id: state.id_str().to_string(),
            });
        };
        state.set_id(first.id);
        Ok(())
    }

    fn delete_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let mut query = Vec::with_capacity(2);
        if let Some(flag) = state.fields.is_delete_charts.as_deref() {
            query.push(("is_delete_charts", flag));
        }
        query.push(("id", state.id_str()));

        let url = ctx.url(SERVICE, region_of(ctx, state), "v2", &["dashboard"], &query)?;
        Ok(ApiRequest::new(Method::DELETE, url))
    }
}
