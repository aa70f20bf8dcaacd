//! ELB log tank resource
//!
//! Ships a load balancer's access logs into an LTS log group/topic. Lives on
//! the ELB v3 API.

use super::{decode, region_of, FieldSetter, ReadResult, ResourceKind, ResourceState};
use crate::error::{Action, OperationError};
use crate::lts::client::ProviderContext;
use crate::lts::http::ApiRequest;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SERVICE: &str = "elb";
const LOGTANKS_PATH: &[&str] = &["elb", "logtanks"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElbLogFields {
    pub loadbalancer_id: String,
    pub log_group_id: String,
    pub log_topic_id: String,
}

#[derive(Debug, Deserialize)]
struct Logtank {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    loadbalancer_id: Option<String>,
    #[serde(default)]
    log_group_id: Option<String>,
    #[serde(default)]
    log_topic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogtankResponse {
    logtank: Logtank,
}

pub struct ElbLog;

impl ElbLog {
    fn item_url(
        ctx: &ProviderContext,
        state: &ResourceState<ElbLogFields>,
    ) -> Result<url::Url, url::ParseError> {
        ctx.url(
            SERVICE,
            region_of(ctx, state),
            "v3",
            &["elb", "logtanks", state.id_str()],
            &[],
        )
    }
}

impl ResourceKind for ElbLog {
    type Fields = ElbLogFields;

    const TYPE_NAME: &'static str = "lts_elb_log";
    const CREATE_OK: &'static [u16] = &[201];
    const UPDATE_OK: &'static [u16] = &[200];

    fn create_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let f = &state.fields;
        let url = ctx.url(SERVICE, region_of(ctx, state), "v3", LOGTANKS_PATH, &[])?;
        let body = json!({
            "logtank": {
                "loadbalancer_id": f.loadbalancer_id,
                "log_group_id": f.log_group_id,
                "log_topic_id": f.log_topic_id,
            }
        });
        Ok(ApiRequest::new(Method::POST, url).with_body(body))
    }

    fn create_identity(
        body: &str,
        _state: &ResourceState<Self::Fields>,
    ) -> Result<Option<String>, OperationError> {
        let rlt: LogtankResponse = decode(Self::TYPE_NAME, Action::Create, body)?;
        match rlt.logtank.id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(Some(id)),
            None => Err(OperationError::MissingIdentity {
                kind: Self::TYPE_NAME,
                action: Action::Create,
            }),
        }
    }

    fn read_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        Ok(ApiRequest::new(Method::GET, Self::item_url(ctx, state)?))
    }

    fn apply_read(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<ReadResult, OperationError> {
        let rlt: LogtankResponse = decode(Self::TYPE_NAME, Action::Read, body)?;
        let tank = rlt.logtank;

        let f = &mut state.fields;
        let mut setter = FieldSetter::new();
        setter.set("loadbalancer_id", &mut f.loadbalancer_id, tank.loadbalancer_id);
        setter.set("log_group_id", &mut f.log_group_id, tank.log_group_id);
        setter.set("log_topic_id", &mut f.log_topic_id, tank.log_topic_id);
        setter.finish(Self::TYPE_NAME)?;
        Ok(ReadResult::Applied)
    }

    fn update_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        let f = &state.fields;
        let body = json!({
            "logtank": {
                "log_group_id": f.log_group_id,
                "log_topic_id": f.log_topic_id,
            }
        });
        Ok(ApiRequest::new(Method::PUT, Self::item_url(ctx, state)?).with_body(body))
    }

    fn delete_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError> {
        Ok(ApiRequest::new(Method::DELETE, Self::item_url(ctx, state)?))
    }
}
