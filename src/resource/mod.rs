//! Resource abstraction layer
//!
//! Every managed resource kind follows the same create/read/update/delete
//! flow against the LTS (or ELB) REST API. The flow lives once in
//! [`mapper`]; each kind only supplies its mapping table by implementing
//! [`ResourceKind`].
//!
//! # Architecture
//!
//! - [`mapper`] - Generic CRUD flow returning diagnostics
//! - [`state`] - Typed resource state and response field aggregation
//! - [`escape`] - Body unescaping for the structuring-template read
//! - [`struct_template`], [`aom_mapping`], [`dashboard`], [`elb_log`] - Kinds
//!
//! # Example
//!
//! ```ignore
//! use ltsmap::resource::{mapper, elb_log::{ElbLog, ElbLogFields}, ResourceState};
//!
//! async fn example(ctx: &ltsmap::lts::client::ProviderContext) {
//!     let mut state = ResourceState::new(ElbLogFields {
//!         loadbalancer_id: "lb-1".into(),
//!         log_group_id: "g-1".into(),
//!         log_topic_id: "t-1".into(),
//!     });
//!     let diags = mapper::create::<ElbLog>(ctx, &mut state).await;
//!     assert!(!diags.has_errors());
//! }
//! ```

pub mod aom_mapping;
pub mod dashboard;
pub mod elb_log;
pub mod escape;
pub mod mapper;
pub mod state;
pub mod struct_template;

pub use state::{FieldSetter, ResourceState};

use crate::error::{Action, OperationError};
use crate::lts::client::ProviderContext;
use crate::lts::http::ApiRequest;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

/// Outcome of applying a read response to state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    Applied,
    /// Response says the record no longer exists
    Gone,
}

/// Mapping table for one resource kind
pub trait ResourceKind {
    /// Declared fields of this kind
    type Fields: Debug + Clone + Serialize + DeserializeOwned;

    /// Type name used in messages and logs
    const TYPE_NAME: &'static str;

    /// Statuses that mean the create call succeeded
    const CREATE_OK: &'static [u16];

    /// Statuses that mean the update call succeeded
    const UPDATE_OK: &'static [u16];

    /// Statuses that mean the delete call succeeded
    const DELETE_OK: &'static [u16] = &[200, 204];

    fn create_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError>;

    /// Identity carried by a successful create response, if the API returns one
    fn create_identity(
        body: &str,
        state: &ResourceState<Self::Fields>,
    ) -> Result<Option<String>, OperationError>;

    fn read_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError>;

    /// Write response fields back into state
    fn apply_read(
        body: &str,
        state: &mut ResourceState<Self::Fields>,
    ) -> Result<ReadResult, OperationError>;

    fn update_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError>;

    /// Apply a successful update response; most kinds ignore it
    fn apply_update(
        _body: &str,
        _state: &mut ResourceState<Self::Fields>,
    ) -> Result<(), OperationError> {
        Ok(())
    }

    fn delete_request(
        ctx: &ProviderContext,
        state: &ResourceState<Self::Fields>,
    ) -> Result<ApiRequest, url::ParseError>;
}

/// Decode a response body into the kind's response shape
pub(crate) fn decode<T: DeserializeOwned>(
    kind: &'static str,
    action: Action,
    body: &str,
) -> Result<T, OperationError> {
    serde_json::from_str(body).map_err(|source| OperationError::Decode {
        kind,
        action,
        payload: String::new(),
        body: body.to_string(),
        source,
    })
}

/// Drop `null` members so unset optional fields are omitted from payloads
pub(crate) fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(without_nulls).collect()),
        other => other,
    }
}

/// Region to call for a resource
pub(crate) fn region_of<'a, F>(ctx: &'a ProviderContext, state: &'a ResourceState<F>) -> &'a str {
    ctx.region(state.region.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_without_nulls_is_recursive() {
        let value = json!({
            "a": null,
            "b": {"c": null, "d": 1},
            "e": [{"f": null, "g": "x"}]
        });
        assert_eq!(
            without_nulls(value),
            json!({"b": {"d": 1}, "e": [{"g": "x"}]})
        );
    }

    #[test]
    fn test_decode_error_carries_body() {
        let err = decode::<Vec<String>>("lts_dashboard", Action::Create, "not json").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("not json"));
        assert!(text.contains("lts_dashboard"));
    }
}
