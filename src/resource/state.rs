//! Resource state
//!
//! Typed declared state for one resource plus the identity assigned by the
//! remote service, and the aggregator used when writing response fields back.

use crate::error::{FieldError, FieldErrors, OperationError};
use serde::{Deserialize, Serialize};

/// Declared fields and identity of one managed resource
///
/// Serialized flat: `id` and `region` sit next to the kind's own fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState<F> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> ResourceState<F> {
    /// New, absent resource
    pub fn new(fields: F) -> Self {
        Self {
            id: None,
            region: None,
            fields,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_present(&self) -> bool {
        self.id.as_deref().map(|id| !id.is_empty()).unwrap_or(false)
    }

    /// Identity, or empty string when absent
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.id.as_deref() != Some(id.as_str()) {
            tracing::info!("identity assigned: {}", id);
        }
        self.id = Some(id);
    }

    pub fn clear_id(&mut self) {
        if let Some(id) = self.id.take() {
            tracing::info!("identity cleared: {}", id);
        }
    }
}

/// Collects field writes so every failure is reported, not just the first
#[derive(Debug, Default)]
pub struct FieldSetter {
    errors: Vec<FieldError>,
}

impl FieldSetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value the response must carry; a missing one is recorded
    /// as an error and the target keeps its previous value
    pub fn set<T>(&mut self, field: &'static str, target: &mut T, value: Option<T>) {
        match value {
            Some(v) => *target = v,
            None => self.fail(field, "missing in response"),
        }
    }

    /// Write a computed or optional value as returned, absence included
    pub fn set_optional<T>(&mut self, target: &mut Option<T>, value: Option<T>) {
        *target = value;
    }

    pub fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Turn collected failures into one combined error
    pub fn finish(self, kind: &'static str) -> Result<(), OperationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(OperationError::Fields {
                kind,
                source: FieldErrors(self.errors),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        #[serde(default)]
        note: Option<String>,
    }

    #[test]
    fn test_state_serializes_flat() {
        let state = ResourceState::new(Sample {
            name: "a".to_string(),
            note: None,
        })
        .with_id("id-1");
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["id"], "id-1");
        assert_eq!(value["name"], "a");
        assert!(value.get("region").is_none());
    }

    #[test]
    fn test_missing_required_field_fails_decode() {
        let err = serde_json::from_str::<ResourceState<Sample>>(r#"{"id":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_setter_aggregates_all_failures() {
        let mut name = "old".to_string();
        let mut other = "old".to_string();
        let mut setter = FieldSetter::new();
        setter.set("name", &mut name, None);
        setter.set("other", &mut other, None);
        let err = setter.finish("lts_test").unwrap_err();
        match err {
            OperationError::Fields { source, .. } => assert_eq!(source.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(name, "old");
    }

    #[test]
    fn test_setter_writes_values() {
        let mut name = String::new();
        let mut note = Some("stale".to_string());
        let mut setter = FieldSetter::new();
        setter.set("name", &mut name, Some("new".to_string()));
        setter.set_optional(&mut note, None);
        assert!(setter.finish("lts_test").is_ok());
        assert_eq!(name, "new");
        assert!(note.is_none());
    }

    #[test]
    fn test_clear_id_makes_absent() {
        let mut state = ResourceState::new(Sample::default()).with_id("x");
        assert!(state.is_present());
        state.clear_id();
        assert!(!state.is_present());
        state.clear_id();
        assert!(state.id.is_none());
    }
}
