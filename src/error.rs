//! Error types
//!
//! Every failure is scoped to a single resource operation. The mapper turns
//! an [`OperationError`] into [`Diagnostics`] at the operation boundary so the
//! caller always gets a list of messages back, never a panic.

use std::fmt;
use thiserror::Error;

/// Which CRUD step produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// Noun used in "<kind> <noun> failed" messages
    pub fn failure_noun(self) -> &'static str {
        match self {
            Action::Create => "creation",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "deletion",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// A single failed write of a response field into state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field-write failures of one read, reported together
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} error(s) occurred:{}", .0.len(), bullet_list(.0))]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn bullet_list(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|err| format!("\n\t* {}: {}", err.field, err.message))
        .collect()
}

/// Failure of one CRUD operation against the remote API
#[derive(Debug, Error)]
pub enum OperationError {
    /// Request never produced a response (connect, TLS, timeout, body read)
    #[error("{kind} {} failed, request {payload}: {source}", .action.failure_noun())]
    Transport {
        kind: &'static str,
        action: Action,
        payload: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response status outside the kind's success set
    #[error("{kind} {} failed with status {status}, request {payload}: {body}", .action.failure_noun())]
    Status {
        kind: &'static str,
        action: Action,
        status: u16,
        payload: String,
        body: String,
    },

    /// Body was not the JSON shape the kind expects
    #[error(
        "{kind} {} failed, request {payload}: error decoding response {body}: {source}",
        .action.failure_noun()
    )]
    Decode {
        kind: &'static str,
        action: Action,
        payload: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// One or more response fields could not be written back
    #[error("error setting {kind} fields: {source}")]
    Fields {
        kind: &'static str,
        #[source]
        source: FieldErrors,
    },

    /// Create answered success with an empty record list
    #[error("error {kind} resource has been created: {detail}")]
    AlreadyCreated { kind: &'static str, detail: String },

    /// Remote record lookup came back empty where one was required
    #[error("error {action} {kind} {id}: no record returned")]
    EmptyResult {
        kind: &'static str,
        action: Action,
        id: String,
    },

    /// Operation needs an identity the resource doesn't have
    #[error("error {action} {kind}: resource has no identity")]
    MissingIdentity { kind: &'static str, action: Action },

    /// Endpoint or path could not be turned into a URL
    #[error("error building {kind} URL: {message}")]
    Url { kind: &'static str, message: String },
}

impl OperationError {
    /// Attach the request payload to a decode failure
    pub(crate) fn with_payload(self, request_payload: String) -> Self {
        match self {
            OperationError::Decode {
                kind,
                action,
                body,
                source,
                ..
            } => OperationError::Decode {
                kind,
                action,
                payload: request_payload,
                body,
                source,
            },
            other => other,
        }
    }
}

/// Failure loading or validating the provider configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid endpoint for service {service} ({value}): {message}")]
    Endpoint {
        service: String,
        value: String,
        message: String,
    },

    #[error("invalid region {0:?}")]
    Region(String),
}

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One message reported back to the caller of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}", label, self.summary)
    }
}

/// Result of a resource operation: empty means success
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self(vec![Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
        }])
    }

    pub fn push_warning(&mut self, summary: impl Into<String>) {
        self.0.push(Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl From<OperationError> for Diagnostics {
    fn from(err: OperationError) -> Self {
        Diagnostics::error(err.to_string())
    }
}

impl From<Result<(), OperationError>> for Diagnostics {
    fn from(result: Result<(), OperationError>) -> Self {
        match result {
            Ok(()) => Diagnostics::new(),
            Err(err) => err.into(),
        }
    }
}
