//! ltsmap - CRUD-to-REST mapping for Log Tank Service resources
//!
//! Create, read, update and delete structuring templates, dashboards, AOM
//! access-mapping rules and ELB log tanks through one generic flow. See
//! [`resource`] for the flow and [`lts`] for the transport.

pub mod config;
pub mod error;
pub mod lts;
pub mod resource;

pub use error::{Diagnostic, Diagnostics, OperationError};
pub use lts::client::ProviderContext;
pub use resource::{mapper, ResourceKind, ResourceState};
