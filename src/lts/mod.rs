//! LTS API interaction module
//!
//! This module provides the transport side of the resource handlers: the
//! HTTP client, endpoint resolution and the shared provider context.
//!
//! # Module Structure
//!
//! - [`client`] - Provider context threaded into every resource operation
//! - [`endpoint`] - Service endpoint and URL building
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use ltsmap::lts::client::ProviderContext;
//!
//! fn example(config: ltsmap::config::ValidatedConfig) -> anyhow::Result<()> {
//!     let ctx = ProviderContext::new(config)?;
//!     let url = ctx.url("lts", "cn-north-4", "v2", &["lts", "aom-mapping"], &[])?;
//!     println!("{url}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoint;
pub mod http;
