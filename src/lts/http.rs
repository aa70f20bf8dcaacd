//! HTTP utilities for LTS REST API calls

use anyhow::{Context, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Content type sent on every request
pub const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF8";

/// Header carrying the IAM token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control() && c != ' ', "")
}

/// One outbound call: method, fully built URL and optional JSON body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Request payload as text, for error messages
    pub fn payload_text(&self) -> String {
        match &self.body {
            Some(body) => body.to_string(),
            None => self.url.to_string(),
        }
    }
}

/// Status and raw body of a completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// How a read response should be treated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Resource exists; body to decode
    Found(String),
    /// Resource no longer exists remotely
    Gone,
    /// Genuine failure
    Failed { status: u16, body: String },
}

/// Classify a read response into found / gone / failed
pub fn check_deleted(response: ApiResponse) -> ReadOutcome {
    match response.status {
        404 => ReadOutcome::Gone,
        status if (200..300).contains(&status) => ReadOutcome::Found(response.body),
        status => ReadOutcome::Failed {
            status,
            body: response.body,
        },
    }
}

/// HTTP client wrapper for LTS/ELB API calls
#[derive(Clone)]
pub struct LtsHttpClient {
    client: Client,
    auth_token: Option<String>,
}

impl LtsHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration, auth_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ltsmap/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, auth_token })
    }

    /// Send one request and collect status and body
    pub async fn send(&self, request: &ApiRequest) -> reqwest::Result<ApiResponse> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));

        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if status == 404 {
            tracing::debug!("API returned 404 for {}", request.url);
        } else if status >= 400 {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(ApiResponse { status, body })
    }
}
