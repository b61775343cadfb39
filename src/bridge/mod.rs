//! Outbound communication with the generation service
//!
//! This module provides:
//! - `Transport`: the seam every remote call goes through
//! - `web`: the reqwest-backed transport used against the real service
//! - `invoker`: single-call invocation with uniform error translation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod invoker;
pub mod web;

pub use invoker::RemoteStageInvoker;
pub use web::WebBridge;

use crate::engine::result::StageResult;

/// Transport-level failures: no usable response was obtained
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to build client: {0}")]
    StartupFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to read response body: {0}")]
    BodyRead(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an outbound request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Bytes(Vec<u8>),
    /// Single-file form upload
    Multipart {
        field: String,
        filename: String,
        content: Vec<u8>,
    },
}

impl RequestBody {
    /// Forward a prior stage's result as the next request body
    pub fn from_result(result: &StageResult) -> Self {
        match result {
            StageResult::Json(value) => RequestBody::Json(value.clone()),
            StageResult::Text(text) => RequestBody::Json(Value::String(text.clone())),
            StageResult::Binary(bytes) => RequestBody::Bytes(bytes.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: RequestBody,
}

impl RemoteRequest {
    pub fn new(method: HttpMethod, path: &str, body: RequestBody) -> Self {
        Self {
            method,
            path: path.to_string(),
            body,
        }
    }
}

/// Raw response as received, before any decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub elapsed_ms: u64,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            elapsed_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A channel capable of issuing one request and returning its raw response
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue exactly one request. Errors mean no response was obtained.
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, BridgeError>;
}
