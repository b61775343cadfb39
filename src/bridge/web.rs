//! Web/HTTP Bridge - reqwest transport for the generation service
//!
//! This bridge issues requests directly using reqwest. It supports:
//! - GET and POST methods
//! - JSON, raw byte and single-file multipart bodies
//! - Authentication (Bearer, Basic, API Key)
//! - Custom default headers
//!
//! Requests are never retried, and no timeout is applied unless one is
//! configured explicitly.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{BridgeError, HttpMethod, RemoteRequest, RemoteResponse, RequestBody, Transport};
use crate::workflow::{WebAuthConfig, WebConfig};

#[derive(Debug)]
pub struct WebBridge {
    config: WebConfig,
    client: reqwest::Client,
}

impl WebBridge {
    pub fn new(config: WebConfig) -> Result<Self, BridgeError> {
        let mut client_builder = reqwest::Client::builder().redirect(if config.follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        });

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(Duration::from_millis(timeout));
        }

        if !config.validate_ssl {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| BridgeError::StartupFailed(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn from_config(config: &WebConfig) -> Result<Self, BridgeError> {
        Self::new(config.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}{}", base, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth {
            Some(WebAuthConfig::Bearer { token }) => {
                request.header("Authorization", format!("Bearer {}", token))
            }
            Some(WebAuthConfig::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(WebAuthConfig::ApiKey { header, key }) => request.header(header, key),
            None => request,
        }
    }

    fn apply_headers(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        request
    }

    fn apply_body(request: reqwest::RequestBuilder, body: RequestBody) -> reqwest::RequestBuilder {
        match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Bytes(bytes) => request
                .header("Content-Type", "application/octet-stream")
                .body(bytes),
            RequestBody::Multipart {
                field,
                filename,
                content,
            } => {
                let part = reqwest::multipart::Part::bytes(content).file_name(filename);
                request.multipart(reqwest::multipart::Form::new().part(field, part))
            }
        }
    }
}

#[async_trait]
impl Transport for WebBridge {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, BridgeError> {
        let url = self.build_url(&request.path);
        let start = Instant::now();

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        let builder = self.apply_headers(self.apply_auth(builder));
        let builder = Self::apply_body(builder, request.body);

        debug!("Executing {} {}", request.method, url);

        let response = builder.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            BridgeError::RequestFailed(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::BodyRead(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!("{} {} -> {} ({}ms)", request.method, url, status, elapsed_ms);

        Ok(RemoteResponse {
            status,
            body: body.to_vec(),
            elapsed_ms,
        })
    }
}
