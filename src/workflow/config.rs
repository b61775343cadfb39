//! Console configuration
//!
//! Loaded from a YAML file; every section is optional and falls back to the
//! defaults of a locally running generation service:
//!
//! ```yaml
//! service:
//!   base_url: "http://localhost:8080"
//!   headers:
//!     X-Team: qa
//!   auth:
//!     type: bearer
//!     token: "..."
//!
//! endpoints:
//!   generate_test_cases: /api/generateTestCases
//!
//! conversion:
//!   target_language: javascript
//!   trace_host: "https://try.playwright.tech"
//!   trace_viewer: "https://trace.playwright.dev/?trace="
//!
//! export:
//!   filename: test_cases.xlsx
//!   download_dir: ./downloads
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::stage::{RemoteCall, StageSpec};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },
}

// ============================================================================
// Service Connection
// ============================================================================

/// HTTP connection settings for the generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Base URL for API requests (e.g., "http://localhost:8080")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default headers to include in all requests
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in milliseconds; none by default
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Authentication configuration
    pub auth: Option<WebAuthConfig>,

    /// Whether to follow redirects (default: true)
    #[serde(default = "default_true")]
    pub follow_redirects: bool,

    /// Whether to validate SSL certificates (default: true)
    #[serde(default = "default_true")]
    pub validate_ssl: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            headers: HashMap::new(),
            timeout: None,
            auth: None,
            follow_redirects: true,
            validate_ssl: true,
        }
    }
}

/// Authentication configuration for service requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebAuthConfig {
    /// Bearer token authentication
    Bearer { token: String },
    /// Basic authentication
    Basic { username: String, password: String },
    /// API key authentication
    ApiKey { header: String, key: String },
}

// ============================================================================
// Endpoints
// ============================================================================

/// Path of every remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub generate_test_cases: String,
    pub render_artifact: String,
    pub parse_specification: String,
    pub generate_code: String,
    pub execute_code: String,
    pub convert_code: String,
    pub compile_source: String,
    pub run_converted_code: String,
    pub list_branches: String,
    pub push_code: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            generate_test_cases: "/api/generateTestCases".to_string(),
            render_artifact: "/api/downloadTestCases".to_string(),
            parse_specification: "/api/parseSwagger".to_string(),
            generate_code: "/api/generateTests".to_string(),
            execute_code: "/api/runTests".to_string(),
            convert_code: "/api/convert/seleniumToPlaywright".to_string(),
            compile_source: "/api/convert/compileSelenium".to_string(),
            run_converted_code: "/api/convert/runPlaywrightProxy".to_string(),
            list_branches: "/api/github/branches".to_string(),
            push_code: "/api/github/pushCode".to_string(),
        }
    }
}

impl Endpoints {
    pub fn path(&self, call: RemoteCall) -> &str {
        match call {
            RemoteCall::GenerateTestCases => &self.generate_test_cases,
            RemoteCall::RenderArtifact => &self.render_artifact,
            RemoteCall::ParseSpecification => &self.parse_specification,
            RemoteCall::GenerateCode => &self.generate_code,
            RemoteCall::ExecuteCode => &self.execute_code,
            RemoteCall::ConvertCode => &self.convert_code,
            RemoteCall::CompileSource => &self.compile_source,
            RemoteCall::RunConvertedCode => &self.run_converted_code,
            RemoteCall::ListBranches => &self.list_branches,
            RemoteCall::PushCode => &self.push_code,
        }
    }

    /// Stage spec for `call` at its configured path
    pub fn stage(&self, call: RemoteCall) -> StageSpec {
        StageSpec::for_call(call, self.path(call))
    }
}

// ============================================================================
// Conversion & Export
// ============================================================================

/// Settings for running converted UI tests and linking their traces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Language tag sent with converted code
    pub target_language: String,

    /// Host prefixed to relative artifact URLs
    pub trace_host: String,

    /// Viewer URL the encoded artifact URL is appended to
    pub trace_viewer: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            target_language: "javascript".to_string(),
            trace_host: "https://try.playwright.tech".to_string(),
            trace_viewer: "https://trace.playwright.dev/?trace=".to_string(),
        }
    }
}

/// Where rendered artifacts are saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub filename: String,
    pub download_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: "test_cases.xlsx".to_string(),
            download_dir: PathBuf::from("."),
        }
    }
}

// ============================================================================
// Top Level
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub service: WebConfig,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl ConsoleConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|error| ConfigError::Yaml {
            file: path.display().to_string(),
            error,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
