//! Stage definitions
//!
//! Every remote call the console can make is listed in [`RemoteCall`], with
//! its fixed HTTP method and the format its success body is decoded as. A
//! [`StageSpec`] binds a call to the path configured for it.

use serde::{Deserialize, Serialize};

use crate::bridge::HttpMethod;

/// How a successful response body is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedFormat {
    Text,
    Json,
    Binary,
}

/// The remote calls offered by the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteCall {
    GenerateTestCases,
    RenderArtifact,
    ParseSpecification,
    GenerateCode,
    ExecuteCode,
    ConvertCode,
    CompileSource,
    RunConvertedCode,
    ListBranches,
    PushCode,
}

impl RemoteCall {
    pub const ALL: [RemoteCall; 10] = [
        RemoteCall::GenerateTestCases,
        RemoteCall::RenderArtifact,
        RemoteCall::ParseSpecification,
        RemoteCall::GenerateCode,
        RemoteCall::ExecuteCode,
        RemoteCall::ConvertCode,
        RemoteCall::CompileSource,
        RemoteCall::RunConvertedCode,
        RemoteCall::ListBranches,
        RemoteCall::PushCode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RemoteCall::GenerateTestCases => "generate-test-cases",
            RemoteCall::RenderArtifact => "render-artifact",
            RemoteCall::ParseSpecification => "parse-specification",
            RemoteCall::GenerateCode => "generate-code",
            RemoteCall::ExecuteCode => "execute-code",
            RemoteCall::ConvertCode => "convert-code",
            RemoteCall::CompileSource => "compile-source",
            RemoteCall::RunConvertedCode => "run-converted-code",
            RemoteCall::ListBranches => "list-branches",
            RemoteCall::PushCode => "push-code",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            RemoteCall::ListBranches => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    pub fn format(&self) -> ExpectedFormat {
        match self {
            RemoteCall::GenerateTestCases
            | RemoteCall::ExecuteCode
            | RemoteCall::RunConvertedCode
            | RemoteCall::ListBranches => ExpectedFormat::Json,
            RemoteCall::RenderArtifact => ExpectedFormat::Binary,
            RemoteCall::ParseSpecification
            | RemoteCall::GenerateCode
            | RemoteCall::ConvertCode
            | RemoteCall::CompileSource
            | RemoteCall::PushCode => ExpectedFormat::Text,
        }
    }
}

impl std::fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One remote call bound to a concrete path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub format: ExpectedFormat,
}

impl StageSpec {
    pub fn new(name: &str, method: HttpMethod, path: &str, format: ExpectedFormat) -> Self {
        Self {
            name: name.to_string(),
            method,
            path: path.to_string(),
            format,
        }
    }

    /// Spec for a catalogued call at the given path
    pub fn for_call(call: RemoteCall, path: &str) -> Self {
        Self::new(call.name(), call.method(), path, call.format())
    }
}
