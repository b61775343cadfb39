//! # GenAI Automation
//!
//! Client-side orchestration for a GenAI test-automation service: input
//! records are validated locally, then driven through one or more remote
//! generation, execution or rendering stages.
//!
//! ## Features
//!
//! - **Single-in-flight pipelines** - a second trigger while a run is active
//!   has no effect
//! - **Local validation** - required fields are checked before anything is
//!   sent, and the offending fields are flagged
//! - **Steerable stages** - intermediate outputs can be edited before the
//!   next stage is triggered
//! - **Artifact export** - generated cases are rendered into a spreadsheet and
//!   saved locally
//! - **Branch publishing** - generated code can be pushed to a repository
//!   branch
//!
//! ## Workflows
//!
//! - **Manual test cases**: user story in, spreadsheet out
//! - **API tests**: specification -> summary -> test code -> execution report
//! - **UI conversion**: convert, compile and run UI tests, then view the trace
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use genai_automation::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let console = Console::from_config(ConsoleConfig::default())?;
//!     let cases = console.manual_cases();
//!
//!     cases.update(FieldUpdate::text("applicationUrl", "https://shop.example"))?;
//!     cases.update(FieldUpdate::text("userStory", "As a shopper I can pay by card"))?;
//!     cases.update(FieldUpdate::text("acceptanceCriteria", "Receipt is emailed"))?;
//!     cases.update(FieldUpdate::toggle("negative"))?;
//!
//!     let artifact = cases.generate_and_download().await?;
//!     println!("Saved {}", artifact.location);
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod engine;
pub mod workflow;

// Re-export main types
pub use bridge::{
    BridgeError, HttpMethod, RemoteRequest, RemoteResponse, RemoteStageInvoker, RequestBody,
    Transport, WebBridge,
};
pub use engine::{
    ApiTestWorkflow, ArtifactExporter, BranchPublisher, Console, ConversionWorkflow,
    ExportedArtifact, ManualTestCaseWorkflow, PipelineError, PipelineOrchestrator, PipelineRun,
    PipelineStage, PipelineState, PipelineStatus, PlatformError, StageError, StageResult,
};
pub use workflow::{
    validate, ConfigError, ConsoleConfig, Endpoints, FieldUpdate, FieldValue, InputError,
    RemoteCall, StageSpec, ValidationResult, WorkflowInput,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bridge::{RemoteStageInvoker, RequestBody, Transport, WebBridge};
    pub use crate::engine::{
        ApiTestWorkflow, BranchPublisher, Console, ConversionWorkflow, ExternalNavigation,
        FilePersistence, ManualTestCaseWorkflow, PipelineError, PipelineOrchestrator,
        PipelineStage, PipelineState, Reporter, Severity, StageError, StageResult,
    };
    pub use crate::workflow::{
        ConsoleConfig, Endpoints, FieldUpdate, RemoteCall, StageSpec, ValidationResult,
        WorkflowInput,
    };
}
