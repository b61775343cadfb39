//! Pipeline execution engine module
//!
//! This module contains:
//! - `orchestrator` - single-in-flight pipeline runs over remote stages
//! - `error` - stage, platform and pipeline error types
//! - `result` - decoded stage results
//! - `state` - pipeline state and status snapshots
//! - `exporter` - render-and-save of generated artifacts
//! - `publisher` - branch listing and code push dialog
//! - `report` - user-facing message sinks
//! - `platform` - file persistence and external navigation capabilities
//! - `manual_cases`, `api_tests`, `conversion` - the three workflows
//! - `console` - assembly of the workflows over one transport

pub mod console;
pub mod conversion;
pub mod error;
pub mod exporter;
pub mod manual_cases;
pub mod orchestrator;
pub mod platform;
pub mod publisher;
pub mod report;
pub mod result;
pub mod state;

pub use api_tests::ApiTestWorkflow;
pub use console::Console;
pub use conversion::{trace_url, ConversionWorkflow, PublishedFile, SandboxRun};
pub use error::{PipelineError, PlatformError, StageError};
pub use exporter::{ArtifactExporter, ExportedArtifact};
pub use manual_cases::ManualTestCaseWorkflow;
pub use orchestrator::{PipelineOrchestrator, PipelineRun, PipelineStage};
pub use platform::{DownloadDirectory, ExternalNavigation, FilePersistence, PrintLink, SystemBrowser};
pub use publisher::{BranchPublisher, BranchSelection, PublisherState};
pub use report::{
    FanoutReporter, MemoryReporter, ReportEntry, ReportEvent, Reporter, Severity, TracingReporter,
};
pub use result::StageResult;
pub use state::{PipelineState, PipelineStatus};
