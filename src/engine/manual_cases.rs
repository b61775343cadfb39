//! Manual test-case generation
//!
//! One-shot pipeline: generate structured test cases from a user story, then
//! render them into a spreadsheet and save it. A successful run clears the
//! form so the same request is not resubmitted by accident.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;
use tracing::instrument;

use crate::bridge::{RemoteStageInvoker, RequestBody};
use crate::engine::error::PipelineError;
use crate::engine::exporter::{ArtifactExporter, ExportedArtifact};
use crate::engine::orchestrator::PipelineOrchestrator;
use crate::engine::platform::FilePersistence;
use crate::engine::report::Reporter;
use crate::engine::state::PipelineStatus;
use crate::workflow::{Endpoints, FieldUpdate, RemoteCall, StageSpec, WorkflowInput};

pub const APPLICATION_URL: &str = "applicationUrl";
pub const USER_STORY: &str = "userStory";
pub const ACCEPTANCE_CRITERIA: &str = "acceptanceCriteria";
pub const EPIC_STORY: &str = "epicStory";

/// Test-category toggles shared by the generation workflows
pub const TEST_CATEGORIES: [&str; 3] = ["positive", "negative", "edge"];

pub const REQUIRED_FIELDS: &[&str] = &[APPLICATION_URL, USER_STORY, ACCEPTANCE_CRITERIA];

pub struct ManualTestCaseWorkflow {
    orchestrator: PipelineOrchestrator,
    generate: StageSpec,
    exporter: ArtifactExporter,
    input: Mutex<WorkflowInput>,
}

impl ManualTestCaseWorkflow {
    pub fn new(
        invoker: RemoteStageInvoker,
        endpoints: &Endpoints,
        filename: &str,
        persistence: Arc<dyn FilePersistence>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            orchestrator: PipelineOrchestrator::new("manual-test-cases", invoker, reporter),
            generate: endpoints.stage(RemoteCall::GenerateTestCases),
            exporter: ArtifactExporter::new(
                endpoints.stage(RemoteCall::RenderArtifact),
                filename,
                persistence,
            ),
            input: Mutex::new(Self::initial_input()),
        }
    }

    /// The empty form
    pub fn initial_input() -> WorkflowInput {
        TEST_CATEGORIES.iter().fold(
            WorkflowInput::new()
                .with_text(APPLICATION_URL)
                .with_text(USER_STORY)
                .with_text(ACCEPTANCE_CRITERIA)
                .with_text(EPIC_STORY),
            |input, category| input.with_flag(category),
        )
    }

    pub fn update(&self, update: FieldUpdate) -> Result<(), PipelineError> {
        self.lock_input().apply(update)?;
        Ok(())
    }

    pub fn input(&self) -> WorkflowInput {
        self.lock_input().clone()
    }

    pub fn status(&self) -> PipelineStatus {
        self.orchestrator.status()
    }

    pub fn trigger_enabled(&self) -> bool {
        self.orchestrator.trigger_enabled()
    }

    pub fn filename(&self) -> &str {
        self.exporter.filename()
    }

    /// Generate test cases, render them and save the spreadsheet
    #[instrument(skip(self))]
    pub async fn generate_and_download(&self) -> Result<ExportedArtifact, PipelineError> {
        let input = self.input();
        let mut run = self.orchestrator.start(&input, REQUIRED_FIELDS).await?;

        let cases = run
            .invoke(&self.generate, RequestBody::Json(Self::request_body(&input)))
            .await?;
        let artifact = self.exporter.export(&mut run, &cases).await?;

        self.lock_input().reset();
        run.succeed(Some(&format!(
            "Test cases downloaded to {}",
            artifact.filename
        )));
        Ok(artifact)
    }

    fn request_body(input: &WorkflowInput) -> serde_json::Value {
        json!({
            "testType": input.flags_object(),
            "userStoryDescription": input.text(USER_STORY),
            "applicationUrl": input.text(APPLICATION_URL),
            "acceptanceCriteria": input.text(ACCEPTANCE_CRITERIA),
            "epicDescription": input.text(EPIC_STORY),
        })
    }

    fn lock_input(&self) -> MutexGuard<'_, WorkflowInput> {
        self.input
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
