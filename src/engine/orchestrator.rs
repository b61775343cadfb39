//! Pipeline Orchestrator - sequences remote stages for one workflow
//!
//! This is the core that every page-level workflow is built on:
//! 1. Rejects a trigger while a run is in flight (no queuing)
//! 2. Validates the workflow input before any remote call
//! 3. Issues stages strictly in order, feeding each result to the next stage
//! 4. Stops at the first failed stage and surfaces its diagnostic
//! 5. Records the terminal state for the front end to render

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, instrument, warn};

use crate::bridge::{RemoteStageInvoker, RequestBody};
use crate::engine::error::PipelineError;
use crate::engine::report::{Reporter, Severity};
use crate::engine::result::StageResult;
use crate::engine::state::{PipelineState, PipelineStatus};
use crate::workflow::{validate, StageSpec, ValidationResult, WorkflowInput};

type ChainFn = dyn Fn(&StageResult) -> RequestBody + Send + Sync;

enum StageBody {
    Fixed(RequestBody),
    Chained(Box<ChainFn>),
}

/// One step of a pipeline: a stage spec plus how to build its request body
pub struct PipelineStage {
    spec: StageSpec,
    body: StageBody,
}

impl PipelineStage {
    /// Stage whose body comes from current input only
    pub fn new(spec: StageSpec, body: RequestBody) -> Self {
        Self {
            spec,
            body: StageBody::Fixed(body),
        }
    }

    /// Stage whose body is built from the previous stage's result
    pub fn chained<F>(spec: StageSpec, build: F) -> Self
    where
        F: Fn(&StageResult) -> RequestBody + Send + Sync + 'static,
    {
        Self {
            spec,
            body: StageBody::Chained(Box::new(build)),
        }
    }

    /// Stage that sends the previous result unchanged
    pub fn forwarding(spec: StageSpec) -> Self {
        Self::chained(spec, RequestBody::from_result)
    }

    pub fn spec(&self) -> &StageSpec {
        &self.spec
    }

    fn request_body(&self, previous: Option<&StageResult>) -> RequestBody {
        match (&self.body, previous) {
            (StageBody::Fixed(body), _) => body.clone(),
            (StageBody::Chained(build), Some(previous)) => build(previous),
            (StageBody::Chained(_), None) => RequestBody::Empty,
        }
    }
}

impl std::fmt::Debug for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStage")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Owns the state machine of a single workflow
pub struct PipelineOrchestrator {
    name: String,
    invoker: RemoteStageInvoker,
    reporter: Arc<dyn Reporter>,
    status: Mutex<PipelineStatus>,
}

impl PipelineOrchestrator {
    pub fn new(name: &str, invoker: RemoteStageInvoker, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            name: name.to_string(),
            invoker,
            reporter,
            status: Mutex::new(PipelineStatus::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoker(&self) -> &RemoteStageInvoker {
        &self.invoker
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    pub fn status(&self) -> PipelineStatus {
        self.lock().clone()
    }

    pub fn state(&self) -> PipelineState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// Whether the triggering control accepts input
    pub fn trigger_enabled(&self) -> bool {
        self.lock().trigger_enabled()
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn faults(&self) -> ValidationResult {
        self.lock().faults.clone()
    }

    /// Explicit reset to idle. Has no effect while a run is in flight.
    pub fn reset(&self) -> bool {
        let mut status = self.lock();
        if status.state == PipelineState::Running {
            return false;
        }
        status.clear();
        debug!(pipeline = %self.name, "Pipeline reset to idle");
        true
    }

    /// Gate a trigger and enter `running`.
    ///
    /// A trigger while running returns `Busy` without touching any state. A
    /// validation failure sets the faults and the error surface, then asks
    /// the reporter to reveal it once that state is committed.
    pub async fn start(
        &self,
        input: &WorkflowInput,
        required: &[&str],
    ) -> Result<PipelineRun<'_>, PipelineError> {
        if self.is_running() {
            debug!(pipeline = %self.name, "Trigger ignored: run in progress");
            return Err(PipelineError::Busy);
        }

        let validation = validate(input, required);
        if !validation.is_valid() {
            let message = validation.message.clone().unwrap_or_default();
            {
                let mut status = self.lock();
                status.faults = validation.clone();
                status.error = Some(message.clone());
                status.notice = None;
            }
            warn!(
                pipeline = %self.name,
                fields = ?validation.faulted_fields(),
                "Validation failed"
            );
            self.reporter.report(Severity::Error, &message);

            // The error surface exists only once the state above is applied.
            tokio::task::yield_now().await;
            self.reporter.reveal();

            return Err(PipelineError::Validation(validation));
        }

        self.begin(validation)
    }

    fn begin(&self, validation: ValidationResult) -> Result<PipelineRun<'_>, PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        {
            let mut status = self.lock();
            if status.state == PipelineState::Running {
                return Err(PipelineError::Busy);
            }
            status.state = PipelineState::Running;
            status.error = None;
            status.faults = validation;
            status.notice = None;
            status.completed_stages.clear();
            status.run_id = Some(run_id.clone());
        }
        info!(pipeline = %self.name, run_id = %run_id, "Pipeline running");

        Ok(PipelineRun {
            orchestrator: self,
            run_id,
            finished: false,
        })
    }

    /// Validate, then run `stages` in order. The last stage's result is
    /// returned on success.
    #[instrument(skip_all, fields(pipeline = %self.name, stages = stages.len()))]
    pub async fn run_pipeline(
        &self,
        input: &WorkflowInput,
        required: &[&str],
        stages: Vec<PipelineStage>,
    ) -> Result<StageResult, PipelineError> {
        let mut run = self.start(input, required).await?;
        let result = run.run_stages(stages).await?;
        run.succeed(None);
        Ok(result)
    }

    fn lock(&self) -> MutexGuard<'_, PipelineStatus> {
        self.status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// An in-flight run. Dropping it without `succeed` or `fail` returns the
/// pipeline to idle.
pub struct PipelineRun<'a> {
    orchestrator: &'a PipelineOrchestrator,
    run_id: String,
    finished: bool,
}

impl<'a> PipelineRun<'a> {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Issue one stage. A failure ends the run in `failed`.
    pub async fn invoke(
        &mut self,
        spec: &StageSpec,
        body: RequestBody,
    ) -> Result<StageResult, PipelineError> {
        info!(run_id = %self.run_id, stage = %spec.name, "Stage issued");

        match self.orchestrator.invoker.invoke(spec, body).await {
            Ok(result) => {
                self.orchestrator
                    .lock()
                    .completed_stages
                    .push(spec.name.clone());
                info!(
                    run_id = %self.run_id,
                    stage = %spec.name,
                    kind = result.kind(),
                    "Stage completed"
                );
                Ok(result)
            }
            Err(e) => Err(self.fail(PipelineError::Stage(e))),
        }
    }

    /// Issue `stages` strictly in sequence, each after the previous settled
    pub async fn run_stages(
        &mut self,
        stages: Vec<PipelineStage>,
    ) -> Result<StageResult, PipelineError> {
        let mut previous: Option<StageResult> = None;
        for stage in stages {
            let body = stage.request_body(previous.as_ref());
            previous = Some(self.invoke(&stage.spec, body).await?);
        }
        match previous {
            Some(result) => Ok(result),
            None => Err(self.fail(PipelineError::EmptyPipeline)),
        }
    }

    /// End the run in `failed` with `error` as the only visible message
    pub fn fail(&mut self, error: PipelineError) -> PipelineError {
        let message = error.diagnostic();
        {
            let mut status = self.orchestrator.lock();
            status.state = PipelineState::Failed;
            status.error = Some(message.clone());
            status.notice = None;
        }
        self.finished = true;

        error!(
            pipeline = %self.orchestrator.name,
            run_id = %self.run_id,
            error = %error,
            "Pipeline failed"
        );
        self.orchestrator.reporter.report(Severity::Error, &message);
        error
    }

    /// End the run in `succeeded`, optionally posting a notice
    pub fn succeed(mut self, notice: Option<&str>) {
        {
            let mut status = self.orchestrator.lock();
            status.state = PipelineState::Succeeded;
            status.error = None;
            status.notice = notice.map(str::to_string);
        }
        self.finished = true;

        info!(
            pipeline = %self.orchestrator.name,
            run_id = %self.run_id,
            "Pipeline succeeded"
        );
        if let Some(notice) = notice {
            self.orchestrator.reporter.report(Severity::Success, notice);
        }
    }
}

impl Drop for PipelineRun<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(run_id = %self.run_id, "Run abandoned before completion");
            let mut status = self.orchestrator.lock();
            if status.state == PipelineState::Running {
                status.state = PipelineState::Idle;
            }
        }
    }
}
