//! UI-test conversion between automation frameworks
//!
//! Source tests are converted remotely, the converted code can be edited and
//! then run in a remote sandbox. When the sandbox publishes a trace file,
//! a link into the external trace viewer is derived and offered to the user;
//! it is only opened on request.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::bridge::{RemoteStageInvoker, RequestBody};
use crate::engine::error::{PipelineError, StageError};
use crate::engine::orchestrator::PipelineOrchestrator;
use crate::engine::platform::ExternalNavigation;
use crate::engine::report::{Reporter, Severity};
use crate::engine::result::StageResult;
use crate::engine::state::PipelineStatus;
use crate::workflow::{
    ConversionConfig, Endpoints, FieldUpdate, RemoteCall, StageSpec, WorkflowInput,
};

pub const SOURCE_CODE: &str = "sourceCode";
pub const CONVERTED_CODE: &str = "convertedCode";

/// A file published by the sandbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFile {
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

/// Response of the run-converted-code stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxRun {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub files: Vec<PublishedFile>,
}

/// Build the trace viewer link for a published artifact URL
pub fn trace_url(public_url: &str, trace_host: &str, trace_viewer: &str) -> String {
    let absolute = if public_url.starts_with('/') {
        format!("{}{}", trace_host.trim_end_matches('/'), public_url)
    } else {
        public_url.to_string()
    };
    format!("{}{}", trace_viewer, encode_component(&absolute))
}

/// Percent-encode a URI component, leaving `!'()*` literal as browsers do
fn encode_component(value: &str) -> String {
    const KEPT: [(&str, &str); 5] = [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ];
    KEPT.iter()
        .fold(urlencoding::encode(value).into_owned(), |encoded, (escaped, literal)| {
            encoded.replace(escaped, literal)
        })
}

#[derive(Debug, Default)]
struct Outputs {
    compile_message: String,
    run_message: String,
    trace_url: Option<String>,
}

pub struct ConversionWorkflow {
    orchestrator: PipelineOrchestrator,
    convert: StageSpec,
    compile: StageSpec,
    run: StageSpec,
    settings: ConversionConfig,
    navigation: Arc<dyn ExternalNavigation>,
    input: Mutex<WorkflowInput>,
    outputs: Mutex<Outputs>,
}

impl ConversionWorkflow {
    pub fn new(
        invoker: RemoteStageInvoker,
        endpoints: &Endpoints,
        settings: ConversionConfig,
        navigation: Arc<dyn ExternalNavigation>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            orchestrator: PipelineOrchestrator::new("ui-conversion", invoker, reporter),
            convert: endpoints.stage(RemoteCall::ConvertCode),
            compile: endpoints.stage(RemoteCall::CompileSource),
            run: endpoints.stage(RemoteCall::RunConvertedCode),
            settings,
            navigation,
            input: Mutex::new(Self::initial_input()),
            outputs: Mutex::new(Outputs::default()),
        }
    }

    pub fn initial_input() -> WorkflowInput {
        WorkflowInput::new()
            .with_text(SOURCE_CODE)
            .with_text(CONVERTED_CODE)
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

    pub fn converted_code(&self) -> String {
        self.lock_input().text(CONVERTED_CODE).to_string()
    }

    pub fn compile_message(&self) -> String {
        self.lock_outputs().compile_message.clone()
    }

    pub fn run_message(&self) -> String {
        self.lock_outputs().run_message.clone()
    }

    /// Viewer link for the last run's trace, if the sandbox published one
    pub fn trace_url(&self) -> Option<String> {
        self.lock_outputs().trace_url.clone()
    }

    /// Convert the source test into the target framework
    #[instrument(skip(self))]
    pub async fn convert(&self) -> Result<String, PipelineError> {
        let input = self.input();
        let body = RequestBody::Json(json!({ "seleniumCode": input.text(SOURCE_CODE) }));

        let mut run = self.orchestrator.start(&input, &[SOURCE_CODE]).await?;
        let converted = run.invoke(&self.convert, body).await?.display();

        self.lock_input()
            .apply(FieldUpdate::text(CONVERTED_CODE, converted.clone()))?;
        run.succeed(None);
        Ok(converted)
    }

    /// Compile the source test remotely and keep the compiler's message
    #[instrument(skip(self))]
    pub async fn compile_source(&self) -> Result<String, PipelineError> {
        let input = self.input();
        let body = RequestBody::Json(json!({ "code": input.text(SOURCE_CODE) }));

        let mut run = self.orchestrator.start(&input, &[SOURCE_CODE]).await?;
        let message = run.invoke(&self.compile, body).await?.display();

        self.lock_outputs().compile_message = message.clone();
        run.succeed(None);
        Ok(message)
    }

    /// Run the converted code in the sandbox and derive the trace link
    #[instrument(skip(self))]
    pub async fn run_converted(&self) -> Result<SandboxRun, PipelineError> {
        let input = self.input();
        let body = RequestBody::Json(json!({
            "code": input.text(CONVERTED_CODE),
            "language": self.settings.target_language,
        }));

        let mut run = self.orchestrator.start(&input, &[CONVERTED_CODE]).await?;
        let result = run.invoke(&self.run, body).await?;
        let sandbox = match decode_sandbox_run(&self.run, result) {
            Ok(sandbox) => sandbox,
            Err(e) => return Err(run.fail(PipelineError::Stage(e))),
        };

        let link = sandbox.files.first().map(|file| {
            trace_url(
                &file.public_url,
                &self.settings.trace_host,
                &self.settings.trace_viewer,
            )
        });
        if let Some(link) = &link {
            info!(trace = %link, "Trace available");
        }

        {
            let mut outputs = self.lock_outputs();
            outputs.run_message = sandbox.output.clone();
            outputs.trace_url = link;
        }
        run.succeed(None);
        Ok(sandbox)
    }

    /// Open the trace viewer for the last run in a separate browser context
    pub async fn open_trace(&self) -> Result<String, PipelineError> {
        let url = self.trace_url().ok_or(PipelineError::NoTrace)?;
        if let Err(e) = self.navigation.open_in_new_context(&url).await {
            let err = PipelineError::Navigation(e);
            self.orchestrator
                .reporter()
                .report(Severity::Error, &err.diagnostic());
            return Err(err);
        }
        Ok(url)
    }

    fn lock_input(&self) -> MutexGuard<'_, WorkflowInput> {
        self.input
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_outputs(&self) -> MutexGuard<'_, Outputs> {
        self.outputs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn decode_sandbox_run(spec: &StageSpec, result: StageResult) -> Result<SandboxRun, StageError> {
    let value = match result {
        StageResult::Json(value) => value,
        other => {
            return Err(StageError::DecodeFailure {
                stage: spec.name.clone(),
                message: format!("expected a JSON run report, got {}", other.kind()),
            })
        }
    };
    serde_json::from_value(value).map_err(|e| StageError::DecodeFailure {
        stage: spec.name.clone(),
        message: format!("unexpected run report: {}", e),
    })
}
