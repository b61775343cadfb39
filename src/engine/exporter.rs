//! Artifact export
//!
//! Renders a structured stage result into a binary file through the remote
//! rendering stage, then hands the bytes to local persistence under a fixed
//! filename. Runs only as the continuation of an in-flight pipeline run.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::bridge::RequestBody;
use crate::engine::error::{PipelineError, StageError};
use crate::engine::orchestrator::PipelineRun;
use crate::engine::platform::FilePersistence;
use crate::engine::result::StageResult;
use crate::workflow::StageSpec;

/// A file saved by the exporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArtifact {
    pub filename: String,
    pub location: String,
    pub size: usize,
}

pub struct ArtifactExporter {
    render: StageSpec,
    filename: String,
    persistence: Arc<dyn FilePersistence>,
}

impl ArtifactExporter {
    pub fn new(render: StageSpec, filename: &str, persistence: Arc<dyn FilePersistence>) -> Self {
        Self {
            render,
            filename: filename.to_string(),
            persistence,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Render `result` remotely and save it. Nothing is saved when rendering
    /// fails.
    pub(crate) async fn export(
        &self,
        run: &mut PipelineRun<'_>,
        result: &StageResult,
    ) -> Result<ExportedArtifact, PipelineError> {
        let rendered = run
            .invoke(&self.render, RequestBody::from_result(result))
            .await?;

        let bytes = match rendered {
            StageResult::Binary(bytes) => bytes,
            other => {
                return Err(run.fail(PipelineError::Stage(StageError::DecodeFailure {
                    stage: self.render.name.clone(),
                    message: format!("expected a binary artifact, got {}", other.kind()),
                })))
            }
        };

        let location = match self.persistence.save(&bytes, &self.filename).await {
            Ok(location) => location,
            Err(e) => return Err(run.fail(PipelineError::Persistence(e))),
        };

        info!(
            run_id = %run.run_id(),
            filename = %self.filename,
            bytes = bytes.len(),
            "Artifact exported"
        );

        Ok(ExportedArtifact {
            filename: self.filename.clone(),
            location,
            size: bytes.len(),
        })
    }
}

impl std::fmt::Debug for ArtifactExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactExporter")
            .field("render", &self.render)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}
