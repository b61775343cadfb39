//! Single remote stage invocation
//!
//! `RemoteStageInvoker` turns one `StageSpec` plus a request body into exactly
//! one transport call and translates the outcome:
//! - no response at all -> `StageError::TransportFailure`
//! - non-2xx status -> `StageError::RemoteRejected` carrying the body as text
//! - 2xx body not matching the expected format -> `StageError::DecodeFailure`

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{RemoteRequest, RemoteResponse, RequestBody, Transport};
use crate::engine::error::StageError;
use crate::engine::result::StageResult;
use crate::workflow::{ExpectedFormat, StageSpec};

#[derive(Clone)]
pub struct RemoteStageInvoker {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RemoteStageInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStageInvoker").finish_non_exhaustive()
    }
}

impl RemoteStageInvoker {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue the stage's call once and decode its success body
    #[instrument(skip(self, body), fields(stage = %spec.name, path = %spec.path))]
    pub async fn invoke(
        &self,
        spec: &StageSpec,
        body: RequestBody,
    ) -> Result<StageResult, StageError> {
        let request = RemoteRequest::new(spec.method, &spec.path, body);

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(error = %e, "No response from remote stage");
            StageError::TransportFailure {
                stage: spec.name.clone(),
                message: e.to_string(),
            }
        })?;

        if !response.is_success() {
            let body = response.text();
            warn!(status = response.status, "Remote stage rejected the request");
            return Err(StageError::RemoteRejected {
                stage: spec.name.clone(),
                status: response.status,
                body,
            });
        }

        debug!(
            status = response.status,
            bytes = response.body.len(),
            elapsed_ms = response.elapsed_ms,
            "Remote stage responded"
        );
        decode(spec, response)
    }
}

/// Decode a success body per the stage's expected format
pub fn decode(spec: &StageSpec, response: RemoteResponse) -> Result<StageResult, StageError> {
    match spec.format {
        ExpectedFormat::Binary => Ok(StageResult::Binary(response.body)),
        ExpectedFormat::Text => String::from_utf8(response.body)
            .map(StageResult::Text)
            .map_err(|e| StageError::DecodeFailure {
                stage: spec.name.clone(),
                message: format!("response is not valid UTF-8 text: {}", e),
            }),
        ExpectedFormat::Json => serde_json::from_slice(&response.body)
            .map(StageResult::Json)
            .map_err(|e| StageError::DecodeFailure {
                stage: spec.name.clone(),
                message: format!("response is not valid JSON: {}", e),
            }),
    }
}
