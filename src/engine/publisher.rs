//! Branch publisher
//!
//! Pushes generated source to a branch of the team's repository. The dialog
//! moves through `closed -> loading_branches -> ready -> pushing -> closed`.
//! Branches are listed once per open; a listing failure is logged and leaves
//! the list empty, which in turn blocks the push locally.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::bridge::{RemoteStageInvoker, RequestBody};
use crate::engine::error::{PipelineError, StageError};
use crate::engine::report::{Reporter, Severity};
use crate::engine::result::StageResult;
use crate::workflow::{Endpoints, RemoteCall, StageSpec, ValidationResult};

const PUSH_REQUIREMENT: &str = "Please select a branch and enter a commit message.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherState {
    #[default]
    Closed,
    LoadingBranches,
    Ready,
    Pushing,
}

/// Selection state of one open dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSelection {
    /// Branch names in the order the service listed them
    pub branches: Vec<String>,
    pub selected: Option<String>,
    pub commit_message: String,
}

#[derive(Debug, Default)]
struct PublisherInner {
    state: PublisherState,
    selection: BranchSelection,
}

pub struct BranchPublisher {
    invoker: RemoteStageInvoker,
    reporter: Arc<dyn Reporter>,
    list: StageSpec,
    push: StageSpec,
    inner: Mutex<PublisherInner>,
}

impl BranchPublisher {
    pub fn new(
        invoker: RemoteStageInvoker,
        endpoints: &Endpoints,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            invoker,
            reporter,
            list: endpoints.stage(RemoteCall::ListBranches),
            push: endpoints.stage(RemoteCall::PushCode),
            inner: Mutex::new(PublisherInner::default()),
        }
    }

    pub fn state(&self) -> PublisherState {
        self.lock().state
    }

    pub fn selection(&self) -> BranchSelection {
        self.lock().selection.clone()
    }

    /// Open the dialog and fetch the branch list. Opening an already open
    /// dialog does nothing.
    #[instrument(skip(self))]
    pub async fn open(&self) {
        {
            let mut inner = self.lock();
            if inner.state != PublisherState::Closed {
                return;
            }
            inner.state = PublisherState::LoadingBranches;
            inner.selection = BranchSelection::default();
        }

        let branches = match self.invoker.invoke(&self.list, RequestBody::Empty).await {
            Ok(result) => match parse_branches(&self.list, &result) {
                Ok(branches) => branches,
                Err(e) => {
                    warn!(error = %e, "Could not read branch list");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "Error fetching branches");
                Vec::new()
            }
        };

        let mut inner = self.lock();
        if inner.state != PublisherState::LoadingBranches {
            return;
        }
        info!(count = branches.len(), "Branches loaded");
        inner.selection.selected = branches.first().cloned();
        inner.selection.branches = branches;
        inner.state = PublisherState::Ready;
    }

    /// Choose a branch from the listed ones
    pub fn select_branch(&self, branch: &str) -> bool {
        let mut inner = self.lock();
        if inner.state != PublisherState::Ready
            || !inner.selection.branches.iter().any(|b| b == branch)
        {
            return false;
        }
        inner.selection.selected = Some(branch.to_string());
        true
    }

    pub fn set_commit_message(&self, message: &str) -> bool {
        let mut inner = self.lock();
        if inner.state != PublisherState::Ready {
            return false;
        }
        inner.selection.commit_message = message.to_string();
        true
    }

    /// Close the dialog, discarding the selection. Ignored mid-push.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.state == PublisherState::Pushing {
            return;
        }
        inner.state = PublisherState::Closed;
        inner.selection = BranchSelection::default();
    }

    /// Push `source` to the selected branch. The dialog closes once the
    /// call settles, whatever the outcome.
    #[instrument(skip(self, source), fields(bytes = source.len()))]
    pub async fn push(&self, source: &str) -> Result<String, PipelineError> {
        let (branch, message) = {
            let mut inner = self.lock();
            match inner.state {
                PublisherState::Pushing => return Err(PipelineError::Busy),
                PublisherState::Ready => {}
                PublisherState::Closed | PublisherState::LoadingBranches => {
                    return Err(self.reject(vec!["branch"]));
                }
            }

            let mut missing = Vec::new();
            if inner.selection.selected.is_none() {
                missing.push("branch");
            }
            if inner.selection.commit_message.trim().is_empty() {
                missing.push("commitMessage");
            }
            if !missing.is_empty() {
                drop(inner);
                return Err(self.reject(missing));
            }

            inner.state = PublisherState::Pushing;
            (
                inner.selection.selected.clone().unwrap_or_default(),
                inner.selection.commit_message.clone(),
            )
        };

        info!(branch = %branch, "Pushing code");
        let body = RequestBody::Json(json!({
            "branch": branch,
            "commitMessage": message,
            "javaCode": source,
        }));
        let outcome = match self.invoker.invoke(&self.push, body).await {
            Ok(result) => {
                let confirmation = result.display();
                self.reporter.report(
                    Severity::Success,
                    &format!("Push Code Success: {}", confirmation),
                );
                Ok(confirmation)
            }
            Err(e) => {
                self.reporter.report(
                    Severity::Error,
                    &format!("Push Code failed: {}", e.diagnostic()),
                );
                Err(PipelineError::Stage(e))
            }
        };

        // Reported while still pushing; the dialog closes afterwards.
        let mut inner = self.lock();
        inner.state = PublisherState::Closed;
        inner.selection = BranchSelection::default();
        outcome
    }

    fn reject(&self, missing: Vec<&str>) -> PipelineError {
        let faults = ValidationResult::from_faults(&missing, PUSH_REQUIREMENT);
        self.reporter.report(Severity::Error, PUSH_REQUIREMENT);
        PipelineError::Validation(faults)
    }

    fn lock(&self) -> MutexGuard<'_, PublisherInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BranchPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchPublisher")
            .field("state", &self.state())
            .field("selection", &self.selection())
            .finish_non_exhaustive()
    }
}

fn parse_branches(spec: &StageSpec, result: &StageResult) -> Result<Vec<String>, StageError> {
    result
        .as_json()
        .cloned()
        .and_then(|value| serde_json::from_value::<Vec<String>>(value).ok())
        .ok_or_else(|| StageError::DecodeFailure {
            stage: spec.name.clone(),
            message: "expected a list of branch names".to_string(),
        })
}
