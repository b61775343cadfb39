#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use genai_automation::bridge::{BridgeError, RemoteRequest, RemoteResponse, Transport};
use genai_automation::engine::{
    Console, ExternalNavigation, FilePersistence, MemoryReporter, PlatformError,
};
use genai_automation::workflow::ConsoleConfig;
use tempfile::TempDir;
use tokio::sync::Notify;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("console.yaml");
    std::fs::write(&path, content).expect("Failed to write console.yaml");
    path
}

type Reply = Result<RemoteResponse, String>;

/// Answers each path from a queue of canned replies and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(path, Ok(RemoteResponse::new(status, body)));
        self
    }

    pub fn json(self, path: &str, value: serde_json::Value) -> Self {
        self.respond(path, 200, value.to_string())
    }

    /// The call to `path` gets no response at all
    pub fn unreachable(self, path: &str) -> Self {
        self.push(path, Err("connection refused".to_string()));
        self
    }

    fn push(&self, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn last_to(&self, path: &str) -> Option<RemoteRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, BridgeError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        let reply = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(|queue| queue.pop_front());
        match reply {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(BridgeError::RequestFailed(message)),
            None => Err(BridgeError::RequestFailed(format!("no route for {}", path))),
        }
    }
}

/// Holds the first request to one path until released
pub struct GatedTransport {
    inner: ScriptedTransport,
    path: String,
    gated: AtomicBool,
    entered: Notify,
    gate: Notify,
}

impl GatedTransport {
    pub fn new(inner: ScriptedTransport, path: &str) -> Self {
        Self {
            inner,
            path: path.to_string(),
            gated: AtomicBool::new(true),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once the gated request is waiting
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn inner(&self) -> &ScriptedTransport {
        &self.inner
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, BridgeError> {
        if request.path == self.path && self.gated.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        self.inner.send(request).await
    }
}

/// Keeps saved artifacts in memory
#[derive(Default)]
pub struct RecordingPersistence {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl FilePersistence for RecordingPersistence {
    async fn save(&self, data: &[u8], filename: &str) -> Result<String, PlatformError> {
        if self.fail {
            return Err(PlatformError::Other("disk full".to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), data.to_vec()));
        Ok(format!("memory://{}", filename))
    }
}

/// Records opened links
#[derive(Default)]
pub struct RecordingNavigation {
    opened: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExternalNavigation for RecordingNavigation {
    async fn open_in_new_context(&self, url: &str) -> Result<(), PlatformError> {
        if self.fail {
            return Err(PlatformError::NoOpener("xdg-open".to_string()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// A console over fakes, with handles to inspect them
pub struct Harness {
    pub console: Console,
    pub reporter: Arc<MemoryReporter>,
    pub persistence: Arc<RecordingPersistence>,
    pub navigation: Arc<RecordingNavigation>,
}

pub fn harness(transport: Arc<dyn Transport>) -> Harness {
    harness_with(
        transport,
        RecordingPersistence::new(),
        RecordingNavigation::new(),
    )
}

pub fn harness_with(
    transport: Arc<dyn Transport>,
    persistence: RecordingPersistence,
    navigation: RecordingNavigation,
) -> Harness {
    let reporter = Arc::new(MemoryReporter::new());
    let persistence = Arc::new(persistence);
    let navigation = Arc::new(navigation);
    let console = Console::with_transport(
        ConsoleConfig::default(),
        transport,
        reporter.clone(),
        persistence.clone(),
        navigation.clone(),
    );
    Harness {
        console,
        reporter,
        persistence,
        navigation,
    }
}
