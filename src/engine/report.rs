//! User-facing reporting sinks
//!
//! The orchestrator never picks a presentation channel itself. It calls
//! [`Reporter::report`] with a severity and one message, and
//! [`Reporter::reveal`] once the message must be brought into view.
//!
//! Sinks provided here:
//! - `TracingReporter` - forwards everything to `tracing`
//! - `MemoryReporter` - keeps an inline banner, a toast history and the
//!   reveal requests, for embedding front ends and tests
//! - `FanoutReporter` - forwards to several sinks

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

pub trait Reporter: Send + Sync {
    fn report(&self, severity: Severity, message: &str);

    /// Bring the current error surface into view. Called only after the
    /// state carrying the message has been committed.
    fn reveal(&self) {}
}

/// Log sink
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => error!(%severity, "{}", message),
            Severity::Info | Severity::Success => info!(%severity, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub severity: Severity,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Observable events in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Reported(Severity, String),
    Revealed,
}

#[derive(Debug, Default)]
struct MemoryState {
    banner: Option<String>,
    toasts: Vec<ReportEntry>,
    events: Vec<ReportEvent>,
}

/// In-memory sink: errors replace the inline banner, everything else
/// becomes a toast
#[derive(Debug, Default)]
pub struct MemoryReporter {
    state: Mutex<MemoryState>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current inline error banner
    pub fn banner(&self) -> Option<String> {
        self.lock().banner.clone()
    }

    pub fn toasts(&self) -> Vec<ReportEntry> {
        self.lock().toasts.clone()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().events.clone()
    }

    pub fn reveal_count(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| matches!(e, ReportEvent::Revealed))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, severity: Severity, message: &str) {
        let mut state = self.lock();
        state
            .events
            .push(ReportEvent::Reported(severity, message.to_string()));
        match severity {
            Severity::Error => state.banner = Some(message.to_string()),
            Severity::Info | Severity::Success => state.toasts.push(ReportEntry {
                severity,
                message: message.to_string(),
                at: Utc::now(),
            }),
        }
    }

    fn reveal(&self) {
        self.lock().events.push(ReportEvent::Revealed);
    }
}

/// Forwards to every inner sink in order
#[derive(Default, Clone)]
pub struct FanoutReporter {
    sinks: Vec<Arc<dyn Reporter>>,
}

impl FanoutReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Reporter>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Reporter for FanoutReporter {
    fn report(&self, severity: Severity, message: &str) {
        for sink in &self.sinks {
            sink.report(severity, message);
        }
    }

    fn reveal(&self) {
        for sink in &self.sinks {
            sink.reveal();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_replace_banner() {
        let reporter = MemoryReporter::new();
        reporter.report(Severity::Error, "first");
        reporter.report(Severity::Error, "second");

        assert_eq!(reporter.banner().as_deref(), Some("second"));
        assert!(reporter.toasts().is_empty());
    }

    #[test]
    fn test_success_becomes_toast() {
        let reporter = MemoryReporter::new();
        reporter.report(Severity::Success, "saved");

        let toasts = reporter.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Success);
        assert!(reporter.banner().is_none());
    }

    #[test]
    fn test_fanout_forwards_reveal() {
        let a = Arc::new(MemoryReporter::new());
        let b = Arc::new(MemoryReporter::new());
        let fanout = FanoutReporter::new().with(a.clone()).with(b.clone());

        fanout.report(Severity::Error, "boom");
        fanout.reveal();

        for sink in [a, b] {
            assert_eq!(
                sink.events(),
                vec![
                    ReportEvent::Reported(Severity::Error, "boom".into()),
                    ReportEvent::Revealed
                ]
            );
        }
    }
}
