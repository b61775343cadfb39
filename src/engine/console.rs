//! Console assembly
//!
//! Wires one transport, one reporter and the platform capabilities into the
//! three workflows so callers deal with a single handle.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::bridge::{BridgeError, RemoteStageInvoker, Transport, WebBridge};
use crate::engine::api_tests::ApiTestWorkflow;
use crate::engine::conversion::ConversionWorkflow;
use crate::engine::manual_cases::ManualTestCaseWorkflow;
use crate::engine::platform::{
    DownloadDirectory, ExternalNavigation, FilePersistence, PrintLink, SystemBrowser,
};
use crate::engine::report::{Reporter, TracingReporter};
use crate::workflow::ConsoleConfig;

pub struct Console {
    config: ConsoleConfig,
    reporter: Arc<dyn Reporter>,
    manual_cases: ManualTestCaseWorkflow,
    api_tests: ApiTestWorkflow,
    conversion: ConversionWorkflow,
}

impl Console {
    /// Build a console talking HTTP to the configured service
    pub fn from_config(config: ConsoleConfig) -> Result<Self, BridgeError> {
        let transport: Arc<dyn Transport> = Arc::new(WebBridge::from_config(&config.service)?);
        let persistence: Arc<dyn FilePersistence> =
            Arc::new(DownloadDirectory::new(config.export.download_dir.clone()));
        let navigation: Arc<dyn ExternalNavigation> = match SystemBrowser::detect() {
            Ok(browser) => Arc::new(browser),
            Err(e) => {
                warn!(error = %e, "No browser opener found, links will be printed");
                Arc::new(PrintLink)
            }
        };

        Ok(Self::with_transport(
            config,
            transport,
            Arc::new(TracingReporter),
            persistence,
            navigation,
        ))
    }

    pub fn with_transport(
        config: ConsoleConfig,
        transport: Arc<dyn Transport>,
        reporter: Arc<dyn Reporter>,
        persistence: Arc<dyn FilePersistence>,
        navigation: Arc<dyn ExternalNavigation>,
    ) -> Self {
        debug!(base_url = %config.service.base_url, "Assembling console");
        let invoker = RemoteStageInvoker::new(transport);
        let endpoints = &config.endpoints;

        let manual_cases = ManualTestCaseWorkflow::new(
            invoker.clone(),
            endpoints,
            &config.export.filename,
            persistence,
            reporter.clone(),
        );
        let api_tests = ApiTestWorkflow::new(invoker.clone(), endpoints, reporter.clone());
        let conversion = ConversionWorkflow::new(
            invoker,
            endpoints,
            config.conversion.clone(),
            navigation,
            reporter.clone(),
        );

        Self {
            config,
            reporter,
            manual_cases,
            api_tests,
            conversion,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    pub fn manual_cases(&self) -> &ManualTestCaseWorkflow {
        &self.manual_cases
    }

    pub fn api_tests(&self) -> &ApiTestWorkflow {
        &self.api_tests
    }

    pub fn conversion(&self) -> &ConversionWorkflow {
        &self.conversion
    }
}
