//! Workflow definitions
//!
//! This module contains the declarative side of every workflow:
//! - `input` - WorkflowInput records and the FieldUpdate reducer
//! - `validation` - required-field checks producing ValidationResult
//! - `stage` - the catalogue of remote calls and StageSpec
//! - `config` - service, endpoint, conversion and export configuration

pub mod config;
pub mod input;
pub mod stage;
pub mod validation;

pub use config::{
    ConfigError, ConsoleConfig, ConversionConfig, Endpoints, ExportConfig, WebAuthConfig,
    WebConfig,
};
pub use input::{FieldUpdate, FieldValue, InputError, WorkflowInput};
pub use stage::{ExpectedFormat, RemoteCall, StageSpec};
pub use validation::{validate, ValidationResult};
