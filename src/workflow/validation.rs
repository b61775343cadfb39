//! Pre-flight validation of required fields
//!
//! Validation is pure: it inspects a `WorkflowInput` against a fixed set of
//! mandatory field names and returns a fresh `ValidationResult`. A result
//! with any fault blocks the pipeline before a single remote call is made.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::input::WorkflowInput;

/// Field-level faults from one validation attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Every checked field, `true` when faulted
    pub faults: BTreeMap<String, bool>,

    /// Single aggregate message, present only when invalid
    pub message: Option<String>,
}

impl ValidationResult {
    /// Build a result from an explicit list of faulted fields
    pub fn from_faults(fields: &[&str], message: impl Into<String>) -> Self {
        let faults: BTreeMap<String, bool> =
            fields.iter().map(|f| (f.to_string(), true)).collect();
        let message = if faults.is_empty() {
            None
        } else {
            Some(message.into())
        };
        Self { faults, message }
    }

    pub fn is_valid(&self) -> bool {
        !self.faults.values().any(|faulted| *faulted)
    }

    pub fn is_faulted(&self, field: &str) -> bool {
        self.faults.get(field).copied().unwrap_or(false)
    }

    /// Names of faulted fields, sorted
    pub fn faulted_fields(&self) -> Vec<&str> {
        self.faults
            .iter()
            .filter(|(_, faulted)| **faulted)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => f.write_str("valid"),
        }
    }
}

/// Check that every field in `required` holds a non-blank value
pub fn validate(input: &WorkflowInput, required: &[&str]) -> ValidationResult {
    let faults: BTreeMap<String, bool> = required
        .iter()
        .map(|field| (field.to_string(), input.is_blank(field)))
        .collect();

    let missing: Vec<&str> = faults
        .iter()
        .filter(|(_, faulted)| **faulted)
        .map(|(name, _)| name.as_str())
        .collect();

    let message = if missing.is_empty() {
        None
    } else {
        Some(format!(
            "Please fill in the required fields: {}",
            missing.join(", ")
        ))
    };

    ValidationResult { faults, message }
}
