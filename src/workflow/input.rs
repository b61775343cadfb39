//! Workflow input records
//!
//! A `WorkflowInput` is the single record of everything the user has entered
//! on a page: named text fields and named boolean toggles. Fields are declared
//! once when the workflow is defined; afterwards the record only changes
//! through [`WorkflowInput::apply`], a reducer over [`FieldUpdate`] values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value held by one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Whether the value counts as "not provided" for validation purposes
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(set) => !set,
        }
    }

    fn cleared(&self) -> FieldValue {
        match self {
            FieldValue::Text(_) => FieldValue::Text(String::new()),
            FieldValue::Flag(_) => FieldValue::Flag(false),
        }
    }
}

/// A single edit applied to a `WorkflowInput`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    SetText { field: String, value: String },
    SetFlag { field: String, value: bool },
    Toggle(String),
}

impl FieldUpdate {
    pub fn text(field: &str, value: impl Into<String>) -> Self {
        FieldUpdate::SetText {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn flag(field: &str, value: bool) -> Self {
        FieldUpdate::SetFlag {
            field: field.to_string(),
            value,
        }
    }

    pub fn toggle(field: &str) -> Self {
        FieldUpdate::Toggle(field.to_string())
    }

    fn field(&self) -> &str {
        match self {
            FieldUpdate::SetText { field, .. }
            | FieldUpdate::SetFlag { field, .. }
            | FieldUpdate::Toggle(field) => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} holds a {expected} value")]
    WrongKind { field: String, expected: &'static str },
}

/// Named fields in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowInput {
    fields: Vec<(String, FieldValue)>,
}

impl WorkflowInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a text field, initially empty
    pub fn with_text(mut self, name: &str) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::Text(String::new())));
        self
    }

    /// Declare a boolean toggle, initially off
    pub fn with_flag(mut self, name: &str) -> Self {
        self.fields.push((name.to_string(), FieldValue::Flag(false)));
        self
    }

    /// Apply one edit in place
    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), InputError> {
        let name = update.field().to_string();
        let slot = self
            .fields
            .iter_mut()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
            .ok_or_else(|| InputError::UnknownField(name.clone()))?;

        match (slot, update) {
            (FieldValue::Text(current), FieldUpdate::SetText { value, .. }) => *current = value,
            (FieldValue::Flag(current), FieldUpdate::SetFlag { value, .. }) => *current = value,
            (FieldValue::Flag(current), FieldUpdate::Toggle(_)) => *current = !*current,
            (FieldValue::Text(_), _) => {
                return Err(InputError::WrongKind {
                    field: name,
                    expected: "text",
                })
            }
            (FieldValue::Flag(_), _) => {
                return Err(InputError::WrongKind {
                    field: name,
                    expected: "boolean",
                })
            }
        }
        Ok(())
    }

    /// Reducer form of [`apply`](Self::apply)
    pub fn reduce(mut self, update: FieldUpdate) -> Result<Self, InputError> {
        self.apply(update)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Text value of a field; empty for undeclared or boolean fields
    pub fn text(&self, name: &str) -> &str {
        match self.get(name) {
            Some(FieldValue::Text(text)) => text,
            _ => "",
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(FieldValue::Flag(true)))
    }

    /// Whether the named field is missing, empty, whitespace-only or off
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).map_or(true, FieldValue::is_blank)
    }

    /// Names of the toggles that are on, in declaration order
    pub fn selected_flags(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, value)| matches!(value, FieldValue::Flag(true)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All toggles as a JSON object of booleans
    pub fn flags_object(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|(name, value)| match value {
                FieldValue::Flag(set) => Some((name.clone(), Value::Bool(*set))),
                FieldValue::Text(_) => None,
            })
            .collect();
        Value::Object(map)
    }

    /// Clear every field back to its initial value
    pub fn reset(&mut self) {
        for (_, value) in &mut self.fields {
            *value = value.cleared();
        }
    }

    /// Clear only the named fields
    pub fn clear(&mut self, names: &[&str]) {
        for (name, value) in &mut self.fields {
            if names.contains(&name.as_str()) {
                *value = value.cleared();
            }
        }
    }

    /// Clear every boolean toggle
    pub fn clear_flags(&mut self) {
        for (_, value) in &mut self.fields {
            if let FieldValue::Flag(set) = value {
                *set = false;
            }
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}
