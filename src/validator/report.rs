//! Violation values and the reports that carry them.

use crate::catalog::TableKind;
use crate::error::ErrorCode;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One problem found in a draft.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    MissingField {
        field: String,
    },
    InvalidReference {
        field: String,
        table: TableKind,
        value: String,
    },
    InvalidValue {
        field: String,
        value: Value,
        reason: String,
        allowed: Vec<String>,
    },
    IncompatibleFields {
        field: String,
        other_field: String,
        reason: String,
    },
}

impl FieldError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FieldError::MissingField { .. } => ErrorCode::MissingField,
            FieldError::InvalidReference { .. } => ErrorCode::InvalidReference,
            FieldError::InvalidValue { .. } => ErrorCode::InvalidValue,
            FieldError::IncompatibleFields { .. } => ErrorCode::IncompatibleFields,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldError::MissingField { field }
            | FieldError::InvalidReference { field, .. }
            | FieldError::InvalidValue { field, .. }
            | FieldError::IncompatibleFields { field, .. } => field.as_str(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            FieldError::MissingField { field } => format!("{field} is required"),
            FieldError::InvalidReference {
                field,
                table,
                value,
            } => format!("{field} '{value}' does not exist in {table}"),
            FieldError::InvalidValue { field, reason, .. } => format!("{field}: {reason}"),
            FieldError::IncompatibleFields { reason, .. } => reason.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorRecord<'a> {
    code: ErrorCode,
    field: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    other_field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<TableKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "no_values")]
    allowed: &'a [String],
}

fn no_values(values: &&[String]) -> bool {
    values.is_empty()
}

impl Serialize for FieldError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut record = ErrorRecord {
            code: self.code(),
            field: self.field(),
            message: self.message(),
            other_field: None,
            table: None,
            value: None,
            allowed: &[],
        };
        match self {
            FieldError::MissingField { .. } => {}
            FieldError::InvalidReference { table, value, .. } => {
                record.table = Some(*table);
                record.value = Some(Value::String(value.clone()));
            }
            FieldError::InvalidValue { value, allowed, .. } => {
                record.value = Some(value.clone());
                record.allowed = allowed.as_slice();
            }
            FieldError::IncompatibleFields { other_field, .. } => {
                record.other_field = Some(other_field.as_str());
            }
        }
        record.serialize(serializer)
    }
}

/// Outcome of validating one step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub step: u8,
    pub key: String,
    pub title: String,
    pub valid: bool,
    /// Effective required fields after conditional rules.
    pub required_fields: Vec<String>,
    pub errors: Vec<FieldError>,
}

/// Outcome of validating all six steps.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingReport {
    pub valid: bool,
    pub steps: Vec<StepReport>,
}

impl ListingReport {
    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.steps.iter().flat_map(|step| step.errors.iter())
    }
}

/// Which fields of a step apply given the fields filled so far.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldRequirements {
    pub step: u8,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    /// Fields that may not carry a value in this context.
    pub excluded: Vec<String>,
}
