//! Typed errors for catalog lookups and step selection, plus the wire codes
//! shared by every tool response.

use crate::catalog::TableKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("no {table} record with id '{id}'")]
    NotFound { table: TableKind, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("step {0} is outside 1..=6")]
    InvalidStep(i64),
}

/// Machine-readable code carried in `error.code` and per-violation entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    MissingField,
    InvalidReference,
    InvalidValue,
    IncompatibleFields,
    InvalidStep,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InvalidReference => "INVALID_REFERENCE",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::IncompatibleFields => "INCOMPATIBLE_FIELDS",
            ErrorCode::InvalidStep => "INVALID_STEP",
            ErrorCode::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::NotFound { .. } => ErrorCode::NotFound,
        }
    }
}

impl ValidatorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidatorError::InvalidStep(_) => ErrorCode::InvalidStep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_table_and_id() {
        let err = CatalogError::NotFound {
            table: TableKind::Brands,
            id: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "no brands record with id 'nope'");
        assert_eq!(err.code().as_str(), "NOT_FOUND");
    }

    #[test]
    fn codes_serialize_as_screaming_snake_case() {
        let rendered = serde_json::to_string(&ErrorCode::IncompatibleFields).unwrap();
        assert_eq!(rendered, "\"INCOMPATIBLE_FIELDS\"");
    }

    #[test]
    fn serialized_codes_match_display() {
        for code in [
            ErrorCode::NotFound,
            ErrorCode::MissingField,
            ErrorCode::InvalidReference,
            ErrorCode::InvalidValue,
            ErrorCode::IncompatibleFields,
            ErrorCode::InvalidStep,
            ErrorCode::Internal,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.to_string());
        }
    }
}
