//! The response envelope every tool call returns.
//!
//! `data` is present exactly when `success` is true and `error` exactly when
//! it is false; the constructors are the only way to build one.

use crate::error::{CatalogError, ErrorCode, ValidatorError};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    pub metadata: ResponseMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next_suggested_tools: Vec<String>,
}

impl ToolResponse {
    pub fn ok(data: Value, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    pub fn failed(error: ToolError, metadata: ResponseMetadata) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            metadata,
        }
    }

    /// Error code when the call failed.
    pub fn code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|error| error.code)
    }
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidValue, message)
    }

    pub fn internal(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::Internal, format!("failed to render response: {err}"))
    }
}

impl From<CatalogError> for ToolError {
    fn from(err: CatalogError) -> Self {
        let details = match &err {
            CatalogError::NotFound { table, id } => json!({ "table": table, "id": id }),
        };
        ToolError::new(err.code(), err.to_string()).with_details(details)
    }
}

impl From<ValidatorError> for ToolError {
    fn from(err: ValidatorError) -> Self {
        let details = match &err {
            ValidatorError::InvalidStep(step) => json!({ "step": step, "valid_steps": [1, 2, 3, 4, 5, 6] }),
        };
        ToolError::new(err.code(), err.to_string()).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableKind;

    #[test]
    fn success_omits_error() {
        let response = ToolResponse::ok(
            json!({"total": 0}),
            ResponseMetadata {
                step: Some(1),
                next_suggested_tools: vec!["list_models".to_string()],
            },
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "data": {"total": 0},
                "metadata": {"step": 1, "next_suggested_tools": ["list_models"]}
            })
        );
    }

    #[test]
    fn not_found_maps_to_error_with_details() {
        let error: ToolError = CatalogError::NotFound {
            table: TableKind::Countries,
            id: "XX".to_string(),
        }
        .into();
        let response = ToolResponse::failed(error, ResponseMetadata::default());
        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered["success"], false);
        assert!(rendered.get("data").is_none());
        assert_eq!(rendered["error"]["code"], "NOT_FOUND");
        assert_eq!(rendered["error"]["details"], json!({"table": "countries", "id": "XX"}));
        assert_eq!(rendered["metadata"], json!({}));
    }
}
