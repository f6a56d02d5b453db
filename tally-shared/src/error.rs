/// Ledger error kinds
///
/// Every ledger operation returns `Result<T, LedgerError>`. Callers at the
/// HTTP boundary map the [`ErrorKind`] to a status code; the worker logs the
/// error and moves on to the next obligation.
///
/// # Kinds
///
/// - `NotFound`: referenced user, category, expense, budget or obligation does not exist
/// - `AccessDenied`: ownership guard failure
/// - `Validation`: input rejected (non-positive amount, empty description, ...)
/// - `Internal`: unexpected store failure

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreError;

/// Ledger result type alias
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error kind, stable across error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Validation,
    Internal,
}

impl ErrorKind {
    /// Gets kind as string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::Validation => "validation",
            ErrorKind::Internal => "internal",
        }
    }
}

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Acting user may not touch the entity
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Input failed validation
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Store or other unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        LedgerError::NotFound { entity, id }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation(vec![FieldError::new(field, message)])
    }

    /// Gets the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::AccessDenied(_) => ErrorKind::AccessDenied,
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // HashMap iteration order is unstable
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        LedgerError::Validation(fields)
    }
}
