//! Domain error model.

use thiserror::Error;

/// Result type used across the service layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Boxed underlying cause of a storage fault.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Durable-storage fault.
///
/// Always carries the operation that failed and, when available, the original
/// cause. Repositories never swallow these; services propagate them unchanged.
#[derive(Debug, Error)]
#[error("repository error during {operation}: {message}")]
pub struct RepositoryError {
    operation: &'static str,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl RepositoryError {
    /// Wrap an underlying storage error.
    pub fn new(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            operation,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// A storage fault without a lower-level cause.
    pub fn msg(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// A shared in-memory structure was left poisoned by a panicking writer.
    pub fn lock_poisoned(operation: &'static str) -> Self {
        Self::msg(operation, "lock poisoned")
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Service-level error.
///
/// `Unauthenticated` and `Forbidden` are produced by gating layers above the
/// catalog; the catalog itself never checks roles.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Lookup by identity yielded nothing.
    #[error("not found")]
    NotFound,

    /// Input was malformed or out of range; rejected before reaching storage.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// No actor is authenticated.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The current actor lacks the required role.
    #[error("forbidden")]
    Forbidden,

    /// Durable-storage fault.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Field violations, if this is a validation error.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
