//! Persistence errors.
//!
//! A failure carries an [`ErrorContext`] naming the store operation and the
//! reading or profile it touched; the HTTP layer picks a status from the
//! variant alone.

use std::fmt;

use crate::services::QualityError;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a persistence failure happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Store operation, e.g. `insert_reading`.
    pub operation: Option<String>,
    /// `reading` or `profile`.
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    /// Transient failure; the Postgres backend retries these.
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("operation", &self.operation),
            ("entity", &self.entity),
            ("id", &self.entity_id),
            ("details", &self.details),
        ];
        let mut parts: Vec<String> = fields
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
            .collect();
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
#[allow(clippy::result_large_err)]
pub enum RepositoryError {
    /// The store is unreachable: pool exhausted, connection refused, or the
    /// in-memory store switched to unhealthy.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// The database rejected a statement.
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// No reading with the requested id.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A submission or update failed validation.
    #[error("Data validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// Unknown repository type, missing database URL, or a backend whose
    /// feature is not compiled in.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    /// Connection errors are always retryable.
    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::not_found_with_context(message, ErrorContext::default())
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::internal_with_context(message, ErrorContext::default())
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InternalError {
            message: message.into(),
            context,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError { context, .. } | Self::QueryError { context, .. } => {
                context.retryable
            }
            _ => false,
        }
    }

    fn parts(&self) -> (&str, &ErrorContext) {
        match self {
            Self::ConnectionError { message, context }
            | Self::QueryError { message, context }
            | Self::NotFound { message, context }
            | Self::ValidationError { message, context }
            | Self::ConfigurationError { message, context }
            | Self::InternalError { message, context } => (message.as_str(), context),
        }
    }

    pub fn context(&self) -> &ErrorContext {
        self.parts().1
    }

    /// The message without its context.
    pub fn message(&self) -> &str {
        self.parts().0
    }

    /// Record which store operation failed.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }
}

impl From<QualityError> for RepositoryError {
    fn from(err: QualityError) -> Self {
        let context = match err.field() {
            Some(field) => ErrorContext::default().with_details(format!("field={}", field)),
            None => ErrorContext::default(),
        };
        let message = err.to_string();
        match err {
            QualityError::InvalidConfiguration(_) => {
                RepositoryError::ConfigurationError { message, context }
            }
            QualityError::InvalidArgument { .. } => {
                RepositoryError::ValidationError { message, context }
            }
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found("Record not found"),
            Error::DatabaseError(kind, info) => {
                let mut context =
                    ErrorContext::default().with_details(format!("db_error_kind={:?}", kind));
                if matches!(kind, DatabaseErrorKind::SerializationFailure) {
                    context = context.retryable();
                }
                RepositoryError::QueryError {
                    message: info.message().to_string(),
                    context,
                }
            }
            Error::DeserializationError(e) | Error::SerializationError(e) => {
                RepositoryError::internal(format!("Row conversion failed: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("get_reading")
            .with_entity("reading")
            .with_entity_id(42);
        assert_eq!(ctx.to_string(), "[operation=get_reading, entity=reading, id=42]");
        assert_eq!(ErrorContext::default().retryable().to_string(), "[retryable=true]");
    }

    #[test]
    fn test_retryable_errors() {
        let down = RepositoryError::connection_with_context("pool exhausted", ErrorContext::new("get"));
        assert!(down.is_retryable());
        assert!(!RepositoryError::not_found("reading 1").is_retryable());
        assert!(!RepositoryError::query("syntax").is_retryable());
    }

    #[test]
    fn test_with_operation_overrides_context() {
        let err = RepositoryError::internal("boom").with_operation("delete_reading");
        assert_eq!(err.context().operation.as_deref(), Some("delete_reading"));
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_from_quality_error_is_validation() {
        let err: RepositoryError =
            QualityError::invalid_argument("latitude", "is required").into();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert_eq!(err.context().details.as_deref(), Some("field=latitude"));
    }
}
