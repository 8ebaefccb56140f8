//! Error taxonomy for the water-quality computations.

/// Result type for index, hardness, geo and aggregation operations.
pub type QualityResult<T> = Result<T, QualityError>;

/// Errors raised synchronously by the computation core.
///
/// An empty set of readings is never an error; aggregations over it return
/// zeroed statistics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QualityError {
    /// Malformed or out-of-range input: coordinates, radius, non-finite
    /// numbers, negative concentrations, missing required fields.
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument { field: String, message: String },

    /// The standards table contains a zero, negative or non-finite limit.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl QualityError {
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Field name for argument errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { field, .. } => Some(field),
            Self::InvalidConfiguration(_) => None,
        }
    }
}
