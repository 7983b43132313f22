use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrbError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Domain error in {function}: {reason}")]
    DomainError { function: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl IrbError {
    pub(crate) fn domain(function: &str, reason: impl Into<String>) -> Self {
        IrbError::DomainError {
            function: function.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors raised by a formula whose input left its mathematical domain.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, IrbError::DomainError { .. })
    }
}

impl From<serde_json::Error> for IrbError {
    fn from(e: serde_json::Error) -> Self {
        IrbError::SerializationError(e.to_string())
    }
}
