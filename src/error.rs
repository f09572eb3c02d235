use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// Malformed or out-of-range input. Never retried.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A stats source (entry file, scraper, API) could not supply a record.
    #[error("stats unavailable from {origin}: {reason}")]
    DataUnavailable { origin: String, reason: String },
}

impl PredictError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            Self::DataUnavailable { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
