use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("row mapping failed in {context}: {message}")]
    Mapping { context: String, message: String },
}

impl DomainError {
    pub(crate) fn mapping(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Mapping {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
