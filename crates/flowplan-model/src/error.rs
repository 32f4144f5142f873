//! Error types for the flowplan model

/// Errors raised while building or patching model values
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Complexity outside the 1-5 ordinal scale
    #[error("invalid complexity ordinal: {0} (expected 1-5)")]
    InvalidComplexity(u8),

    /// Field name not in the flow catalogue
    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// Value does not fit the field's type
    #[error("invalid value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    /// Field is owned by the section store and cannot be edited directly
    #[error("field {0} is managed by the roadmap and cannot be edited")]
    ReadOnlyField(String),

    /// Entity payload is not a JSON object carrying an id
    #[error("entity payload must be an object with a string id")]
    MissingId,

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    /// Create invalid field value error
    pub fn invalid_value(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}
