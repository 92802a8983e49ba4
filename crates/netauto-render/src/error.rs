//! Rendering errors.

use thiserror::Error;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while turning intent into a platform payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A field the operation needs was not supplied.
    #[error("Missing required field '{field}' for {operation}")]
    MissingField {
        /// The absent field.
        field: String,
        /// The render operation.
        operation: String,
    },

    /// The platform cannot express the requested operation.
    #[error("Operation {operation} is not supported on platform {platform}")]
    Unsupported {
        /// Platform identifier.
        platform: String,
        /// The render operation.
        operation: String,
    },

    /// A LAG name does not follow `{prefix}{number}`.
    #[error("LAG name '{name}' is not '{prefix}' followed by a number")]
    LagNaming {
        /// The LAG name.
        name: String,
        /// The platform's LAG prefix.
        prefix: String,
    },
}

impl RenderError {
    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            operation: operation.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(platform: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            platform: platform.into(),
            operation: operation.into(),
        }
    }
}
