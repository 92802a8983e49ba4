//! Validation errors raised while constructing intent objects.
//!
//! These are raised before anything reaches a renderer and are never
//! recovered internally.

use thiserror::Error;

/// Result type alias for model construction.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or validating intent objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A VLAN or S-tag identifier outside [1, 4094].
    #[error("VLAN ID {value} out of range [1, 4094]")]
    VlanOutOfRange {
        /// The rejected identifier.
        value: u16,
    },

    /// A VXLAN network identifier outside the 24-bit range.
    #[error("VNI {value} out of range [1, 16777215]")]
    VniOutOfRange {
        /// The rejected identifier.
        value: u32,
    },

    /// An enumerated field received a value it does not know.
    #[error("Invalid value '{value}' for {field}: expected one of {expected}")]
    InvalidEnum {
        /// The field being parsed.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Human readable list of accepted values.
        expected: &'static str,
    },

    /// A field failed a structural check.
    #[error("Invalid {field}: {message}")]
    InvalidField {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ModelError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid enum value error.
    pub fn invalid_enum(
        field: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidEnum {
            field,
            value: value.into(),
            expected,
        }
    }
}
