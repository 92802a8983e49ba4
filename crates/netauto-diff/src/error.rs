//! Diff and normalization errors.

use thiserror::Error;

/// Result type alias for normalization.
pub type DiffResult<T> = Result<T, DiffError>;

/// Errors raised while reading a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The document could not be parsed, even after repair.
    #[error("Malformed document: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// The document holds no element.
    #[error("Document has no root element")]
    EmptyDocument,

    /// More than one top-level element.
    #[error("Document has more than one root element: '{first}' and '{second}'")]
    MultipleRoots {
        /// Name of the first root.
        first: String,
        /// Name of the second root.
        second: String,
    },
}

impl DiffError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for DiffError {
    fn from(err: quick_xml::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DiffError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::parse(err.to_string())
    }
}
