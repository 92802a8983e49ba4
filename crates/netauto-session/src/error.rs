//! Session errors.
//!
//! Every push failure is surfaced as one of these after the session has
//! discarded its candidate and released its lock.

use netauto_diff::DiffError;
use netauto_render::RenderError;
use thiserror::Error;

use crate::rpc::RpcErrorInfo;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by device sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The transport could not reach the device or lost the connection.
    #[error("Transport error on {host}: {message}")]
    Transport {
        /// Device host.
        host: String,
        /// Error message.
        message: String,
    },

    /// The device answered an RPC with an error.
    #[error("Device {host} rejected {operation}: {info}")]
    Rpc {
        /// Device host.
        host: String,
        /// RPC that failed (e.g., "edit-config", "commit").
        operation: String,
        /// Fields extracted from the rpc-error.
        info: RpcErrorInfo,
    },

    /// The candidate datastore could not be locked or unlocked.
    #[error("Lock operation failed on {host}: {message}")]
    Lock {
        /// Device host.
        host: String,
        /// Error message.
        message: String,
    },

    /// Staging the edit into the candidate failed.
    #[error("Failed to stage configuration on {host}: {message}")]
    Staging {
        /// Device host.
        host: String,
        /// Error message.
        message: String,
    },

    /// Committing or persisting the candidate failed.
    #[error("Failed to commit configuration on {host}: {message}")]
    Commit {
        /// Device host.
        host: String,
        /// Error message.
        message: String,
    },

    /// A payload built for another platform family.
    #[error("Session for {platform} cannot push a {payload} payload")]
    PayloadMismatch {
        /// Platform identifier of the session.
        platform: String,
        /// Kind of payload received.
        payload: String,
    },

    /// A state reply could not be interpreted.
    #[error("Failed to parse {what} from {host}: {message}")]
    Parse {
        /// Device host.
        host: String,
        /// What was being parsed (e.g., "interfaces").
        what: String,
        /// Error message.
        message: String,
    },

    /// Diffing running against candidate failed.
    #[error("Diff failed: {0}")]
    Diff(#[from] DiffError),

    /// A convenience push could not render its payload.
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
}

impl SessionError {
    /// Creates a transport error.
    pub fn transport(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(
        host: impl Into<String>,
        what: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            host: host.into(),
            what: what.into(),
            message: message.into(),
        }
    }
}
