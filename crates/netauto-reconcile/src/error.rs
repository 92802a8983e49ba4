//! Reconciliation errors.
//!
//! [`ReconcileError`] is what callers of the managers see. Every lower-level
//! failure converts into it, and [`ReconcileError::kind`] groups them for
//! callers that only branch on the category.

use netauto_model::ModelError;
use netauto_render::RenderError;
use netauto_session::SessionError;
use std::fmt;
use thiserror::Error;

/// Result type alias for manager operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Intent that contradicts current device state.
///
/// Raised before anything is rendered or pushed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    /// The VNI is already allocated on the device.
    #[error("VNI {vni} is already in use (mapped to VLAN {vlan_id})")]
    VniInUse {
        /// The requested VNI.
        vni: u32,
        /// VLAN the VNI is currently bound to.
        vlan_id: u16,
    },

    /// A requested LAG member already belongs to a LAG.
    #[error("Port {port} is already a member of {lag}")]
    AlreadyLagMember {
        /// The member port.
        port: String,
        /// The LAG that owns it.
        lag: String,
    },

    /// A requested LAG member is not in the device inventory.
    #[error("Port {port} does not exist on device")]
    PortNotFound {
        /// The missing port.
        port: String,
    },

    /// An interface to manage or attach to is not in the device inventory.
    #[error("Interface {name} not found on device")]
    InterfaceNotFound {
        /// The missing interface.
        name: String,
    },
}

/// Errors returned by the managers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ModelError),

    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Push failed: {0}")]
    Session(#[from] SessionError),
}

/// Category of a [`ReconcileError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed intent
    Validation,
    /// Intent contradicts device state
    Conflict,
    /// Payload could not be produced
    Rendering,
    /// Device interaction failed
    Push,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Rendering => "rendering",
            ErrorKind::Push => "push",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Validation(_) => ErrorKind::Validation,
            ReconcileError::Conflict(_) => ErrorKind::Conflict,
            ReconcileError::Render(_) => ErrorKind::Rendering,
            // A convenience push that failed to render is still a rendering error.
            ReconcileError::Session(SessionError::Render(_)) => ErrorKind::Rendering,
            ReconcileError::Session(_) => ErrorKind::Push,
        }
    }

    /// True when the error is a conflict with device state.
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages() {
        let err = ConflictError::VniInUse {
            vni: 10010,
            vlan_id: 10,
        };
        assert_eq!(err.to_string(), "VNI 10010 is already in use (mapped to VLAN 10)");

        let err = ConflictError::AlreadyLagMember {
            port: "Ethernet1".to_string(),
            lag: "Port-Channel5".to_string(),
        };
        assert_eq!(err.to_string(), "Port Ethernet1 is already a member of Port-Channel5");
    }

    #[test]
    fn test_error_kinds() {
        let err: ReconcileError = ModelError::VlanOutOfRange { value: 0 }.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ReconcileError = ConflictError::PortNotFound {
            port: "Ethernet9".to_string(),
        }
        .into();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Conflict: Port Ethernet9 does not exist on device");

        let err: ReconcileError = RenderError::unsupported("ipinfusion_ocnos", "x").into();
        assert_eq!(err.kind(), ErrorKind::Rendering);

        let err: ReconcileError = SessionError::transport("leaf1", "timeout").into();
        assert_eq!(err.kind(), ErrorKind::Push);
        assert_eq!(err.kind().to_string(), "push");
    }
}
