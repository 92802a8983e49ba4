//! Reconciliation managers.
//!
//! Each manager reads current state from a [`DeviceSession`], validates the
//! requested intent against it, and renders a payload. Pushing is a separate
//! [`Reconciler::apply`] call, so callers can preview before committing.
//!
//! [`DeviceSession`]: netauto_session::DeviceSession

pub mod error;
pub mod evpn;
pub mod interface;
pub mod lag;
pub mod reconciler;

pub use error::{ConflictError, ErrorKind, ReconcileError, ReconcileResult};
pub use evpn::EvpnManager;
pub use interface::InterfaceManager;
pub use lag::LagManager;
pub use reconciler::Reconciler;
