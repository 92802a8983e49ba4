//! The device session contract.
//!
//! A session is the only place device state is read or changed. Managers
//! hold a session mutably for the length of an operation, so one session
//! never runs two pushes at once.

use async_trait::async_trait;
use netauto_model::{Inventory, VlanMap, VniMap};
use netauto_render::{DeviceRenderer, Payload, PlatformContext};

use crate::error::{SessionError, SessionResult};

/// Result type returned by transports; the error is the transport's message.
pub type TransportResult<T> = Result<T, String>;

/// Outcome of one push
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitResult {
    /// Unified diff of running against candidate, empty when nothing changed
    pub diff: String,
    /// False for dry runs
    pub committed: bool,
}

impl CommitResult {
    pub fn new(diff: impl Into<String>, committed: bool) -> Self {
        Self {
            diff: diff.into(),
            committed,
        }
    }

    /// True when the push changed nothing.
    pub fn is_noop(&self) -> bool {
        self.diff.trim().is_empty()
    }
}

/// A connection to one device.
///
/// The renderer is fixed when the session is built; callers render with
/// [`DeviceSession::renderer`] and push the result with
/// [`DeviceSession::push_config`].
#[async_trait]
pub trait DeviceSession: Send {
    /// Host name or address of the device.
    fn host(&self) -> &str;

    /// Renderer matching the device's platform family.
    fn renderer(&self) -> &dyn DeviceRenderer;

    fn platform(&self) -> &PlatformContext {
        self.renderer().context()
    }

    async fn connect(&mut self) -> SessionResult<()>;

    async fn disconnect(&mut self) -> SessionResult<()>;

    /// Current interfaces and LAGs, keyed by name.
    async fn get_interfaces(&mut self) -> SessionResult<Inventory>;

    async fn get_vlans(&mut self) -> SessionResult<VlanMap>;

    /// Current VNI to VLAN allocations.
    async fn get_vnis(&mut self) -> SessionResult<VniMap>;

    /// Pushes `payload` transactionally.
    ///
    /// On any failure after staging started the candidate is discarded and
    /// the lock released before the error is returned. With `dry_run` the
    /// diff is computed and the candidate discarded.
    async fn push_config(&mut self, payload: &Payload, dry_run: bool)
        -> SessionResult<CommitResult>;
}

/// Checks that `payload` is the kind `expected` for a session on `platform`.
pub(crate) fn expect_kind(
    platform: &PlatformContext,
    payload: &Payload,
    expected: &'static str,
) -> SessionResult<()> {
    if payload.kind() == expected {
        return Ok(());
    }
    Err(SessionError::PayloadMismatch {
        platform: platform.platform_id.clone(),
        payload: payload.kind().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_result() {
        assert!(CommitResult::default().is_noop());
        let result = CommitResult::new("--- running-config\n+++ candidate-config\n", true);
        assert!(!result.is_noop());
        assert!(result.committed);
    }

    #[test]
    fn test_expect_kind() {
        let payload = Payload::commands(["vlan 10"]);
        assert!(expect_kind(&PlatformContext::eos(), &payload, "commands").is_ok());
        let err = expect_kind(&PlatformContext::ocnos(), &payload, "document").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Session for ipinfusion_ocnos cannot push a commands payload"
        );
    }
}
