//! The apply step shared by every manager.

use async_trait::async_trait;
use netauto_render::Payload;
use netauto_session::{CommitResult, DeviceSession};
use tracing::info;

use crate::error::ReconcileResult;

/// A manager bound to one device session.
///
/// Rendering methods on the managers never touch the device. [`apply`] is
/// the only call that changes device state, so a caller can inspect a
/// payload before deciding to push it.
///
/// [`apply`]: Reconciler::apply
#[async_trait]
pub trait Reconciler: Send {
    type Session: DeviceSession + ?Sized;

    fn session(&mut self) -> &mut Self::Session;

    /// Pushes a previously rendered payload.
    async fn apply(&mut self, payload: &Payload, dry_run: bool) -> ReconcileResult<CommitResult> {
        let session = self.session();
        info!(host = %session.host(), dry_run, "applying {} payload", payload.kind());
        let result = session.push_config(payload, dry_run).await?;
        Ok(result)
    }
}
