//! Render-then-push helpers for single interfaces and VLANs.

use netauto_model::{Interface, Vlan};
use tracing::instrument;

use crate::error::SessionResult;
use crate::session::{CommitResult, DeviceSession};

/// Renders `interface` (or its removal) and pushes it.
#[instrument(skip(session, interface), fields(host = %session.host(), interface = %interface.name))]
pub async fn push_interface<S>(
    session: &mut S,
    interface: &Interface,
    delete: bool,
    dry_run: bool,
) -> SessionResult<CommitResult>
where
    S: DeviceSession + ?Sized,
{
    let renderer = session.renderer();
    let payload = if delete {
        renderer.render_interface_delete(interface)?
    } else {
        renderer.render_interface(interface)?
    };
    session.push_config(&payload, dry_run).await
}

/// Renders `vlan` on `interface` as a sub-interface (or its removal) and
/// pushes it.
#[instrument(skip(session, interface, vlan), fields(host = %session.host(), vlan = vlan.id()))]
pub async fn push_vlan<S>(
    session: &mut S,
    interface: &Interface,
    vlan: &Vlan,
    delete: bool,
    dry_run: bool,
) -> SessionResult<CommitResult>
where
    S: DeviceSession + ?Sized,
{
    let renderer = session.renderer();
    let payload = if delete {
        renderer.render_vlan_delete(interface, vlan)?
    } else {
        renderer.render_vlan(interface, vlan)?
    };
    session.push_config(&payload, dry_run).await
}
