//! The renderer capability shared by every platform.

use netauto_model::{EvpnService, Interface, Lag, Vlan};

use crate::context::PlatformContext;
use crate::error::RenderResult;
use crate::payload::Payload;

/// Translates intent snapshots into a platform payload.
///
/// Every operation is a pure function of the renderer's context and its
/// arguments. Operations a platform cannot express return
/// [`RenderError::Unsupported`](crate::RenderError::Unsupported).
pub trait DeviceRenderer: Send + Sync {
    /// Context this renderer was built with.
    fn context(&self) -> &PlatformContext;

    fn render_interface(&self, interface: &Interface) -> RenderResult<Payload>;

    fn render_interface_delete(&self, interface: &Interface) -> RenderResult<Payload>;

    /// Renders the LAG followed by its members in list order, then whatever
    /// the platform needs for the VLANs the LAG carries.
    fn render_lag(&self, lag: &Lag) -> RenderResult<Payload>;

    /// Removes the LAG and unbinds its members.
    fn render_lag_delete(&self, lag: &Lag) -> RenderResult<Payload>;

    /// Attaches `vlan` to `interface` as sub-interface `{interface}.{vlan}`.
    fn render_vlan(&self, interface: &Interface, vlan: &Vlan) -> RenderResult<Payload>;

    fn render_vlan_delete(&self, interface: &Interface, vlan: &Vlan) -> RenderResult<Payload>;

    /// Renders an EVPN service, attached to `interface` when given.
    fn render_evpn(
        &self,
        interface: Option<&Interface>,
        evpn: &EvpnService,
    ) -> RenderResult<Payload>;

    fn render_evpn_delete(
        &self,
        interface: Option<&Interface>,
        evpn: &EvpnService,
    ) -> RenderResult<Payload>;
}

/// Name of the sub-interface carrying `vlan` on `parent`.
pub fn subinterface_name(parent: &Interface, vlan: &Vlan) -> String {
    format!("{}.{}", parent.name, vlan.id())
}

/// Name given to the VLAN an EVPN service creates
pub fn evpn_vlan_name(vlan: &Vlan) -> String {
    match (&vlan.name, vlan.s_tag) {
        (Some(name), _) => name.clone(),
        (None, Some(s_tag)) => format!("EVPN_VLAN_{}_STAG_{}", vlan.id(), s_tag),
        (None, None) => format!("EVPN_VLAN_{}", vlan.id()),
    }
}
