//! EVPN service deployment and removal.

use netauto_model::{EvpnService, Interface, Vrf};
use netauto_render::Payload;
use netauto_session::DeviceSession;
use tracing::{debug, info, instrument};

use crate::error::{ConflictError, ReconcileResult};
use crate::reconciler::Reconciler;

/// Deploys EVPN/VXLAN services.
pub struct EvpnManager<'s, S: DeviceSession + ?Sized> {
    session: &'s mut S,
}

impl<'s, S: DeviceSession + ?Sized> EvpnManager<'s, S> {
    pub fn new(session: &'s mut S) -> Self {
        Self { session }
    }

    /// Renders `service` inside `vrf` under BGP AS `bgp_as`.
    ///
    /// Fails with a conflict when the VNI is already allocated on the
    /// device; this check runs before anything is rendered. When the service
    /// has a connection for this session's host, the attachment interface
    /// must exist on the device. Nothing is pushed.
    #[instrument(skip(self, service, vrf), fields(vni = service.vni, vrf = %vrf.name))]
    pub async fn deploy_service(
        &mut self,
        service: &EvpnService,
        vrf: &Vrf,
        bgp_as: u32,
    ) -> ReconcileResult<Payload> {
        let vnis = self.session.get_vnis().await?;
        if let Some(entry) = vnis.get(&service.vni) {
            return Err(ConflictError::VniInUse {
                vni: service.vni,
                vlan_id: entry.vlan_id.get(),
            }
            .into());
        }

        let service = service.clone().with_asn(bgp_as).with_vrf(vrf.clone());
        service.validate()?;

        let attachment = match service.connection_for(self.session.host()) {
            Some(connection) => {
                let inventory = self.session.get_interfaces().await?;
                let interface = inventory.interface(&connection.interface).cloned().ok_or_else(
                    || ConflictError::InterfaceNotFound {
                        name: connection.interface.clone(),
                    },
                )?;
                debug!("Attaching service to {}", interface.name);
                Some(interface)
            }
            None => None,
        };

        let payload = self
            .session
            .renderer()
            .render_evpn(attachment.as_ref(), &service)?;
        info!(
            "Rendered EVPN service {} (VLAN {}, VNI {})",
            service.description,
            service.vlan.id(),
            service.vni
        );
        Ok(payload)
    }

    /// Renders removal of `service`, with its VRF named `vrf_name`.
    ///
    /// The VNI allocation is not re-checked and the attachment interface is
    /// taken by name.
    #[instrument(skip(self, service), fields(vni = service.vni))]
    pub fn delete_service(
        &self,
        service: &EvpnService,
        vrf_name: &str,
        bgp_as: u32,
    ) -> ReconcileResult<Payload> {
        let service = service.clone().with_asn(bgp_as);
        let mut vrf = service.vrf();
        vrf.name = vrf_name.to_string();
        let service = service.with_vrf(vrf);

        let attachment = service
            .connection_for(self.session.host())
            .map(|connection| Interface::new(connection.interface.as_str()))
            .transpose()?;

        let payload = self
            .session
            .renderer()
            .render_evpn_delete(attachment.as_ref(), &service)?;
        info!("Rendered removal of EVPN service {}", service.description);
        Ok(payload)
    }
}

impl<S: DeviceSession + ?Sized> Reconciler for EvpnManager<'_, S> {
    type Session = S;

    fn session(&mut self) -> &mut S {
        self.session
    }
}
