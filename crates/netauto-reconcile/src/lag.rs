//! LAG creation and removal.

use netauto_model::{Interface, LacpMode, Lag, ModelResult, VlanId};
use netauto_render::Payload;
use netauto_session::DeviceSession;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

use crate::error::{ConflictError, ReconcileResult};
use crate::reconciler::Reconciler;

/// Builds LAGs out of existing ports.
pub struct LagManager<'s, S: DeviceSession + ?Sized> {
    session: &'s mut S,
}

impl<'s, S: DeviceSession + ?Sized> LagManager<'s, S> {
    pub fn new(session: &'s mut S) -> Self {
        Self { session }
    }

    /// Renders a LAG bundling `member_ports`.
    ///
    /// Every member must exist and be free. The LAG carries the union of the
    /// members' VLANs in ascending order, or is routed when they carry none.
    /// Nothing is pushed.
    #[instrument(skip(self, member_ports))]
    pub async fn create_lag(
        &mut self,
        lag_name: &str,
        member_ports: &[&str],
        lacp_mode: LacpMode,
    ) -> ReconcileResult<Payload> {
        let inventory = self.session.get_interfaces().await?;

        let mut members: Vec<Interface> = Vec::with_capacity(member_ports.len());
        let mut vlans: BTreeSet<VlanId> = BTreeSet::new();
        for &port in member_ports {
            let interface = inventory
                .interface(port)
                .ok_or_else(|| ConflictError::PortNotFound {
                    port: port.to_string(),
                })?;
            if let Some(lag) = &interface.lag_member_of {
                return Err(ConflictError::AlreadyLagMember {
                    port: port.to_string(),
                    lag: lag.clone(),
                }
                .into());
            }
            if members.iter().any(|m| m.name == port) {
                debug!("Ignoring duplicate member {}", port);
                continue;
            }
            vlans.extend(interface.vlan_ids());
            members.push(interface.clone());
        }

        let number = self.session.platform().lag_number(lag_name)?;
        let vlan_ids: Vec<u16> = vlans.into_iter().map(VlanId::get).collect();
        let lag_interface = if vlan_ids.is_empty() {
            Interface::routed(lag_name)?
        } else {
            Interface::trunk(lag_name, &vlan_ids)?
        };
        let lag = Lag::from_interface(lag_interface)
            .with_members(members)
            .with_lacp_mode(lacp_mode);
        lag.validate()?;

        let payload = self.session.renderer().render_lag(&lag)?;
        info!(
            "Rendered LAG {} (number {}) with members {:?} and VLANs {:?}",
            lag_name,
            number,
            lag.member_names(),
            vlan_ids
        );
        Ok(payload)
    }

    /// Renders removal of the LAG and unbinding of `member_ports`.
    ///
    /// Members are taken by name and not checked against the device.
    #[instrument(skip(self, member_ports))]
    pub fn delete_lag(&self, lag_name: &str, member_ports: &[&str]) -> ReconcileResult<Payload> {
        let members = member_ports
            .iter()
            .map(|&port| Interface::new(port))
            .collect::<ModelResult<Vec<_>>>()?;
        let lag = Lag::new(lag_name)?.with_members(members);
        let payload = self.session.renderer().render_lag_delete(&lag)?;
        info!("Rendered removal of LAG {}", lag_name);
        Ok(payload)
    }
}

impl<S: DeviceSession + ?Sized> Reconciler for LagManager<'_, S> {
    type Session = S;

    fn session(&mut self) -> &mut S {
        self.session
    }
}
