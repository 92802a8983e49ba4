//! Line-command renderer for EOS devices.
//!
//! Commands are flat configure-mode lines; mode changes are expressed by the
//! `interface`/`vlan`/`router bgp` lines themselves.

use itertools::Itertools;
use netauto_model::{EvpnService, Interface, LacpMode, Lag, SwitchportMode, Vlan, VlanId};

use crate::context::PlatformContext;
use crate::error::{RenderError, RenderResult};
use crate::payload::Payload;
use crate::renderer::{evpn_vlan_name, subinterface_name, DeviceRenderer};

/// The single VXLAN tunnel interface
pub const VXLAN_INTERFACE: &str = "Vxlan1";

/// Build interface selection command
pub fn build_interface_cmd(name: &str) -> String {
    format!("interface {}", name)
}

/// Build interface removal command
pub fn build_no_interface_cmd(name: &str) -> String {
    format!("no interface {}", name)
}

/// Build trunk allowed VLAN command from an already ordered list
pub fn build_trunk_allowed_cmd(vlans: &[u16]) -> String {
    format!("switchport trunk allowed vlan {}", vlans.iter().join(","))
}

/// Build LAG member binding command
pub fn build_channel_group_cmd(lag_number: u32, mode: LacpMode) -> String {
    let mode = match mode {
        LacpMode::Active => "active",
        LacpMode::Passive => "passive",
        LacpMode::Static => "on",
    };
    format!("channel-group {} mode {}", lag_number, mode)
}

/// Build dot1q encapsulation command, QinQ when an S-tag is set
pub fn build_encapsulation_cmd(vlan: &Vlan) -> String {
    match vlan.s_tag {
        Some(s_tag) => format!("encapsulation dot1q vlan {} inner {}", s_tag, vlan.id()),
        None => format!("encapsulation dot1q vlan {}", vlan.id()),
    }
}

/// Build VXLAN VLAN to VNI mapping command
pub fn build_vxlan_vlan_cmd(vlan_id: u16, vni: u32) -> String {
    format!("vxlan vlan {} vni {}", vlan_id, vni)
}

/// VLAN IDs ascending without duplicates
fn sorted_vlans(ids: impl IntoIterator<Item = VlanId>) -> Vec<u16> {
    ids.into_iter().map(VlanId::get).sorted().dedup().collect()
}

/// Renderer for line-command platforms
#[derive(Debug, Clone)]
pub struct EosRenderer {
    context: PlatformContext,
}

impl Default for EosRenderer {
    fn default() -> Self {
        Self::new(PlatformContext::eos())
    }
}

impl EosRenderer {
    pub fn new(context: PlatformContext) -> Self {
        Self { context }
    }

    fn require_parent(&self, interface: &Interface, operation: &str) -> RenderResult<()> {
        if interface.name.trim().is_empty() {
            return Err(RenderError::missing_field("interface.name", operation));
        }
        Ok(())
    }

    fn switchport_cmds(&self, interface: &Interface) -> Vec<String> {
        let vlans = sorted_vlans(interface.vlan_ids());
        match interface.mode {
            SwitchportMode::Trunk if !vlans.is_empty() => vec![
                "switchport mode trunk".to_string(),
                build_trunk_allowed_cmd(&vlans),
            ],
            SwitchportMode::Access if !vlans.is_empty() => vec![
                "switchport mode access".to_string(),
                format!("switchport access vlan {}", vlans[0]),
            ],
            _ => vec!["no switchport".to_string()],
        }
    }
}

impl DeviceRenderer for EosRenderer {
    fn context(&self) -> &PlatformContext {
        &self.context
    }

    fn render_interface(&self, interface: &Interface) -> RenderResult<Payload> {
        self.require_parent(interface, "render_interface")?;
        let mut cmds = vec![build_interface_cmd(&interface.name)];
        if let Some(description) = &interface.description {
            cmds.push(format!("description {}", description));
        }
        if let Some(mtu) = interface.mtu {
            cmds.push(format!("mtu {}", mtu));
        }
        Ok(Payload::commands(cmds))
    }

    fn render_interface_delete(&self, interface: &Interface) -> RenderResult<Payload> {
        self.require_parent(interface, "render_interface_delete")?;
        // Physical ports cannot be removed, only returned to defaults.
        let logical = interface.name.contains('.') || self.context.is_lag(&interface.name);
        if logical {
            return Ok(Payload::commands([build_no_interface_cmd(&interface.name)]));
        }
        Ok(Payload::commands([
            build_interface_cmd(&interface.name),
            "no description".to_string(),
            "no mtu".to_string(),
        ]))
    }

    fn render_lag(&self, lag: &Lag) -> RenderResult<Payload> {
        let number = self.context.lag_number(lag.name())?;

        let mut cmds = vec![build_interface_cmd(lag.name())];
        if let Some(description) = &lag.interface.description {
            cmds.push(format!("description {}", description));
        }
        if let Some(mtu) = lag.interface.mtu {
            cmds.push(format!("mtu {}", mtu));
        }
        cmds.extend(self.switchport_cmds(&lag.interface));
        if lag.min_links > 1 {
            cmds.push(format!("port-channel min-links {}", lag.min_links));
        }

        for member in &lag.members {
            cmds.push(build_interface_cmd(&member.name));
            cmds.push(build_channel_group_cmd(number, lag.lacp_mode));
        }
        Ok(Payload::commands(cmds))
    }

    fn render_lag_delete(&self, lag: &Lag) -> RenderResult<Payload> {
        self.context.lag_number(lag.name())?;

        let mut cmds = vec![build_no_interface_cmd(lag.name())];
        for member in &lag.members {
            cmds.push(build_interface_cmd(&member.name));
            cmds.push("no channel-group".to_string());
        }
        Ok(Payload::commands(cmds))
    }

    fn render_vlan(&self, interface: &Interface, vlan: &Vlan) -> RenderResult<Payload> {
        self.require_parent(interface, "render_vlan")?;
        let mut cmds = vec![build_interface_cmd(&subinterface_name(interface, vlan))];
        if let Some(name) = &vlan.name {
            cmds.push(format!("description {}", name));
        }
        cmds.push(build_encapsulation_cmd(vlan));
        Ok(Payload::commands(cmds))
    }

    fn render_vlan_delete(&self, interface: &Interface, vlan: &Vlan) -> RenderResult<Payload> {
        self.require_parent(interface, "render_vlan_delete")?;
        Ok(Payload::commands([build_no_interface_cmd(&subinterface_name(
            interface, vlan,
        ))]))
    }

    fn render_evpn(
        &self,
        interface: Option<&Interface>,
        evpn: &EvpnService,
    ) -> RenderResult<Payload> {
        let vlan_id = evpn.vlan.id();
        let vrf = evpn.vrf();

        let mut cmds = vec![
            format!("vlan {}", vlan_id),
            format!("name {}", evpn_vlan_name(&evpn.vlan)),
            format!("vrf definition {}", vrf.name),
            format!("rd {}", vrf.rd),
        ];
        cmds.extend(vrf.rt_import.iter().map(|rt| format!("route-target import {}", rt)));
        cmds.extend(vrf.rt_export.iter().map(|rt| format!("route-target export {}", rt)));

        cmds.push(build_interface_cmd(VXLAN_INTERFACE));
        cmds.push(build_vxlan_vlan_cmd(vlan_id, evpn.vni));

        cmds.push(format!("router bgp {}", evpn.asn));
        cmds.push(format!("vlan {}", vlan_id));
        cmds.push(format!("rd {}", vrf.rd));
        cmds.push("redistribute learned".to_string());

        if let Some(interface) = interface {
            self.require_parent(interface, "render_evpn")?;
            cmds.push(build_interface_cmd(&interface.name));
            cmds.push(format!("switchport trunk allowed vlan add {}", vlan_id));
        }
        Ok(Payload::commands(cmds))
    }

    fn render_evpn_delete(
        &self,
        interface: Option<&Interface>,
        evpn: &EvpnService,
    ) -> RenderResult<Payload> {
        let vlan_id = evpn.vlan.id();
        let vrf = evpn.vrf();

        let mut cmds = vec![
            format!("no vlan {}", vlan_id),
            format!("no vrf definition {}", vrf.name),
            build_interface_cmd(VXLAN_INTERFACE),
            format!("no {}", build_vxlan_vlan_cmd(vlan_id, evpn.vni)),
            format!("router bgp {}", evpn.asn),
            format!("no vlan {}", vlan_id),
        ];
        if let Some(interface) = interface {
            self.require_parent(interface, "render_evpn_delete")?;
            cmds.push(build_interface_cmd(&interface.name));
            cmds.push(format!("switchport trunk allowed vlan remove {}", vlan_id));
        }
        Ok(Payload::commands(cmds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netauto_model::Vrf;

    fn lines(payload: &Payload) -> Vec<String> {
        payload.as_commands().unwrap().to_vec()
    }

    fn position(cmds: &[String], needle: &str) -> usize {
        cmds.iter()
            .position(|c| c == needle)
            .unwrap_or_else(|| panic!("{needle} not rendered in {cmds:?}"))
    }

    fn lag(vlans: &[u16]) -> Lag {
        let intf = if vlans.is_empty() {
            Interface::routed("Port-Channel1").unwrap()
        } else {
            Interface::trunk("Port-Channel1", vlans).unwrap()
        };
        Lag::from_interface(intf).with_members(vec![
            Interface::new("Ethernet1").unwrap(),
            Interface::new("Ethernet2").unwrap(),
        ])
    }

    #[test]
    fn test_build_commands() {
        assert_eq!(build_interface_cmd("Ethernet1"), "interface Ethernet1");
        assert_eq!(
            build_trunk_allowed_cmd(&[10, 20, 30]),
            "switchport trunk allowed vlan 10,20,30"
        );
        assert_eq!(
            build_channel_group_cmd(10, LacpMode::Passive),
            "channel-group 10 mode passive"
        );
        assert_eq!(build_channel_group_cmd(3, LacpMode::Static), "channel-group 3 mode on");
    }

    #[test]
    fn test_render_interface() {
        let intf = Interface::new("Ethernet1")
            .unwrap()
            .with_description("test123")
            .with_mtu(Some(1400));
        let cmds = lines(&EosRenderer::default().render_interface(&intf).unwrap());
        assert_eq!(cmds, vec!["interface Ethernet1", "description test123", "mtu 1400"]);
    }

    #[test]
    fn test_render_interface_delete() {
        let renderer = EosRenderer::default();
        let phys = Interface::new("Ethernet1").unwrap();
        assert_eq!(
            lines(&renderer.render_interface_delete(&phys).unwrap()),
            vec!["interface Ethernet1", "no description", "no mtu"]
        );
        let sub = Interface::new("Ethernet1.10").unwrap();
        assert_eq!(
            lines(&renderer.render_interface_delete(&sub).unwrap()),
            vec!["no interface Ethernet1.10"]
        );
    }

    #[test]
    fn test_render_lag_trunk() {
        let cmds = lines(&EosRenderer::default().render_lag(&lag(&[30, 10, 20, 10])).unwrap());
        assert!(cmds.contains(&"switchport mode trunk".to_string()));
        assert!(cmds.contains(&"switchport trunk allowed vlan 10,20,30".to_string()));

        let lag_idx = position(&cmds, "interface Port-Channel1");
        let eth1 = position(&cmds, "interface Ethernet1");
        let eth2 = position(&cmds, "interface Ethernet2");
        assert!(lag_idx < eth1 && eth1 < eth2);
        assert_eq!(cmds[eth1 + 1], "channel-group 1 mode active");
        assert_eq!(cmds[eth2 + 1], "channel-group 1 mode active");
    }

    #[test]
    fn test_render_lag_without_vlans_is_routed() {
        let cmds = lines(&EosRenderer::default().render_lag(&lag(&[])).unwrap());
        assert!(cmds.contains(&"no switchport".to_string()));
        assert!(!cmds.iter().any(|c| c.starts_with("switchport trunk")));
    }

    #[test]
    fn test_render_lag_min_links_and_passive() {
        let lag = lag(&[10])
            .with_lacp_mode(LacpMode::Passive)
            .with_min_links(2)
            .unwrap();
        let cmds = lines(&EosRenderer::default().render_lag(&lag).unwrap());
        assert!(cmds.contains(&"port-channel min-links 2".to_string()));
        assert!(cmds.contains(&"channel-group 1 mode passive".to_string()));
    }

    #[test]
    fn test_render_lag_bad_name() {
        let lag = Lag::new("Bundle1").unwrap();
        assert!(matches!(
            EosRenderer::default().render_lag(&lag),
            Err(RenderError::LagNaming { .. })
        ));
    }

    #[test]
    fn test_render_lag_delete() {
        let cmds = lines(&EosRenderer::default().render_lag_delete(&lag(&[10, 20])).unwrap());
        assert_eq!(
            cmds,
            vec![
                "no interface Port-Channel1",
                "interface Ethernet1",
                "no channel-group",
                "interface Ethernet2",
                "no channel-group",
            ]
        );
    }

    #[test]
    fn test_render_vlan_subinterface() {
        let parent = Interface::new("Ethernet3").unwrap().with_description("uplink");
        let vlan = Vlan::new(30).unwrap().with_name("SO54321");
        let renderer = EosRenderer::default();
        assert_eq!(
            lines(&renderer.render_vlan(&parent, &vlan).unwrap()),
            vec!["interface Ethernet3.30", "description SO54321", "encapsulation dot1q vlan 30"]
        );
        assert_eq!(
            lines(&renderer.render_vlan_delete(&parent, &vlan).unwrap()),
            vec!["no interface Ethernet3.30"]
        );

        let qinq = Vlan::new(30).unwrap().with_s_tag(200).unwrap();
        assert!(lines(&renderer.render_vlan(&parent, &qinq).unwrap())
            .contains(&"encapsulation dot1q vlan 200 inner 30".to_string()));
    }

    #[test]
    fn test_render_vlan_requires_parent_name() {
        let mut parent = Interface::new("Ethernet3").unwrap();
        parent.name.clear();
        let vlan = Vlan::new(30).unwrap();
        assert!(matches!(
            EosRenderer::default().render_vlan_delete(&parent, &vlan),
            Err(RenderError::MissingField { .. })
        ));
    }

    #[test]
    fn test_render_evpn_ordering() {
        let vrf = Vrf::new("PROD", "10.1.1.1:10010")
            .unwrap()
            .with_import(["65001:10010"])
            .with_export(["65001:10010"]);
        let svc = EvpnService::new(Vlan::new(10).unwrap(), "PROD", 10010)
            .unwrap()
            .with_vrf(vrf);
        let cmds = lines(&EosRenderer::default().render_evpn(None, &svc).unwrap());

        let vlan_idx = position(&cmds, "vlan 10");
        let vrf_idx = position(&cmds, "vrf definition PROD");
        let vxlan_idx = position(&cmds, "vxlan vlan 10 vni 10010");
        let bgp_idx = position(&cmds, "router bgp 65001");
        assert!(vlan_idx < vrf_idx && vrf_idx < vxlan_idx && vxlan_idx < bgp_idx);

        assert!(cmds.contains(&"name EVPN_VLAN_10".to_string()));
        assert!(cmds.contains(&"rd 10.1.1.1:10010".to_string()));
        assert_eq!(cmds.iter().filter(|c| c.starts_with("route-target import")).count(), 1);
        assert_eq!(cmds.iter().filter(|c| c.starts_with("route-target export")).count(), 1);
    }

    #[test]
    fn test_evpn_vlan_name() {
        assert_eq!(evpn_vlan_name(&Vlan::new(10).unwrap()), "EVPN_VLAN_10");
        assert_eq!(
            evpn_vlan_name(&Vlan::new(10).unwrap().with_s_tag(200).unwrap()),
            "EVPN_VLAN_10_STAG_200"
        );
        assert_eq!(evpn_vlan_name(&Vlan::new(10).unwrap().with_name("CUST")), "CUST");
    }

    #[test]
    fn test_render_evpn_attachment_and_delete() {
        let svc = EvpnService::new(Vlan::new(10).unwrap(), "PROD", 10010).unwrap();
        let parent = Interface::trunk("Ethernet5", &[20]).unwrap();
        let renderer = EosRenderer::default();

        let cmds = lines(&renderer.render_evpn(Some(&parent), &svc).unwrap());
        let bgp_idx = position(&cmds, "router bgp 65001");
        let attach_idx = position(&cmds, "interface Ethernet5");
        assert!(bgp_idx < attach_idx);
        assert_eq!(cmds[attach_idx + 1], "switchport trunk allowed vlan add 10");

        let cmds = lines(&renderer.render_evpn_delete(Some(&parent), &svc).unwrap());
        assert_eq!(cmds[0], "no vlan 10");
        assert!(cmds.contains(&"no vrf definition PROD".to_string()));
        assert!(cmds.contains(&"no vxlan vlan 10 vni 10010".to_string()));
        assert!(cmds.contains(&"switchport trunk allowed vlan remove 10".to_string()));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = EosRenderer::default();
        let lag = lag(&[50, 40, 30]);
        assert_eq!(renderer.render_lag(&lag).unwrap(), renderer.render_lag(&lag).unwrap());
    }
}
