//! Test fixtures for common netauto scenarios
//!
//! Provides reusable interfaces, services and seeded sessions.

use netauto_model::{EvpnService, Interface, InventorySnapshot, Lag, Vlan, VlanId, Vrf};
use netauto_render::PlatformFamily;
use netauto_session::MockSession;

/// Common interface fixtures
pub mod interface_fixtures {
    use super::*;

    /// Trunk port allowing `vlans`
    pub fn trunk_port(name: &str, vlans: &[u16]) -> Interface {
        Interface::trunk(name, vlans).unwrap_or_else(|e| panic!("bad trunk fixture {name}: {e}"))
    }

    /// Access port carrying `vlan` untagged
    pub fn access_port(name: &str, vlan: u16) -> Interface {
        Interface::access(name, vlan).unwrap_or_else(|e| panic!("bad access fixture {name}: {e}"))
    }

    /// Routed port
    pub fn routed_port(name: &str) -> Interface {
        Interface::routed(name).unwrap_or_else(|e| panic!("bad routed fixture {name}: {e}"))
    }

    /// Port with a description and MTU
    pub fn described_port(name: &str, description: &str, mtu: u32) -> Interface {
        routed_port(name)
            .with_description(description)
            .with_mtu(Some(mtu))
    }

    /// LAG bundling `members`
    pub fn lag(name: &str, members: &[&str]) -> Lag {
        Lag::new(name)
            .unwrap_or_else(|e| panic!("bad LAG fixture {name}: {e}"))
            .with_members(members.iter().map(|m| routed_port(m)))
    }
}

/// Common EVPN fixtures
pub mod evpn_fixtures {
    use super::*;

    /// VLAN with an optional name
    pub fn vlan(id: u16, name: Option<&str>) -> Vlan {
        let vlan = Vlan::new(id).unwrap_or_else(|e| panic!("bad VLAN fixture {id}: {e}"));
        match name {
            Some(name) => vlan.with_name(name),
            None => vlan,
        }
    }

    /// Service mapping `vlan_id` to `vni`
    pub fn service(description: &str, vlan_id: u16, vni: u32) -> EvpnService {
        EvpnService::new(vlan(vlan_id, None), description, vni)
            .unwrap_or_else(|e| panic!("bad service fixture {description}: {e}"))
    }

    /// VRF importing and exporting its own RD
    pub fn symmetric_vrf(name: &str, rd: &str) -> Vrf {
        Vrf::new(name, rd)
            .unwrap_or_else(|e| panic!("bad VRF fixture {name}: {e}"))
            .with_import([rd])
            .with_export([rd])
    }
}

/// Seeded session fixtures
pub mod session_fixtures {
    use super::interface_fixtures::*;
    use super::*;

    /// Line-command session with two trunks sharing VLAN 20
    pub fn eos_leaf() -> MockSession {
        MockSession::new(PlatformFamily::Eos)
            .with_host("leaf1")
            .with_interface(trunk_port("Ethernet1", &[10, 20]))
            .with_interface(trunk_port("Ethernet2", &[20, 30]))
            .with_interface(access_port("Ethernet3", 40))
            .with_interface(routed_port("Ethernet4"))
    }

    /// [`eos_leaf`] with VNI 10010 already bound to VLAN 10
    pub fn eos_leaf_with_vni() -> MockSession {
        eos_leaf().with_vni(10010, VlanId::new(10).unwrap_or_else(|e| panic!("{e}")))
    }

    /// Structured-document session with one described port
    pub fn ocnos_leaf() -> MockSession {
        MockSession::new(PlatformFamily::Ocnos)
            .with_host("leaf2")
            .with_interface(described_port("eth3", "test interface", 1500))
            .with_interface(routed_port("eth4"))
    }

    /// Snapshot equivalent of [`eos_leaf`]
    pub fn eos_snapshot() -> InventorySnapshot {
        InventorySnapshot {
            interfaces: vec![
                trunk_port("Ethernet1", &[10, 20]),
                trunk_port("Ethernet2", &[20, 30]),
            ],
            lags: vec![lag("Port-Channel5", &["Ethernet5"])],
            vlans: vec![super::evpn_fixtures::vlan(10, Some("PROD"))],
            ..InventorySnapshot::default()
        }
    }
}
