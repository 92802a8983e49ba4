//! Interface, VLAN and VNI state from EOS JSON command output.

use netauto_model::{
    Interface, InterfaceEntry, Inventory, Lag, SwitchportMode, Vlan, VlanId, VlanMap, VniEntry,
    VniMap,
};
use netauto_render::PlatformContext;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const SHOW_INTERFACES: &str = "show interfaces";
pub const SHOW_SWITCHPORT: &str = "show interfaces switchport";
pub const SHOW_VLAN: &str = "show vlan";
pub const SHOW_VXLAN_VNI: &str = "show vxlan vni";

#[derive(Debug, Default, Deserialize)]
struct ShowInterfaces {
    #[serde(default)]
    interfaces: BTreeMap<String, InterfaceStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterfaceStatus {
    #[serde(default)]
    description: String,
    #[serde(default)]
    mtu: Option<u32>,
    #[serde(default)]
    member_interfaces: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ShowSwitchport {
    #[serde(default)]
    switchports: BTreeMap<String, Switchport>,
}

#[derive(Debug, Deserialize)]
struct Switchport {
    #[serde(rename = "switchportInfo")]
    info: SwitchportInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchportInfo {
    mode: String,
    #[serde(default)]
    trunk_allowed_vlans: String,
    #[serde(default)]
    access_vlan_id: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ShowVlan {
    #[serde(default)]
    vlans: BTreeMap<String, VlanStatus>,
}

#[derive(Debug, Deserialize)]
struct VlanStatus {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ShowVxlanVni {
    #[serde(default, rename = "vxlanVnis")]
    vxlan_vnis: BTreeMap<String, VniStatus>,
}

#[derive(Debug, Deserialize)]
struct VniStatus {
    #[serde(default, rename = "vlanId")]
    vlan_id: Option<u16>,
}

fn from_value<T: for<'de> Deserialize<'de>>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| e.to_string())
}

/// Expands an allowed-VLAN list such as `10,20,30-32`.
///
/// `ALL` and `NONE` carry no explicit list and yield nothing.
pub fn parse_vlan_list(list: &str) -> Vec<VlanId> {
    let list = list.trim();
    if list.is_empty() || list.eq_ignore_ascii_case("ALL") || list.eq_ignore_ascii_case("NONE") {
        return Vec::new();
    }
    let mut ids = Vec::new();
    for part in list.split(',').map(str::trim) {
        let range = match part.split_once('-') {
            Some((lo, hi)) => lo.trim().parse::<u16>().ok().zip(hi.trim().parse::<u16>().ok()),
            None => part.parse::<u16>().ok().map(|v| (v, v)),
        };
        match range {
            Some((lo, hi)) if lo <= hi => {
                ids.extend((lo..=hi).filter_map(|v| VlanId::new(v).ok()));
            }
            _ => debug!("Ignoring allowed VLAN entry '{}'", part),
        }
    }
    ids
}

/// Builds the inventory from `show interfaces` and
/// `show interfaces switchport` results.
pub fn parse_interfaces(
    interfaces: &Value,
    switchports: &Value,
    context: &PlatformContext,
) -> Result<Inventory, String> {
    let interfaces: ShowInterfaces = from_value(interfaces)?;
    let switchports: ShowSwitchport = from_value(switchports)?;

    let mut entries = Vec::new();
    for (name, status) in interfaces.interfaces {
        let mut interface = match Interface::new(name.as_str()) {
            Ok(intf) => intf,
            Err(e) => {
                warn!("Skipping interface {}: {}", name, e);
                continue;
            }
        };
        interface.description = Some(status.description).filter(|d| !d.is_empty());
        interface.mtu = status.mtu;
        interface.mode = SwitchportMode::Routed;

        if let Some(port) = switchports.switchports.get(&name) {
            match port.info.mode.as_str() {
                "trunk" => {
                    interface.mode = SwitchportMode::Trunk;
                    interface.trunk_vlans = parse_vlan_list(&port.info.trunk_allowed_vlans)
                        .into_iter()
                        .map(Vlan::from)
                        .collect();
                }
                "access" => {
                    interface.mode = SwitchportMode::Access;
                    interface.access_vlan = port.info.access_vlan_id.and_then(|v| VlanId::new(v).ok());
                }
                other => debug!("Treating switchport mode '{}' of {} as routed", other, name),
            }
        }

        if context.is_lag(&name) {
            let members: Vec<Interface> = status
                .member_interfaces
                .keys()
                .filter_map(|member| Interface::new(member.as_str()).ok())
                .collect();
            entries.push(InterfaceEntry::Lag(
                Lag::from_interface(interface).with_members(members),
            ));
        } else {
            entries.push(InterfaceEntry::Interface(interface));
        }
    }

    // Members of a LAG appear in the LAG entry only; mirror the link onto them.
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    for entry in &entries {
        if let InterfaceEntry::Lag(lag) = entry {
            for member in &lag.members {
                owners.insert(member.name.clone(), lag.name().to_string());
            }
        }
    }
    for entry in &mut entries {
        if let InterfaceEntry::Interface(intf) = entry {
            if let Some(owner) = owners.get(&intf.name) {
                intf.lag_member_of = Some(owner.clone());
            }
        }
    }

    Ok(entries.into_iter().collect())
}

/// Builds the VLAN database from a `show vlan` result.
pub fn parse_vlans(value: &Value) -> Result<VlanMap, String> {
    let show: ShowVlan = from_value(value)?;
    let mut vlans = VlanMap::new();
    for (id, status) in show.vlans {
        let Some(vlan) = id.parse::<u16>().ok().and_then(|id| Vlan::new(id).ok()) else {
            warn!("Skipping VLAN '{}'", id);
            continue;
        };
        let name = status.name.unwrap_or_else(|| format!("VLAN{}", vlan.id()));
        vlans.insert(vlan.id(), vlan.with_name(name));
    }
    Ok(vlans)
}

/// Builds the VNI allocation map from a `show vxlan vni` result.
pub fn parse_vnis(value: &Value) -> Result<VniMap, String> {
    let show: ShowVxlanVni = from_value(value)?;
    let mut vnis = VniMap::new();
    for (vni, status) in show.vxlan_vnis {
        let Ok(vni) = vni.parse::<u32>() else {
            warn!("Skipping VNI '{}'", vni);
            continue;
        };
        if let Some(vlan_id) = status.vlan_id.and_then(|v| VlanId::new(v).ok()) {
            vnis.insert(vni, VniEntry { vlan_id });
        }
    }
    Ok(vnis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_vlan_list() {
        let ids: Vec<u16> = parse_vlan_list("10,20,30-32").into_iter().map(VlanId::get).collect();
        assert_eq!(ids, vec![10, 20, 30, 31, 32]);
        assert!(parse_vlan_list("ALL").is_empty());
        assert!(parse_vlan_list("").is_empty());
        assert_eq!(parse_vlan_list("0,4095,5").len(), 1);
    }

    #[test]
    fn test_parse_interfaces() {
        let interfaces = json!({
            "interfaces": {
                "Ethernet1": {"description": "uplink", "mtu": 9214},
                "Ethernet2": {"description": "", "mtu": 1500},
                "Ethernet3": {"mtu": 1500},
                "Port-Channel1": {"mtu": 1500, "memberInterfaces": {"Ethernet3": {"duplex": "duplexFull"}}}
            }
        });
        let switchports = json!({
            "switchports": {
                "Ethernet1": {"switchportInfo": {"mode": "trunk", "trunkAllowedVlans": "10,20"}},
                "Ethernet2": {"switchportInfo": {"mode": "access", "accessVlanId": 100}}
            }
        });
        let inventory = parse_interfaces(&interfaces, &switchports, &PlatformContext::eos()).unwrap();

        let eth1 = inventory.interface("Ethernet1").unwrap();
        assert_eq!(eth1.mode, SwitchportMode::Trunk);
        assert_eq!(eth1.trunk_vlans.iter().map(Vlan::id).collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(eth1.description.as_deref(), Some("uplink"));

        let eth2 = inventory.interface("Ethernet2").unwrap();
        assert_eq!(eth2.mode, SwitchportMode::Access);
        assert_eq!(eth2.access_vlan.map(VlanId::get), Some(100));
        assert_eq!(eth2.description, None);

        let eth3 = inventory.interface("Ethernet3").unwrap();
        assert_eq!(eth3.mode, SwitchportMode::Routed);
        assert_eq!(eth3.lag_member_of.as_deref(), Some("Port-Channel1"));
        assert_eq!(inventory.lag("Port-Channel1").unwrap().member_names(), vec!["Ethernet3"]);
    }

    #[test]
    fn test_parse_vlans_and_vnis() {
        let vlans = parse_vlans(&json!({"vlans": {"1": {"name": "default"}, "10": {}}})).unwrap();
        assert_eq!(vlans[&1].name.as_deref(), Some("default"));
        assert_eq!(vlans[&10].name.as_deref(), Some("VLAN10"));

        let vnis = parse_vnis(&json!({"vxlanVnis": {"10010": {"vlanId": 10}, "10020": {}}})).unwrap();
        assert_eq!(vnis.len(), 1);
        assert_eq!(vnis[&10010].vlan_id.get(), 10);
    }
}
