//! Interface, VLAN and VNI state from structured `get` replies.

use netauto_diff::{parse, repair, Node};
use netauto_model::{
    Interface, InterfaceEntry, Inventory, Lag, SwitchportMode, Vlan, VlanId, VlanMap, VniEntry, VniMap,
};
use netauto_render::PlatformContext;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Subtree filter for interface state
pub const INTERFACES_FILTER: &str =
    r#"<interfaces xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-interface"></interfaces>"#;

/// Subtree filter for the VLAN database
pub const VLANS_FILTER: &str =
    r#"<vlan-database xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-vlan"></vlan-database>"#;

/// Subtree filter for VXLAN mappings
pub const VNIS_FILTER: &str = r#"<vxlan xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-vxlan"></vxlan>"#;

/// Hardware type reported for aggregate interfaces
const AGGREGATE_HARDWARE: &str = "AGG";

fn parse_bool(text: Option<&str>) -> bool {
    matches!(
        text.map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "yes")
    )
}

fn document(reply: &str) -> Result<Node, String> {
    parse(&repair(reply)).map_err(|e| e.to_string())
}

/// Builds the interface inventory from an interfaces reply.
///
/// Every element with local name `interface` is considered, whatever its
/// namespace or depth. Logical sub-interfaces become trunk VLANs of their
/// parent, aggregate members point at `{lag_prefix}{aggregate-id}`, and
/// interfaces of hardware type `AGG` become LAGs.
pub fn parse_interfaces(reply: &str, context: &PlatformContext) -> Result<Inventory, String> {
    let root = document(reply)?;

    let mut entries: Vec<InterfaceEntry> = Vec::new();
    let mut subinterfaces: BTreeMap<String, Vec<Vlan>> = BTreeMap::new();

    for node in root.find_all("interface") {
        let Some(name) = node.find_text("name") else {
            debug!("Skipping interface element without a name");
            continue;
        };
        let description = node.find_text("description").map(str::to_string);

        if parse_bool(node.find_text("logical")) {
            let Some((parent, _)) = name.rsplit_once('.') else {
                warn!("Logical interface {} has no parent, skipping", name);
                continue;
            };
            let Some(outer) = node.find_text("outer-vlan-id") else {
                warn!("Logical interface {} has no outer VLAN ID, skipping", name);
                continue;
            };
            match outer.parse::<u16>().map_err(|e| e.to_string()).and_then(|id| {
                Vlan::new(id).map_err(|e| e.to_string())
            }) {
                Ok(vlan) => {
                    let vlan = match description {
                        Some(d) => vlan.with_name(d),
                        None => vlan,
                    };
                    debug!("Adding VLAN {} to interface {}", vlan.id(), parent);
                    subinterfaces.entry(parent.to_string()).or_default().push(vlan);
                }
                Err(e) => warn!("Logical interface {} has invalid VLAN {}: {}", name, outer, e),
            }
            continue;
        }

        let mut interface = match Interface::new(name) {
            Ok(intf) => intf,
            Err(e) => {
                warn!("Skipping interface {}: {}", name, e);
                continue;
            }
        };
        interface.description = description;
        interface.mtu = node.find_text("mtu").and_then(|m| m.parse().ok());

        if node.find_text("hardware-type") == Some(AGGREGATE_HARDWARE) {
            entries.push(InterfaceEntry::Lag(Lag::from_interface(interface)));
            continue;
        }
        if let Some(id) = node.find_text("aggregate-id") {
            interface.lag_member_of = Some(format!("{}{}", context.lag_prefix, id));
        }
        entries.push(InterfaceEntry::Interface(interface));
    }

    for entry in &mut entries {
        let interface = match entry {
            InterfaceEntry::Interface(intf) => intf,
            InterfaceEntry::Lag(lag) => &mut lag.interface,
        };
        if let Some(vlans) = subinterfaces.remove(&interface.name) {
            interface.mode = SwitchportMode::Trunk;
            interface.access_vlan = None;
            interface.trunk_vlans = vlans;
        }
    }
    for parent in subinterfaces.keys() {
        warn!("Sub-interfaces reference unknown parent {}", parent);
    }

    Ok(entries.into_iter().collect())
}

/// Builds the VLAN database from a vlan-database reply.
pub fn parse_vlans(reply: &str) -> Result<VlanMap, String> {
    let root = document(reply)?;
    let mut vlans = VlanMap::new();
    for node in root.find_all("vlan") {
        let Some(id) = node.find_text("id").and_then(|t| t.parse::<u16>().ok()) else {
            continue;
        };
        let vlan = match Vlan::new(id) {
            Ok(vlan) => vlan,
            Err(e) => {
                warn!("Skipping VLAN: {}", e);
                continue;
            }
        };
        let name = node
            .find_text("name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("VLAN{}", id));
        vlans.insert(id, vlan.with_name(name));
    }
    Ok(vlans)
}

/// Builds the VNI allocation map from a vxlan reply.
///
/// Any element with direct `vni` and `vlan` (or `vlan-id`) children is one
/// mapping.
pub fn parse_vnis(reply: &str) -> Result<VniMap, String> {
    let root = document(reply)?;
    let mut vnis = VniMap::new();
    let mut stack = vec![&root];
    while let Some(node) = stack.pop() {
        stack.extend(node.children.iter());
        let Some(vni) = node.child_text("vni").and_then(|t| t.parse::<u32>().ok()) else {
            continue;
        };
        let vlan = node
            .child_text("vlan")
            .or_else(|| node.child_text("vlan-id"))
            .and_then(|t| t.parse::<u16>().ok());
        match vlan.map(VlanId::new) {
            Some(Ok(vlan_id)) => {
                vnis.insert(vni, VniEntry { vlan_id });
            }
            Some(Err(e)) => warn!("Skipping VNI {}: {}", vni, e),
            None => debug!("VNI {} has no VLAN mapping", vni),
        }
    }
    Ok(vnis)
}
