//! Structured-document renderer for OcNOS devices.
//!
//! Every operation builds one [`ConfigDocument`] for an `edit-config` against
//! the candidate datastore. Delete variants keep only the keys needed to
//! address each node and mark it with `nc:operation="delete"`.

use itertools::Itertools;
use netauto_model::{EvpnService, Interface, LacpMode, Lag, SwitchportMode, Vlan, Vrf};

use crate::context::PlatformContext;
use crate::document::{
    ConfigDocument, Element, BGPVRF, IF, IFAGG, IFEXT, NETINST, VLAN, VRF, VXLAN,
};
use crate::error::{RenderError, RenderResult};
use crate::payload::Payload;
use crate::renderer::{evpn_vlan_name, subinterface_name, DeviceRenderer};

/// Network-instance type of EVPN services
pub const MAC_VRF: &str = "mac-vrf";

/// A route target with its merged direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub value: String,
    pub import: bool,
    pub export: bool,
}

impl RouteTarget {
    pub fn direction(&self) -> &'static str {
        match (self.import, self.export) {
            (true, true) => "import export",
            (true, false) => "import",
            _ => "export",
        }
    }
}

/// Merges import and export lists into one entry per route target.
///
/// Entries follow first appearance, imports before exports.
pub fn merge_route_targets(vrf: &Vrf) -> Vec<RouteTarget> {
    let mut merged: Vec<RouteTarget> = Vec::new();
    let tagged = vrf
        .rt_import
        .iter()
        .map(|rt| (rt, true))
        .chain(vrf.rt_export.iter().map(|rt| (rt, false)));
    for (value, is_import) in tagged {
        let idx = match merged.iter().position(|rt| &rt.value == value) {
            Some(idx) => idx,
            None => {
                merged.push(RouteTarget {
                    value: value.clone(),
                    import: false,
                    export: false,
                });
                merged.len() - 1
            }
        };
        let entry = &mut merged[idx];
        if is_import {
            entry.import = true;
        } else {
            entry.export = true;
        }
    }
    merged
}

/// VLANs carried by `interface`, ascending without duplicates.
///
/// The first occurrence of a VLAN ID keeps its name and S-tag.
fn carried_vlans(interface: &Interface) -> Vec<Vlan> {
    let vlans: Vec<Vlan> = match interface.mode {
        SwitchportMode::Trunk => interface.trunk_vlans.clone(),
        SwitchportMode::Access => interface.access_vlan.into_iter().map(Vlan::from).collect(),
        SwitchportMode::Routed => Vec::new(),
    };
    vlans
        .into_iter()
        .sorted_by_key(Vlan::id)
        .dedup_by(|a, b| a.vlan_id == b.vlan_id)
        .collect()
}

/// Renderer for structured-document platforms
#[derive(Debug, Clone)]
pub struct OcnosRenderer {
    context: PlatformContext,
}

impl Default for OcnosRenderer {
    fn default() -> Self {
        Self::new(PlatformContext::ocnos())
    }
}

impl OcnosRenderer {
    pub fn new(context: PlatformContext) -> Self {
        Self { context }
    }

    fn require_parent<'a>(
        &self,
        interface: Option<&'a Interface>,
        operation: &str,
    ) -> RenderResult<&'a Interface> {
        match interface {
            Some(intf) if !intf.name.trim().is_empty() => Ok(intf),
            _ => Err(RenderError::missing_field("interface", operation)),
        }
    }

    /// `<if:interface>` with name and the mtu/description config leaves.
    fn interface_element(&self, name: &str, mtu: Option<u32>, description: Option<&str>) -> Element {
        let mut config = Element::qualified(IF, "config");
        if let Some(mtu) = mtu {
            config.push(Element::leaf(IF, "mtu", mtu.to_string()));
        }
        if let Some(description) = description {
            config.push(Element::leaf(IF, "description", description));
        }
        Element::qualified(IF, "interface")
            .with_child(Element::leaf(IF, "name", name))
            .with_child(config)
    }

    fn interface_delete_element(&self, name: &str) -> Element {
        Element::qualified(IF, "interface")
            .marked_delete()
            .with_child(Element::leaf(IF, "name", name))
    }

    fn interfaces(&self, children: impl IntoIterator<Item = Element>) -> Element {
        Element::qualified(IF, "interfaces").with_children(children)
    }

    fn member_aggregation(&self, lag_number: u32, mode: LacpMode) -> Element {
        let mut config = Element::qualified(IFAGG, "config");
        match mode {
            LacpMode::Static => {
                config.push(Element::leaf(IFAGG, "agg-type", "static"));
                config.push(Element::leaf(IFAGG, "aggregate-id", lag_number.to_string()));
            }
            LacpMode::Active | LacpMode::Passive => {
                config.push(Element::leaf(IFAGG, "agg-type", "lacp"));
                config.push(Element::leaf(IFAGG, "aggregate-id", lag_number.to_string()));
                config.push(Element::leaf(IFAGG, "lacp-mode", mode.as_str()));
            }
        }
        Element::qualified(IFAGG, "member-aggregation").with_child(config)
    }

    fn encapsulation(&self, vlan: &Vlan) -> Element {
        let (pop, matches) = match vlan.s_tag {
            None => (
                "1tag",
                Element::qualified(IFEXT, "single-tag-vlan-matches").with_child(
                    Element::qualified(IFEXT, "single-tag-vlan-match")
                        .with_child(Element::leaf(IFEXT, "encapsulation-type", "dot1q"))
                        .with_child(
                            Element::qualified(IFEXT, "config")
                                .with_child(Element::leaf(IFEXT, "encapsulation-type", "dot1q"))
                                .with_child(Element::leaf(
                                    IFEXT,
                                    "outer-vlan-id",
                                    vlan.id().to_string(),
                                )),
                        ),
                ),
            ),
            Some(s_tag) => (
                "2tag",
                Element::qualified(IFEXT, "double-tag-vlan-matches").with_child(
                    Element::qualified(IFEXT, "double-tag-vlan-match")
                        .with_child(Element::leaf(IFEXT, "encapsulation-type", "dot1q"))
                        .with_child(
                            Element::qualified(IFEXT, "config")
                                .with_child(Element::leaf(IFEXT, "encapsulation-type", "dot1q"))
                                .with_child(Element::leaf(
                                    IFEXT,
                                    "outer-vlan-id",
                                    s_tag.to_string(),
                                ))
                                .with_child(Element::leaf(
                                    IFEXT,
                                    "inner-vlan-id",
                                    vlan.id().to_string(),
                                )),
                        ),
                ),
            ),
        };

        let rewrite = Element::qualified(IFEXT, "rewrite").with_child(
            Element::qualified(IFEXT, "config")
                .with_child(Element::leaf(IFEXT, "vlan-action", "pop"))
                .with_child(Element::leaf(IFEXT, "enable-pop", pop)),
        );
        Element::qualified(IFEXT, "extended").with_child(
            Element::qualified(IFEXT, "subinterface-encapsulation")
                .with_child(rewrite)
                .with_child(matches),
        )
    }

    /// Sub-interface block: the parent's MTU, the VLAN's name as description.
    fn subinterface(&self, parent: &Interface, vlan: &Vlan) -> Element {
        let name = subinterface_name(parent, vlan);
        let mut intf = self.interface_element(&name, parent.mtu, vlan.name.as_deref());
        if let Some(config) = intf.children.last_mut() {
            config.push(Element::leaf(IF, "name", name.as_str()));
            config.push(Element::qualified(IF, "enable-switchport"));
        }
        intf.with_child(self.encapsulation(vlan))
    }

    /// VLAN database entry named after the service VLAN.
    fn vlan_database(&self, vlan: &Vlan, delete: bool) -> Element {
        let id = vlan.id().to_string();
        let mut entry =
            Element::qualified(VLAN, "vlan").with_child(Element::leaf(VLAN, "id", id.as_str()));
        if !delete {
            entry.push(
                Element::qualified(VLAN, "config")
                    .with_child(Element::leaf(VLAN, "id", id.as_str()))
                    .with_child(Element::leaf(VLAN, "name", evpn_vlan_name(vlan))),
            );
        }
        Element::qualified(VLAN, "vlan-database")
            .with_child(Element::qualified(VLAN, "vlans").with_child(mark(entry, delete)))
    }

    fn vxlan_mapping(&self, vlan: &Vlan, vni: u32, delete: bool) -> Element {
        let mapping = Element::qualified(VXLAN, "vni-mapping")
            .with_child(Element::leaf(VXLAN, "vni", vni.to_string()))
            .with_child(Element::leaf(VXLAN, "vlan", vlan.id().to_string()));
        Element::qualified(VXLAN, "vxlan").with_child(mark(mapping, delete))
    }

    fn network_instance(&self, vrf: &Vrf, delete: bool) -> Element {
        let route_targets = merge_route_targets(vrf).into_iter().map(|rt| {
            let element = Element::qualified(BGPVRF, "route-target")
                .with_child(Element::leaf(BGPVRF, "rt-rd-string", rt.value.as_str()))
                .with_child(
                    Element::qualified(BGPVRF, "config")
                        .with_child(Element::leaf(BGPVRF, "rt-rd-string", rt.value.as_str()))
                        .with_child(Element::leaf(BGPVRF, "direction", rt.direction())),
                );
            mark(element, delete)
        });

        let bgp_vrf = Element::qualified(BGPVRF, "bgp-vrf")
            .with_child(
                Element::qualified(BGPVRF, "config")
                    .with_child(Element::leaf(BGPVRF, "rd-string", vrf.rd.as_str())),
            )
            .with_child(Element::qualified(BGPVRF, "route-targets").with_children(route_targets));

        let vrf_element = Element::qualified(VRF, "vrf")
            .with_child(
                Element::qualified(VRF, "config")
                    .with_child(Element::leaf(VRF, "vrf-name", vrf.name.as_str())),
            )
            .with_child(mark(bgp_vrf, delete));

        let mut instance = Element::qualified(NETINST, "network-instance")
            .with_child(Element::leaf(NETINST, "instance-name", vrf.name.as_str()))
            .with_child(Element::leaf(NETINST, "instance-type", MAC_VRF));
        if !delete {
            instance.push(
                Element::qualified(NETINST, "config")
                    .with_child(Element::leaf(NETINST, "instance-name", vrf.name.as_str()))
                    .with_child(Element::leaf(NETINST, "instance-type", MAC_VRF)),
            );
        }
        instance.push(mark(vrf_element, delete));

        Element::qualified(NETINST, "network-instances").with_child(mark(instance, delete))
    }
}

fn mark(element: Element, delete: bool) -> Element {
    if delete {
        element.marked_delete()
    } else {
        element
    }
}

impl DeviceRenderer for OcnosRenderer {
    fn context(&self) -> &PlatformContext {
        &self.context
    }

    fn render_interface(&self, interface: &Interface) -> RenderResult<Payload> {
        let interface = self.require_parent(Some(interface), "render_interface")?;
        let block = self.interface_element(
            &interface.name,
            interface.mtu,
            interface.description.as_deref(),
        );
        Ok(Payload::Document(
            ConfigDocument::new().with_block(self.interfaces([block])),
        ))
    }

    fn render_interface_delete(&self, interface: &Interface) -> RenderResult<Payload> {
        let interface = self.require_parent(Some(interface), "render_interface_delete")?;
        let block = self.interface_delete_element(&interface.name);
        Ok(Payload::Document(
            ConfigDocument::new().with_block(self.interfaces([block])),
        ))
    }

    fn render_lag(&self, lag: &Lag) -> RenderResult<Payload> {
        let number = self.context.lag_number(lag.name())?;

        let mut lag_block = self.interface_element(
            lag.name(),
            lag.interface.mtu,
            lag.interface.description.as_deref(),
        );
        if let Some(config) = lag_block.children.last_mut() {
            config.push(Element::qualified(IF, "enable-switchport"));
        }

        let members = lag.members.iter().map(|member| {
            self.interface_element(&member.name, member.mtu, member.description.as_deref())
                .with_child(self.member_aggregation(number, lag.lacp_mode))
        });
        let subinterfaces = carried_vlans(&lag.interface)
            .into_iter()
            .map(|vlan| self.subinterface(&lag.interface, &vlan));

        let interfaces =
            self.interfaces(std::iter::once(lag_block).chain(members).chain(subinterfaces));
        Ok(Payload::Document(ConfigDocument::new().with_block(interfaces)))
    }

    fn render_lag_delete(&self, lag: &Lag) -> RenderResult<Payload> {
        self.context.lag_number(lag.name())?;

        let members = lag.members.iter().map(|member| {
            Element::qualified(IF, "interface")
                .with_child(Element::leaf(IF, "name", member.name.as_str()))
                .with_child(Element::qualified(IFAGG, "member-aggregation").marked_delete())
        });
        let interfaces = self.interfaces(
            std::iter::once(self.interface_delete_element(lag.name())).chain(members),
        );
        Ok(Payload::Document(ConfigDocument::new().with_block(interfaces)))
    }

    fn render_vlan(&self, interface: &Interface, vlan: &Vlan) -> RenderResult<Payload> {
        let parent = self.require_parent(Some(interface), "render_vlan")?;
        Ok(Payload::Document(
            ConfigDocument::new().with_block(self.interfaces([self.subinterface(parent, vlan)])),
        ))
    }

    fn render_vlan_delete(&self, interface: &Interface, vlan: &Vlan) -> RenderResult<Payload> {
        let parent = self.require_parent(Some(interface), "render_vlan_delete")?;
        let block = self.interface_delete_element(&subinterface_name(parent, vlan));
        Ok(Payload::Document(
            ConfigDocument::new().with_block(self.interfaces([block])),
        ))
    }

    fn render_evpn(
        &self,
        interface: Option<&Interface>,
        evpn: &EvpnService,
    ) -> RenderResult<Payload> {
        let mut doc = ConfigDocument::new()
            .with_block(self.vlan_database(&evpn.vlan, false))
            .with_block(self.network_instance(&evpn.vrf(), false))
            .with_block(self.vxlan_mapping(&evpn.vlan, evpn.vni, false));
        if let Some(parent) = interface {
            let parent = self.require_parent(Some(parent), "render_evpn")?;
            doc.push(self.interfaces([self.subinterface(parent, &evpn.vlan)]));
        }
        Ok(Payload::Document(doc))
    }

    fn render_evpn_delete(
        &self,
        interface: Option<&Interface>,
        evpn: &EvpnService,
    ) -> RenderResult<Payload> {
        let mut doc = ConfigDocument::new()
            .with_block(self.vlan_database(&evpn.vlan, true))
            .with_block(self.network_instance(&evpn.vrf(), true))
            .with_block(self.vxlan_mapping(&evpn.vlan, evpn.vni, true));
        if let Some(parent) = interface {
            let parent = self.require_parent(Some(parent), "render_evpn_delete")?;
            let subinterface = subinterface_name(parent, &evpn.vlan);
            doc.push(self.interfaces([self.interface_delete_element(&subinterface)]));
        }
        Ok(Payload::Document(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_route_targets() {
        let vrf = Vrf::new("PROD", "1:1")
            .unwrap()
            .with_import(["65001:1", "65001:2"])
            .with_export(["65001:3", "65001:1"]);
        let merged: Vec<_> = merge_route_targets(&vrf)
            .iter()
            .map(|rt| (rt.value.clone(), rt.direction()))
            .collect();
        assert_eq!(
            merged,
            vec![
                ("65001:1".to_string(), "import export"),
                ("65001:2".to_string(), "import"),
                ("65001:3".to_string(), "export"),
            ]
        );
    }

    #[test]
    fn test_static_lag_has_no_lacp_mode() {
        let lag = Lag::new("po2")
            .unwrap()
            .with_lacp_mode(LacpMode::Static)
            .with_members(vec![Interface::new("eth1").unwrap()]);
        let xml = OcnosRenderer::default().render_lag(&lag).unwrap().to_text();
        assert!(xml.contains("<ifagg:agg-type>static</ifagg:agg-type>"));
        assert!(!xml.contains("lacp-mode"));
    }

    #[test]
    fn test_evpn_without_attachment() {
        let svc = EvpnService::new(Vlan::new(30).unwrap(), "SO9999", 5011).unwrap();
        let renderer = OcnosRenderer::default();

        let xml = renderer.render_evpn(None, &svc).unwrap().to_text();
        assert!(xml.contains("<vlan:name>EVPN_VLAN_30</vlan:name>"));
        assert!(xml.contains("<vxlan:vni>5011</vxlan:vni>"));
        assert!(!xml.contains("<if:interfaces>"));

        let xml = renderer.render_evpn_delete(None, &svc).unwrap().to_text();
        assert!(xml.contains("<vxlan:vni-mapping nc:operation=\"delete\">"));
        assert!(!xml.contains("<if:interfaces>"));
    }

    #[test]
    fn test_evpn_blank_attachment_rejected() {
        let svc = EvpnService::new(Vlan::new(30).unwrap(), "SO9999", 5011).unwrap();
        let mut blank = Interface::new("eth3").unwrap();
        blank.name = " ".to_string();
        assert_eq!(
            OcnosRenderer::default().render_evpn(Some(&blank), &svc),
            Err(RenderError::missing_field("interface", "render_evpn"))
        );
    }

    #[test]
    fn test_lag_renders_carried_vlans_ascending() {
        let mut lag_interface = Interface::trunk("po1", &[30, 10, 20, 10]).unwrap();
        lag_interface.trunk_vlans[1] = Vlan::new(10).unwrap().with_name("PROD");
        let lag = Lag::from_interface(lag_interface)
            .with_members(vec![Interface::new("eth1").unwrap()]);
        let xml = OcnosRenderer::default().render_lag(&lag).unwrap().to_text();

        let positions: Vec<usize> = [
            "<if:name>po1.10</if:name>",
            "<if:name>po1.20</if:name>",
            "<if:name>po1.30</if:name>",
        ]
        .iter()
        .map(|needle| xml.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(xml.find("<if:name>eth1</if:name>").unwrap() < positions[0]);
        assert_eq!(xml.matches("<if:name>po1.10</if:name>").count(), 2);
        assert!(xml.contains("<if:description>PROD</if:description>"));
    }

    #[test]
    fn test_routed_lag_has_no_subinterfaces() {
        let lag = Lag::from_interface(Interface::routed("po1").unwrap())
            .with_members(vec![Interface::new("eth1").unwrap()]);
        let xml = OcnosRenderer::default().render_lag(&lag).unwrap().to_text();
        assert!(!xml.contains("po1."));
    }

    #[test]
    fn test_qinq_uses_double_tag_match() {
        let parent = Interface::new("eth3").unwrap();
        let vlan = Vlan::new(30).unwrap().with_s_tag(200).unwrap();
        let xml = OcnosRenderer::default().render_vlan(&parent, &vlan).unwrap().to_text();
        assert!(xml.contains("<ifext:enable-pop>2tag</ifext:enable-pop>"));
        assert!(xml.contains("<ifext:outer-vlan-id>200</ifext:outer-vlan-id>"));
        assert!(xml.contains("<ifext:inner-vlan-id>30</ifext:inner-vlan-id>"));
        assert!(xml.contains("<if:name>eth3.30</if:name>"));
    }
}
