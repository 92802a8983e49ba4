//! Interface and link aggregation intent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};
use crate::vlan::{Vlan, VlanId};

/// Default MTU for new interfaces
pub const DEFAULT_MTU: u32 = 1500;

/// Switchport mode of an interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchportMode {
    /// Single untagged VLAN
    #[default]
    Access,
    /// Tagged VLAN list
    Trunk,
    /// Layer 3, no switchport
    Routed,
}

impl SwitchportMode {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchportMode::Access => "access",
            SwitchportMode::Trunk => "trunk",
            SwitchportMode::Routed => "routed",
        }
    }
}

impl FromStr for SwitchportMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(SwitchportMode::Access),
            "trunk" => Ok(SwitchportMode::Trunk),
            "routed" => Ok(SwitchportMode::Routed),
            other => Err(ModelError::invalid_enum(
                "mode",
                other,
                "access, trunk, routed",
            )),
        }
    }
}

impl fmt::Display for SwitchportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LACP negotiation mode of a LAG
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LacpMode {
    /// Actively sends LACPDUs
    #[default]
    Active,
    /// Only answers LACPDUs
    Passive,
    /// Static bundle, no LACP
    Static,
}

impl LacpMode {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            LacpMode::Active => "active",
            LacpMode::Passive => "passive",
            LacpMode::Static => "static",
        }
    }
}

impl FromStr for LacpMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LacpMode::Active),
            "passive" => Ok(LacpMode::Passive),
            "static" => Ok(LacpMode::Static),
            other => Err(ModelError::invalid_enum(
                "lacp_mode",
                other,
                "active, passive, static",
            )),
        }
    }
}

impl fmt::Display for LacpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_mtu() -> Option<u32> {
    Some(DEFAULT_MTU)
}

/// A physical or logical interface
///
/// Deserialization runs [`Interface::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InterfaceRecord")]
pub struct Interface {
    /// Interface name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Admin state
    pub enabled: bool,
    /// MTU
    pub mtu: Option<u32>,
    /// Switchport mode
    pub mode: SwitchportMode,
    /// Untagged VLAN in access mode
    pub access_vlan: Option<VlanId>,
    /// Allowed VLANs in trunk mode, in configured order
    pub trunk_vlans: Vec<Vlan>,
    /// Name of the owning LAG. Lookup key only.
    pub lag_member_of: Option<String>,
}

/// Serialized form of [`Interface`], before validation
#[derive(Deserialize)]
struct InterfaceRecord {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default = "default_mtu")]
    mtu: Option<u32>,
    #[serde(default)]
    mode: SwitchportMode,
    #[serde(default)]
    access_vlan: Option<VlanId>,
    #[serde(default)]
    trunk_vlans: Vec<Vlan>,
    #[serde(default)]
    lag_member_of: Option<String>,
}

impl TryFrom<InterfaceRecord> for Interface {
    type Error = ModelError;

    fn try_from(record: InterfaceRecord) -> Result<Self, Self::Error> {
        let interface = Self {
            name: record.name,
            description: record.description,
            enabled: record.enabled,
            mtu: record.mtu,
            mode: record.mode,
            access_vlan: record.access_vlan,
            trunk_vlans: record.trunk_vlans,
            lag_member_of: record.lag_member_of,
        };
        interface.validate()?;
        Ok(interface)
    }
}

impl Interface {
    /// Creates an access-mode interface with default MTU and no VLAN.
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let interface = Self {
            name: name.into(),
            description: None,
            enabled: true,
            mtu: Some(DEFAULT_MTU),
            mode: SwitchportMode::Access,
            access_vlan: None,
            trunk_vlans: Vec::new(),
            lag_member_of: None,
        };
        interface.validate()?;
        Ok(interface)
    }

    /// Creates an access-mode interface carrying `vlan_id` untagged.
    pub fn access(name: impl Into<String>, vlan_id: u16) -> ModelResult<Self> {
        let mut interface = Self::new(name)?;
        interface.access_vlan = Some(VlanId::new(vlan_id)?);
        Ok(interface)
    }

    /// Creates a trunk interface allowing `vlan_ids` in the given order.
    pub fn trunk(name: impl Into<String>, vlan_ids: &[u16]) -> ModelResult<Self> {
        let mut interface = Self::new(name)?;
        interface.mode = SwitchportMode::Trunk;
        interface.trunk_vlans = vlan_ids
            .iter()
            .map(|id| Vlan::new(*id))
            .collect::<ModelResult<_>>()?;
        Ok(interface)
    }

    /// Creates a routed interface.
    pub fn routed(name: impl Into<String>) -> ModelResult<Self> {
        let mut interface = Self::new(name)?;
        interface.mode = SwitchportMode::Routed;
        Ok(interface)
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MTU (builder pattern)
    pub fn with_mtu(mut self, mtu: Option<u32>) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the admin state (builder pattern)
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the owning LAG (builder pattern)
    pub fn with_lag_member_of(mut self, lag: impl Into<String>) -> Self {
        self.lag_member_of = Some(lag.into());
        self
    }

    /// Checks the field invariants.
    ///
    /// Access mode carries no trunk list, trunk mode carries no access VLAN,
    /// and routed mode carries neither.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::invalid_field("name", "must not be empty"));
        }
        match self.mode {
            SwitchportMode::Access if !self.trunk_vlans.is_empty() => Err(
                ModelError::invalid_field(
                    "trunk_vlans",
                    format!("{} is in access mode but lists trunk VLANs", self.name),
                ),
            ),
            SwitchportMode::Trunk if self.access_vlan.is_some() => {
                Err(ModelError::invalid_field(
                    "access_vlan",
                    format!("{} is in trunk mode but sets an access VLAN", self.name),
                ))
            }
            SwitchportMode::Routed
                if self.access_vlan.is_some() || !self.trunk_vlans.is_empty() =>
            {
                Err(ModelError::invalid_field(
                    "mode",
                    format!("{} is routed but carries VLANs", self.name),
                ))
            }
            _ => Ok(()),
        }
    }

    /// VLAN IDs this interface carries, in configured order.
    pub fn vlan_ids(&self) -> Vec<VlanId> {
        match self.mode {
            SwitchportMode::Trunk => self.trunk_vlans.iter().map(|v| v.vlan_id).collect(),
            SwitchportMode::Access => self.access_vlan.into_iter().collect(),
            SwitchportMode::Routed => Vec::new(),
        }
    }
}

fn default_min_links() -> u32 {
    1
}

/// A link aggregation group.
///
/// `members` is the authoritative, ordered list used for rendering; each
/// member's `lag_member_of` mirrors it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lag {
    /// The LAG's own interface attributes
    pub interface: Interface,
    /// Member interfaces, in caller order
    #[serde(default)]
    pub members: Vec<Interface>,
    /// LACP mode
    #[serde(default)]
    pub lacp_mode: LacpMode,
    /// Minimum number of active links
    #[serde(default = "default_min_links")]
    pub min_links: u32,
    /// LACP system MAC override
    #[serde(default)]
    pub system_mac: Option<String>,
}

impl Lag {
    /// Creates an empty LAG with default LACP settings.
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        Ok(Self {
            interface: Interface::new(name)?,
            members: Vec::new(),
            lacp_mode: LacpMode::Active,
            min_links: 1,
            system_mac: None,
        })
    }

    /// Wraps an existing interface snapshot as a LAG.
    pub fn from_interface(interface: Interface) -> Self {
        Self {
            interface,
            members: Vec::new(),
            lacp_mode: LacpMode::Active,
            min_links: 1,
            system_mac: None,
        }
    }

    /// LAG name
    pub fn name(&self) -> &str {
        &self.interface.name
    }

    /// Set the members (builder pattern).
    ///
    /// Each member's back-reference is pointed at this LAG.
    pub fn with_members(mut self, members: impl IntoIterator<Item = Interface>) -> Self {
        let name = self.interface.name.clone();
        self.members = members
            .into_iter()
            .map(|m| m.with_lag_member_of(name.clone()))
            .collect();
        self
    }

    /// Set the LACP mode (builder pattern)
    pub fn with_lacp_mode(mut self, lacp_mode: LacpMode) -> Self {
        self.lacp_mode = lacp_mode;
        self
    }

    /// Set the minimum active links (builder pattern)
    pub fn with_min_links(mut self, min_links: u32) -> ModelResult<Self> {
        if min_links == 0 {
            return Err(ModelError::invalid_field("min_links", "must be at least 1"));
        }
        self.min_links = min_links;
        Ok(self)
    }

    /// Set the LACP system MAC (builder pattern)
    pub fn with_system_mac(mut self, mac: impl Into<String>) -> Self {
        self.system_mac = Some(mac.into());
        self
    }

    /// Member names in rendering order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Checks the LAG and all member snapshots.
    pub fn validate(&self) -> ModelResult<()> {
        self.interface.validate()?;
        if self.min_links == 0 {
            return Err(ModelError::invalid_field("min_links", "must be at least 1"));
        }
        for member in &self.members {
            member.validate()?;
            if let Some(owner) = &member.lag_member_of {
                if owner != self.name() {
                    return Err(ModelError::invalid_field(
                        "members",
                        format!(
                            "{} is listed in {} but belongs to {}",
                            member.name,
                            self.name(),
                            owner
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}
