//! Device state snapshots.
//!
//! An [`Inventory`] maps interface names to interface or LAG snapshots. The
//! two sides of LAG membership (`Interface::lag_member_of` and `Lag::members`)
//! are kept in sync on every insert.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

use crate::interface::{Interface, Lag};
use crate::vlan::{Vlan, VlanId};

/// VLAN database keyed by VLAN ID
pub type VlanMap = BTreeMap<u16, Vlan>;

/// VNI allocations keyed by VNI
pub type VniMap = BTreeMap<u32, VniEntry>;

/// What a VNI is mapped to on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VniEntry {
    /// Local VLAN bound to the VNI
    pub vlan_id: VlanId,
}

/// One inventory slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InterfaceEntry {
    /// Plain interface
    Interface(Interface),
    /// Link aggregation group
    Lag(Lag),
}

impl InterfaceEntry {
    /// Interface attributes of either kind
    pub fn interface(&self) -> &Interface {
        match self {
            InterfaceEntry::Interface(intf) => intf,
            InterfaceEntry::Lag(lag) => &lag.interface,
        }
    }

    fn interface_mut(&mut self) -> &mut Interface {
        match self {
            InterfaceEntry::Interface(intf) => intf,
            InterfaceEntry::Lag(lag) => &mut lag.interface,
        }
    }

    /// Returns the LAG if this entry is one.
    pub fn as_lag(&self) -> Option<&Lag> {
        match self {
            InterfaceEntry::Lag(lag) => Some(lag),
            InterfaceEntry::Interface(_) => None,
        }
    }
}

/// Interface inventory of one device, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    entries: BTreeMap<String, InterfaceEntry>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an interface snapshot.
    ///
    /// If the interface names a LAG already in the inventory, the LAG's member
    /// list gains it.
    pub fn insert(&mut self, interface: Interface) {
        if let Some(lag_name) = interface.lag_member_of.clone() {
            if let Some(InterfaceEntry::Lag(lag)) = self.entries.get_mut(&lag_name) {
                match lag.members.iter_mut().find(|m| m.name == interface.name) {
                    Some(existing) => *existing = interface.clone(),
                    None => lag.members.push(interface.clone()),
                }
            }
        }
        self.entries
            .insert(interface.name.clone(), InterfaceEntry::Interface(interface));
    }

    /// Inserts a LAG snapshot.
    ///
    /// Existing members in the inventory get their back-reference pointed at
    /// the LAG; members not yet present are inserted. Interfaces already
    /// referencing the LAG by name are appended to its member list.
    pub fn insert_lag(&mut self, mut lag: Lag) {
        let name = lag.name().to_string();
        for member in &mut lag.members {
            member.lag_member_of = Some(name.clone());
            match self.entries.get_mut(&member.name) {
                Some(entry) => entry.interface_mut().lag_member_of = Some(name.clone()),
                None => {
                    self.entries.insert(
                        member.name.clone(),
                        InterfaceEntry::Interface(member.clone()),
                    );
                }
            }
        }
        for entry in self.entries.values() {
            if let InterfaceEntry::Interface(intf) = entry {
                let referenced = intf.lag_member_of.as_deref() == Some(name.as_str());
                if referenced && !lag.members.iter().any(|m| m.name == intf.name) {
                    lag.members.push(intf.clone());
                }
            }
        }
        self.entries.insert(name, InterfaceEntry::Lag(lag));
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&InterfaceEntry> {
        self.entries.get(name)
    }

    /// Looks up interface attributes by name, LAGs included.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.entries.get(name).map(InterfaceEntry::interface)
    }

    /// Looks up a LAG by name.
    pub fn lag(&self, name: &str) -> Option<&Lag> {
        self.entries.get(name).and_then(InterfaceEntry::as_lag)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, InterfaceEntry> {
        self.entries.iter()
    }

    /// Entry names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<InterfaceEntry> for Inventory {
    fn from_iter<T: IntoIterator<Item = InterfaceEntry>>(iter: T) -> Self {
        let mut inventory = Inventory::new();
        let mut lags = Vec::new();
        for entry in iter {
            match entry {
                InterfaceEntry::Interface(intf) => inventory.insert(intf),
                InterfaceEntry::Lag(lag) => lags.push(lag),
            }
        }
        for lag in lags {
            inventory.insert_lag(lag);
        }
        inventory
    }
}

/// Serializable device snapshot used for offline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySnapshot {
    /// Plain interfaces
    pub interfaces: Vec<Interface>,
    /// LAGs with their members
    pub lags: Vec<Lag>,
    /// VLAN database
    pub vlans: Vec<Vlan>,
    /// VNI allocations
    pub vnis: VniMap,
}

impl InventorySnapshot {
    /// Builds the inventory, keeping membership in sync.
    pub fn inventory(&self) -> Inventory {
        self.interfaces
            .iter()
            .cloned()
            .map(InterfaceEntry::Interface)
            .chain(self.lags.iter().cloned().map(InterfaceEntry::Lag))
            .collect()
    }

    /// VLAN database keyed by ID.
    pub fn vlan_map(&self) -> VlanMap {
        self.vlans.iter().map(|v| (v.id(), v.clone())).collect()
    }
}
