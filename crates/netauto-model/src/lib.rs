//! Platform-neutral network intent model.
//!
//! Value objects describing desired device state. Objects are validated on
//! construction so renderers only ever see well-formed input.

pub mod error;
pub mod evpn;
pub mod interface;
pub mod inventory;
pub mod vlan;

pub use error::{ModelError, ModelResult};
pub use evpn::{validate_vni, EvpnService, ServiceConnection, Vrf, DEFAULT_BGP_AS, VNI_MAX};
pub use interface::{Interface, LacpMode, Lag, SwitchportMode, DEFAULT_MTU};
pub use inventory::{InterfaceEntry, Inventory, InventorySnapshot, VlanMap, VniEntry, VniMap};
pub use vlan::{Vlan, VlanId};
