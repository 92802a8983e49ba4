//! VLAN identifiers and VLAN intent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, ModelResult};

/// An 802.1Q VLAN identifier, always within [1, 4094].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Lowest usable VLAN ID.
    pub const MIN: u16 = 1;

    /// Highest usable VLAN ID.
    pub const MAX: u16 = 4094;

    /// Validates and wraps a raw VLAN ID.
    pub fn new(value: u16) -> ModelResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::VlanOutOfRange { value })
        }
    }

    /// Returns the raw identifier.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ModelError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> Self {
        id.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A VLAN, optionally named and optionally carried inside an outer S-tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vlan {
    /// VLAN ID
    pub vlan_id: VlanId,
    /// Name, also used as the description of synthetic sub-interfaces
    #[serde(default)]
    pub name: Option<String>,
    /// Outer service tag for QinQ
    #[serde(default)]
    pub s_tag: Option<VlanId>,
}

impl Vlan {
    /// Creates an unnamed VLAN.
    pub fn new(vlan_id: u16) -> ModelResult<Self> {
        Ok(Self {
            vlan_id: VlanId::new(vlan_id)?,
            name: None,
            s_tag: None,
        })
    }

    /// Sets the VLAN name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the outer service tag, validated in the same range as the VLAN ID
    pub fn with_s_tag(mut self, s_tag: u16) -> ModelResult<Self> {
        self.s_tag = Some(VlanId::new(s_tag)?);
        Ok(self)
    }

    /// Raw VLAN ID.
    pub fn id(&self) -> u16 {
        self.vlan_id.get()
    }
}

impl From<VlanId> for Vlan {
    fn from(vlan_id: VlanId) -> Self {
        Self {
            vlan_id,
            name: None,
            s_tag: None,
        }
    }
}
