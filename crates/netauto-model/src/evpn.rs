//! VRF and EVPN service intent.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::vlan::Vlan;

/// Default BGP autonomous system used for EVPN services
pub const DEFAULT_BGP_AS: u32 = 65001;

/// Largest 24-bit VXLAN network identifier
pub const VNI_MAX: u32 = 0x00FF_FFFF;

fn default_asn() -> u32 {
    DEFAULT_BGP_AS
}

/// Validates a VXLAN network identifier.
pub fn validate_vni(vni: u32) -> ModelResult<u32> {
    if (1..=VNI_MAX).contains(&vni) {
        Ok(vni)
    } else {
        Err(ModelError::VniOutOfRange { value: vni })
    }
}

/// A VRF with its BGP identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    /// VRF name
    pub name: String,
    /// Route distinguisher
    pub rd: String,
    /// Import route targets, in configured order
    #[serde(default)]
    pub rt_import: Vec<String>,
    /// Export route targets, in configured order
    #[serde(default)]
    pub rt_export: Vec<String>,
}

impl Vrf {
    /// Creates a VRF without route targets.
    pub fn new(name: impl Into<String>, rd: impl Into<String>) -> ModelResult<Self> {
        let vrf = Self {
            name: name.into(),
            rd: rd.into(),
            rt_import: Vec::new(),
            rt_export: Vec::new(),
        };
        if vrf.name.trim().is_empty() {
            return Err(ModelError::invalid_field("vrf.name", "must not be empty"));
        }
        if vrf.rd.trim().is_empty() {
            return Err(ModelError::invalid_field("vrf.rd", "must not be empty"));
        }
        Ok(vrf)
    }

    /// Set the import route targets (builder pattern)
    pub fn with_import<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rt_import = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the export route targets (builder pattern)
    pub fn with_export<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rt_export = targets.into_iter().map(Into::into).collect();
        self
    }
}

/// Where a multi-device service attaches on one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConnection {
    /// Device the attachment lives on
    pub host: String,
    /// Parent interface on that device
    pub interface: String,
}

impl ServiceConnection {
    /// Creates a connection.
    pub fn new(host: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            interface: interface.into(),
        }
    }
}

/// An EVPN/VXLAN service: one VLAN mapped to one VNI inside a VRF.
///
/// `description` doubles as the VRF and network-instance name. When `vrf` is
/// unset the VRF is derived from the service itself, see [`EvpnService::vrf`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvpnService {
    /// Service VLAN
    pub vlan: Vlan,
    /// Service name
    pub description: String,
    /// BGP autonomous system
    #[serde(default = "default_asn")]
    pub asn: u32,
    /// VXLAN network identifier
    pub vni: u32,
    /// Explicit VRF definition
    #[serde(default)]
    pub vrf: Option<Vrf>,
    /// Per-device attachment points
    #[serde(default)]
    pub connections: Vec<ServiceConnection>,
}

impl EvpnService {
    /// Creates a service with the default ASN and a derived VRF.
    pub fn new(vlan: Vlan, description: impl Into<String>, vni: u32) -> ModelResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ModelError::invalid_field("description", "must not be empty"));
        }
        Ok(Self {
            vlan,
            description,
            asn: DEFAULT_BGP_AS,
            vni: validate_vni(vni)?,
            vrf: None,
            connections: Vec::new(),
        })
    }

    /// Set the ASN (builder pattern)
    pub fn with_asn(mut self, asn: u32) -> Self {
        self.asn = asn;
        self
    }

    /// Set an explicit VRF (builder pattern)
    pub fn with_vrf(mut self, vrf: Vrf) -> Self {
        self.vrf = Some(vrf);
        self
    }

    /// Add a per-device attachment (builder pattern)
    pub fn with_connection(mut self, host: impl Into<String>, interface: impl Into<String>) -> Self {
        self.connections.push(ServiceConnection::new(host, interface));
        self
    }

    /// `"{asn}:{vni}"`, the derived route distinguisher and route target.
    pub fn route_key(&self) -> String {
        format!("{}:{}", self.asn, self.vni)
    }

    /// The explicit VRF, or one derived from the service identifiers.
    pub fn vrf(&self) -> Vrf {
        match &self.vrf {
            Some(vrf) => vrf.clone(),
            None => {
                let key = self.route_key();
                Vrf {
                    name: self.description.clone(),
                    rd: key.clone(),
                    rt_import: vec![key.clone()],
                    rt_export: vec![key],
                }
            }
        }
    }

    /// The attachment for `host`, if the service defines one.
    pub fn connection_for(&self, host: &str) -> Option<&ServiceConnection> {
        self.connections.iter().find(|c| c.host == host)
    }

    /// Re-checks the VNI and name after deserialization.
    pub fn validate(&self) -> ModelResult<()> {
        validate_vni(self.vni)?;
        if self.description.trim().is_empty() {
            return Err(ModelError::invalid_field("description", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EvpnService {
        EvpnService::new(Vlan::new(50).unwrap(), "SO9999", 5011)
            .unwrap()
            .with_asn(65511)
    }

    #[test]
    fn test_vni_range() {
        assert!(validate_vni(1).is_ok());
        assert!(validate_vni(VNI_MAX).is_ok());
        assert_eq!(validate_vni(0), Err(ModelError::VniOutOfRange { value: 0 }));
        assert!(validate_vni(VNI_MAX + 1).is_err());
        assert!(EvpnService::new(Vlan::new(10).unwrap(), "x", 0).is_err());
    }

    #[test]
    fn test_derived_vrf() {
        let vrf = service().vrf();
        assert_eq!(vrf.name, "SO9999");
        assert_eq!(vrf.rd, "65511:5011");
        assert_eq!(vrf.rt_import, vec!["65511:5011"]);
        assert_eq!(vrf.rt_export, vec!["65511:5011"]);
    }

    #[test]
    fn test_explicit_vrf_wins() {
        let explicit = Vrf::new("PROD", "10.1.1.1:10010")
            .unwrap()
            .with_import(["65001:10010"])
            .with_export(["65001:10010", "65001:1"]);
        let svc = service().with_vrf(explicit.clone());
        assert_eq!(svc.vrf(), explicit);
    }

    #[test]
    fn test_connection_lookup() {
        let svc = service()
            .with_connection("leaf1", "eth3")
            .with_connection("leaf2", "eth7");
        assert_eq!(svc.connection_for("leaf2").map(|c| c.interface.as_str()), Some("eth7"));
        assert!(svc.connection_for("spine1").is_none());
    }

    #[test]
    fn test_default_asn_from_json() {
        let svc: EvpnService = serde_json::from_str(
            r#"{"vlan": {"vlan_id": 10}, "description": "PROD", "vni": 10010}"#,
        )
        .unwrap();
        assert_eq!(svc.asn, DEFAULT_BGP_AS);
        assert!(svc.validate().is_ok());
    }
}
