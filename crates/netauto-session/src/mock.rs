//! In-memory session for tests and offline previews.

use async_trait::async_trait;
use netauto_model::{
    Interface, Inventory, InventorySnapshot, Lag, Vlan, VlanId, VlanMap, VniEntry, VniMap,
};
use netauto_render::{DeviceRenderer, Payload, PlatformContext, PlatformFamily};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::session::{expect_kind, CommitResult, DeviceSession};

/// Default host of a mock session
pub const MOCK_HOST: &str = "mock";

/// One recorded push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub payload: Payload,
    pub dry_run: bool,
}

/// Session backed by seeded state that records every push.
///
/// Pushes do not change the seeded state.
pub struct MockSession {
    host: String,
    family: PlatformFamily,
    renderer: Box<dyn DeviceRenderer>,
    inventory: Inventory,
    vlans: VlanMap,
    vnis: VniMap,
    pushed: Vec<PushRecord>,
    connected: bool,
    fail_next_push: Option<SessionError>,
}

impl MockSession {
    pub fn new(family: PlatformFamily) -> Self {
        Self {
            host: MOCK_HOST.to_string(),
            family,
            renderer: family.renderer(family.context()),
            inventory: Inventory::new(),
            vlans: VlanMap::new(),
            vnis: VniMap::new(),
            pushed: Vec::new(),
            connected: false,
            fail_next_push: None,
        }
    }

    /// Seeds interfaces, LAGs, VLANs and VNIs from a snapshot.
    pub fn from_snapshot(family: PlatformFamily, snapshot: &InventorySnapshot) -> Self {
        let mut session = Self::new(family);
        session.inventory = snapshot.inventory();
        session.vlans = snapshot.vlan_map();
        session.vnis = snapshot.vnis.clone();
        session
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Replaces the renderer context, e.g. to override the LAG prefix.
    pub fn with_context(mut self, context: PlatformContext) -> Self {
        self.renderer = self.family.renderer(context);
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.inventory.insert(interface);
        self
    }

    pub fn with_lag(mut self, lag: Lag) -> Self {
        self.inventory.insert_lag(lag);
        self
    }

    pub fn with_vlan(mut self, vlan: Vlan) -> Self {
        self.vlans.insert(vlan.id(), vlan);
        self
    }

    pub fn with_vni(mut self, vni: u32, vlan_id: VlanId) -> Self {
        self.vnis.insert(vni, VniEntry { vlan_id });
        self
    }

    /// Makes the next push fail with `error`.
    pub fn fail_next_push(&mut self, error: SessionError) {
        self.fail_next_push = Some(error);
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Every push, in order.
    pub fn pushed(&self) -> &[PushRecord] {
        &self.pushed
    }

    /// Command lines of every pushed command payload, flattened.
    pub fn pushed_commands(&self) -> Vec<String> {
        self.pushed
            .iter()
            .filter_map(|record| record.payload.as_commands())
            .flatten()
            .cloned()
            .collect()
    }

    fn payload_kind(&self) -> &'static str {
        match self.family {
            PlatformFamily::Eos => "commands",
            PlatformFamily::Ocnos => "document",
        }
    }
}

#[async_trait]
impl DeviceSession for MockSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn renderer(&self) -> &dyn DeviceRenderer {
        self.renderer.as_ref()
    }

    async fn connect(&mut self) -> SessionResult<()> {
        debug!(host = %self.host, "mock session connected");
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> SessionResult<()> {
        debug!(host = %self.host, "mock session disconnected");
        self.connected = false;
        Ok(())
    }

    async fn get_interfaces(&mut self) -> SessionResult<Inventory> {
        Ok(self.inventory.clone())
    }

    async fn get_vlans(&mut self) -> SessionResult<VlanMap> {
        Ok(self.vlans.clone())
    }

    async fn get_vnis(&mut self) -> SessionResult<VniMap> {
        Ok(self.vnis.clone())
    }

    async fn push_config(
        &mut self,
        payload: &Payload,
        dry_run: bool,
    ) -> SessionResult<CommitResult> {
        expect_kind(self.platform(), payload, self.payload_kind())?;
        if let Some(error) = self.fail_next_push.take() {
            return Err(error);
        }

        let diff = netauto_diff::unified_diff("", &format!("{}\n", payload.to_text()));
        info!(host = %self.host, dry_run, "mock push of {} payload", payload.kind());
        self.pushed.push(PushRecord {
            payload: payload.clone(),
            dry_run,
        });
        Ok(CommitResult::new(diff, !dry_run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_pushes() {
        let mut session = MockSession::new(PlatformFamily::Eos)
            .with_interface(Interface::trunk("Ethernet1", &[10]).unwrap());
        session.connect().await.unwrap();
        assert!(session.is_connected());

        let inventory = session.get_interfaces().await.unwrap();
        assert!(inventory.contains("Ethernet1"));

        let payload = Payload::commands(["vlan 10", "name PROD"]);
        let result = session.push_config(&payload, true).await.unwrap();
        assert!(!result.committed);
        assert!(result.diff.contains("+vlan 10\n"));
        assert_eq!(session.pushed_commands(), vec!["vlan 10", "name PROD"]);
        assert!(session.pushed()[0].dry_run);
    }

    #[tokio::test]
    async fn test_mock_rejects_foreign_payload() {
        let mut session = MockSession::new(PlatformFamily::Ocnos);
        let err = session
            .push_config(&Payload::commands(["vlan 10"]), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::PayloadMismatch { .. }));
        assert!(session.pushed().is_empty());
    }

    #[tokio::test]
    async fn test_mock_injected_failure() {
        let mut session = MockSession::new(PlatformFamily::Eos);
        session.fail_next_push(SessionError::transport(MOCK_HOST, "connection reset"));
        let payload = Payload::commands(["vlan 10"]);
        assert!(session.push_config(&payload, false).await.is_err());
        assert!(session.push_config(&payload, false).await.is_ok());
        assert_eq!(session.pushed().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_from_snapshot() {
        let snapshot = InventorySnapshot {
            interfaces: vec![Interface::access("Ethernet2", 20).unwrap()],
            vlans: vec![Vlan::new(20).unwrap().with_name("USERS")],
            ..InventorySnapshot::default()
        };
        let mut session = MockSession::from_snapshot(PlatformFamily::Eos, &snapshot)
            .with_vni(10010, VlanId::new(10).unwrap());
        assert!(session.get_interfaces().await.unwrap().contains("Ethernet2"));
        assert_eq!(session.get_vlans().await.unwrap()[&20].name.as_deref(), Some("USERS"));
        assert!(session.get_vnis().await.unwrap().contains_key(&10010));
    }
}
