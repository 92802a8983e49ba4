//! Configuration-session sequencing of the line-command session.

use async_trait::async_trait;
use netauto_model::SwitchportMode;
use netauto_render::{PlatformContext, Payload};
use netauto_session::{CliSession, CliTransport, DeviceSession, SessionError, TransportResult};
use serde_json::{json, Value};

const DIFF: &str = "--- system:/running-config\n+++ session:/netauto-1-session-config\n@@ -1,1 +1,2 @@\n+vlan 10\n";

#[derive(Default)]
struct ScriptedCli {
    batches: Vec<Vec<String>>,
    fail_on_prefix: Option<&'static str>,
}

#[async_trait]
impl CliTransport for ScriptedCli {
    async fn open(&mut self) -> TransportResult<()> {
        Ok(())
    }

    async fn close(&mut self) -> TransportResult<()> {
        Ok(())
    }

    async fn run_json(&mut self, commands: &[String]) -> TransportResult<Vec<Value>> {
        self.batches.push(commands.to_vec());
        let results = commands
            .iter()
            .map(|cmd| match cmd.as_str() {
                "show interfaces" => json!({
                    "interfaces": {"Ethernet1": {"description": "", "mtu": 1500}}
                }),
                "show interfaces switchport" => json!({
                    "switchports": {
                        "Ethernet1": {"switchportInfo": {"mode": "trunk", "trunkAllowedVlans": "10-12"}}
                    }
                }),
                "show vxlan vni" => json!({"vxlanVnis": {"10010": {"vlanId": 10}}}),
                _ => json!({}),
            })
            .collect();
        Ok(results)
    }

    async fn run_text(&mut self, commands: &[String]) -> TransportResult<Vec<String>> {
        self.batches.push(commands.to_vec());
        if let Some(prefix) = self.fail_on_prefix {
            if commands.iter().any(|c| c.starts_with(prefix)) {
                return Err(format!("% Invalid input: {}", prefix));
            }
        }
        let outputs = commands
            .iter()
            .map(|cmd| {
                if cmd.ends_with(" diffs") {
                    DIFF.to_string()
                } else {
                    String::new()
                }
            })
            .collect();
        Ok(outputs)
    }
}

fn session(transport: ScriptedCli) -> CliSession<ScriptedCli> {
    CliSession::new("spine1", transport, PlatformContext::eos())
}

fn first_commands(session: &CliSession<ScriptedCli>) -> Vec<&str> {
    session
        .transport()
        .batches
        .iter()
        .map(|batch| batch[0].as_str())
        .collect()
}

#[tokio::test]
async fn test_commit_sequence() {
    let mut session = session(ScriptedCli::default());
    let result = session
        .push_config(&Payload::commands(["vlan 10", "name PROD"]), false)
        .await
        .unwrap();

    assert!(result.committed);
    assert_eq!(result.diff, DIFF);
    assert_eq!(
        session.transport().batches[0],
        vec!["configure session netauto-1", "vlan 10", "name PROD", "end"]
    );
    assert_eq!(
        first_commands(&session),
        vec![
            "configure session netauto-1",
            "show session-config named netauto-1 diffs",
            "configure session netauto-1 commit",
            "copy running-config startup-config",
        ]
    );
}

#[tokio::test]
async fn test_dry_run_aborts() {
    let mut session = session(ScriptedCli::default());
    let payload = Payload::commands(["vlan 10"]);
    let result = session.push_config(&payload, true).await.unwrap();
    assert!(!result.committed);

    let second = session.push_config(&payload, true).await.unwrap();
    assert!(!second.committed);
    let commands = first_commands(&session);
    assert_eq!(commands[2], "configure session netauto-1 abort");
    assert_eq!(commands[3], "configure session netauto-2");
    assert!(!commands.iter().any(|c| c.ends_with(" commit")));
}

#[tokio::test]
async fn test_staging_failure_aborts() {
    let mut session = session(ScriptedCli {
        fail_on_prefix: Some("configure session netauto-1"),
        ..ScriptedCli::default()
    });
    let err = session
        .push_config(&Payload::commands(["vlan 10"]), false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Staging { .. }));
    assert_eq!(
        first_commands(&session),
        vec!["configure session netauto-1", "configure session netauto-1 abort"]
    );
}

#[tokio::test]
async fn test_commit_failure_aborts() {
    let mut session = session(ScriptedCli {
        fail_on_prefix: Some("configure session netauto-1 commit"),
        ..ScriptedCli::default()
    });
    let err = session
        .push_config(&Payload::commands(["vlan 10"]), false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Commit { .. }));
    let commands = first_commands(&session);
    assert_eq!(commands.last(), Some(&"configure session netauto-1 abort"));
    assert!(!commands.contains(&"copy running-config startup-config"));
}

#[tokio::test]
async fn test_state_retrieval() {
    let mut session = session(ScriptedCli::default());
    let inventory = session.get_interfaces().await.unwrap();
    let eth1 = inventory.interface("Ethernet1").unwrap();
    assert_eq!(eth1.mode, SwitchportMode::Trunk);
    assert_eq!(eth1.trunk_vlans.len(), 3);

    let vnis = session.get_vnis().await.unwrap();
    assert_eq!(vnis[&10010].vlan_id.get(), 10);
}
