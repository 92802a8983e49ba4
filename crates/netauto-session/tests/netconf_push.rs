//! Push sequencing of the candidate-datastore session.

use async_trait::async_trait;
use netauto_model::Interface;
use netauto_render::{PlatformContext, Payload};
use netauto_session::{
    push_interface, Datastore, DeviceSession, NetconfSession, NetconfTransport, SessionError,
    TransportResult,
};

const OK: &str = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><ok/></rpc-reply>"#;

const RPC_ERROR: &str = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <rpc-error>
    <error-type>protocol</error-type>
    <error-tag>operation-failed</error-tag>
    <error-severity>error</error-severity>
    <error-message>commit failed</error-message>
  </rpc-error>
</rpc-reply>"#;

const RUNNING: &str = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><data>
  <interfaces xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-interface">
    <interface><name>eth3</name><config><name>eth3</name><mtu>1500</mtu></config></interface>
  </interfaces>
</data></rpc-reply>"#;

const CANDIDATE: &str = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><data>
  <interfaces xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-interface">
    <interface><name>eth3</name><config><name>eth3</name><mtu>9000</mtu></config></interface>
  </interfaces>
</data></rpc-reply>"#;

/// Records every RPC and answers `<ok/>` unless told to fail one.
#[derive(Default)]
struct ScriptedTransport {
    calls: Vec<String>,
    rpc_error_on: Option<&'static str>,
    transport_error_on: Option<&'static str>,
    edits: Vec<String>,
}

impl ScriptedTransport {
    fn failing_rpc(op: &'static str) -> Self {
        Self {
            rpc_error_on: Some(op),
            ..Self::default()
        }
    }

    fn failing_transport(op: &'static str) -> Self {
        Self {
            transport_error_on: Some(op),
            ..Self::default()
        }
    }

    fn answer(&mut self, op: &str, body: &str) -> TransportResult<String> {
        self.calls.push(op.to_string());
        if self.transport_error_on == Some(op) {
            return Err("connection reset".to_string());
        }
        if self.rpc_error_on == Some(op) {
            return Ok(RPC_ERROR.to_string());
        }
        Ok(body.to_string())
    }
}

#[async_trait]
impl NetconfTransport for ScriptedTransport {
    async fn open(&mut self) -> TransportResult<()> {
        self.answer("open", OK).map(|_| ())
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.answer("close", OK).map(|_| ())
    }

    async fn get(&mut self, _filter: &str) -> TransportResult<String> {
        self.answer("get", RUNNING)
    }

    async fn get_config(&mut self, source: Datastore) -> TransportResult<String> {
        let body = match source {
            Datastore::Candidate => CANDIDATE,
            _ => RUNNING,
        };
        self.answer(&format!("get-config {}", source), body)
    }

    async fn lock(&mut self, target: Datastore) -> TransportResult<String> {
        self.answer(&format!("lock {}", target), OK)
    }

    async fn unlock(&mut self, target: Datastore) -> TransportResult<String> {
        self.answer(&format!("unlock {}", target), OK)
    }

    async fn edit_config(&mut self, target: Datastore, config: &str) -> TransportResult<String> {
        self.edits.push(config.to_string());
        self.answer(&format!("edit-config {}", target), OK)
    }

    async fn commit(&mut self) -> TransportResult<String> {
        self.answer("commit", OK)
    }

    async fn discard_changes(&mut self) -> TransportResult<String> {
        self.answer("discard-changes", OK)
    }

    async fn copy_config(
        &mut self,
        source: Datastore,
        target: Datastore,
    ) -> TransportResult<String> {
        self.answer(&format!("copy-config {} {}", source, target), OK)
    }
}

fn session(transport: ScriptedTransport) -> NetconfSession<ScriptedTransport> {
    NetconfSession::new("leaf1", transport, PlatformContext::ocnos())
}

fn eth3() -> Interface {
    Interface::new("eth3").unwrap().with_mtu(Some(9000))
}

fn calls(session: &NetconfSession<ScriptedTransport>) -> Vec<&str> {
    session.transport().calls.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_commit_sequence() {
    let mut session = session(ScriptedTransport::default());
    let result = push_interface(&mut session, &eth3(), false, false).await.unwrap();

    assert!(result.committed);
    assert!(result.diff.contains("-          <mtu>1500</mtu>"));
    assert!(result.diff.contains("+          <mtu>9000</mtu>"));
    assert_eq!(
        calls(&session),
        vec![
            "get-config running",
            "lock candidate",
            "edit-config candidate",
            "get-config candidate",
            "commit",
            "copy-config running startup",
            "unlock candidate",
        ]
    );
    assert!(session.transport().edits[0].contains("<if:name>eth3</if:name>"));
}

#[tokio::test]
async fn test_dry_run_discards() {
    let mut session = session(ScriptedTransport::default());
    let result = push_interface(&mut session, &eth3(), false, true).await.unwrap();

    assert!(!result.committed);
    assert!(!result.is_noop());
    assert_eq!(
        calls(&session),
        vec![
            "get-config running",
            "lock candidate",
            "edit-config candidate",
            "get-config candidate",
            "discard-changes",
            "unlock candidate",
        ]
    );
}

#[tokio::test]
async fn test_dry_run_discard_failure_discards_once() {
    let mut session = session(ScriptedTransport::failing_rpc("discard-changes"));
    let err = push_interface(&mut session, &eth3(), false, true)
        .await
        .unwrap_err();

    assert!(
        matches!(err, SessionError::Rpc { ref operation, .. } if operation == "discard-changes")
    );
    let calls = calls(&session);
    assert_eq!(calls.iter().filter(|c| **c == "discard-changes").count(), 1);
    assert_eq!(calls.last(), Some(&"unlock candidate"));
    assert!(!calls.contains(&"commit"));
}

#[tokio::test]
async fn test_commit_error_discards_and_unlocks() {
    let mut session = session(ScriptedTransport::failing_rpc("commit"));
    let err = push_interface(&mut session, &eth3(), false, false)
        .await
        .unwrap_err();

    match err {
        SessionError::Rpc { operation, info, .. } => {
            assert_eq!(operation, "commit");
            assert_eq!(info.error_tag(), Some("operation-failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        calls(&session),
        vec![
            "get-config running",
            "lock candidate",
            "edit-config candidate",
            "get-config candidate",
            "commit",
            "discard-changes",
            "unlock candidate",
        ]
    );
}

#[tokio::test]
async fn test_edit_transport_failure_discards_and_unlocks() {
    let mut session = session(ScriptedTransport::failing_transport("edit-config candidate"));
    let err = push_interface(&mut session, &eth3(), false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Transport { .. }));
    let calls = calls(&session);
    assert_eq!(&calls[calls.len() - 2..], &["discard-changes", "unlock candidate"]);
    assert!(!calls.contains(&"commit"));
}

#[tokio::test]
async fn test_lock_failure_stages_nothing() {
    let mut session = session(ScriptedTransport::failing_rpc("lock candidate"));
    let err = push_interface(&mut session, &eth3(), false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Rpc { .. }));
    assert_eq!(calls(&session), vec!["get-config running", "lock candidate"]);
}

#[tokio::test]
async fn test_unlock_failure_is_reported() {
    let mut session = session(ScriptedTransport::failing_rpc("unlock candidate"));
    let err = push_interface(&mut session, &eth3(), false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Rpc { ref operation, .. } if operation == "unlock"));
    assert!(calls(&session).contains(&"commit"));
}

#[tokio::test]
async fn test_command_payload_rejected() {
    let mut session = session(ScriptedTransport::default());
    let err = session
        .push_config(&Payload::commands(["vlan 10"]), false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::PayloadMismatch { .. }));
    assert!(calls(&session).is_empty());
}

#[tokio::test]
async fn test_get_interfaces() {
    let mut session = session(ScriptedTransport::default());
    session.connect().await.unwrap();
    let inventory = session.get_interfaces().await.unwrap();
    assert_eq!(inventory.interface("eth3").unwrap().mtu, Some(1500));
}
