//! Transactional session over a candidate datastore.
//!
//! A push reads the running datastore, locks the candidate, stages the edit,
//! reads the candidate back and diffs the two. The candidate is then
//! committed and persisted, or discarded for dry runs and failures. The lock
//! is released on every path once it was taken.

use async_trait::async_trait;
use netauto_model::{Inventory, VlanMap, VniMap};
use netauto_render::{DeviceRenderer, OcnosRenderer, Payload, PlatformContext};
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::rpc::{reply_status, ReplyStatus};
use crate::session::{expect_kind, CommitResult, DeviceSession, TransportResult};
use crate::state::ocnos;

/// Configuration datastores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datastore {
    Running,
    Candidate,
    Startup,
}

impl Datastore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datastore::Running => "running",
            Datastore::Candidate => "candidate",
            Datastore::Startup => "startup",
        }
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RPC channel to one device.
///
/// Every call returns the raw reply document. Errors are transport-level
/// failures only; `rpc-error` replies are returned as `Ok` and inspected by
/// the session.
#[async_trait]
pub trait NetconfTransport: Send {
    async fn open(&mut self) -> TransportResult<()>;

    async fn close(&mut self) -> TransportResult<()>;

    /// `get` with a subtree filter.
    async fn get(&mut self, filter: &str) -> TransportResult<String>;

    async fn get_config(&mut self, source: Datastore) -> TransportResult<String>;

    async fn lock(&mut self, target: Datastore) -> TransportResult<String>;

    async fn unlock(&mut self, target: Datastore) -> TransportResult<String>;

    async fn edit_config(&mut self, target: Datastore, config: &str) -> TransportResult<String>;

    async fn commit(&mut self) -> TransportResult<String>;

    async fn discard_changes(&mut self) -> TransportResult<String>;

    async fn copy_config(&mut self, source: Datastore, target: Datastore)
        -> TransportResult<String>;
}

/// Push stage an `<ok/>`-less reply is attributed to
#[derive(Debug, Clone, Copy)]
enum Stage {
    Lock,
    Staging,
    Commit,
}

impl Stage {
    fn error(self, host: &str, message: String) -> SessionError {
        let host = host.to_string();
        match self {
            Stage::Lock => SessionError::Lock { host, message },
            Stage::Staging => SessionError::Staging { host, message },
            Stage::Commit => SessionError::Commit { host, message },
        }
    }
}

/// Session for structured-document platforms.
pub struct NetconfSession<T> {
    host: String,
    transport: T,
    renderer: OcnosRenderer,
}

impl<T: NetconfTransport> NetconfSession<T> {
    pub fn new(host: impl Into<String>, transport: T, context: PlatformContext) -> Self {
        Self {
            host: host.into(),
            transport,
            renderer: OcnosRenderer::new(context),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn transport_error(&self, operation: &str, message: String) -> SessionError {
        SessionError::transport(&self.host, format!("{}: {}", operation, message))
    }

    /// Turns an acknowledgement reply into `Ok(())` or a typed error.
    fn check_ack(
        &self,
        operation: &str,
        stage: Stage,
        reply: TransportResult<String>,
    ) -> SessionResult<()> {
        let reply = reply.map_err(|e| self.transport_error(operation, e))?;
        match reply_status(&reply) {
            Ok(ReplyStatus::Ok) => Ok(()),
            Ok(ReplyStatus::Error(info)) => Err(SessionError::Rpc {
                host: self.host.clone(),
                operation: operation.to_string(),
                info,
            }),
            Ok(ReplyStatus::Unexpected) => Err(stage.error(
                &self.host,
                format!("{} reply carried neither ok nor rpc-error", operation),
            )),
            Err(e) => Err(stage.error(
                &self.host,
                format!("unreadable {} reply: {}", operation, e),
            )),
        }
    }

    /// Returns a data reply unless it carries an `rpc-error`.
    fn check_data(&self, operation: &str, reply: TransportResult<String>) -> SessionResult<String> {
        let reply = reply.map_err(|e| self.transport_error(operation, e))?;
        if let Ok(ReplyStatus::Error(info)) = reply_status(&reply) {
            return Err(SessionError::Rpc {
                host: self.host.clone(),
                operation: operation.to_string(),
                info,
            });
        }
        Ok(reply)
    }

    async fn get_filtered(&mut self, filter: &str) -> SessionResult<String> {
        let reply = self.transport.get(filter).await;
        self.check_data("get", reply)
    }

    async fn get_datastore(&mut self, source: Datastore) -> SessionResult<String> {
        let reply = self.transport.get_config(source).await;
        self.check_data("get-config", reply)
    }

    async fn discard(&mut self) -> SessionResult<()> {
        let reply = self.transport.discard_changes().await;
        self.check_ack("discard-changes", Stage::Staging, reply)
    }

    /// Everything between lock and unlock except the discard, which the
    /// caller issues once for dry runs and failures alike.
    async fn stage(
        &mut self,
        config: &str,
        running: &str,
        dry_run: bool,
    ) -> SessionResult<CommitResult> {
        let reply = self.transport.edit_config(Datastore::Candidate, config).await;
        self.check_ack("edit-config", Stage::Staging, reply)?;
        debug!(host = %self.host, "edit staged in candidate");

        let candidate = self.get_datastore(Datastore::Candidate).await?;
        let diff = netauto_diff::config_diff(running, &candidate)?;
        debug!(host = %self.host, "diff computed:\n{}", diff);

        if dry_run {
            return Ok(CommitResult::new(diff, false));
        }

        let reply = self.transport.commit().await;
        self.check_ack("commit", Stage::Commit, reply)?;
        info!(host = %self.host, "candidate committed");

        let reply = self
            .transport
            .copy_config(Datastore::Running, Datastore::Startup)
            .await;
        self.check_ack("copy-config", Stage::Commit, reply)?;
        debug!(host = %self.host, "running copied to startup");

        Ok(CommitResult::new(diff, true))
    }
}

#[async_trait]
impl<T: NetconfTransport> DeviceSession for NetconfSession<T> {
    fn host(&self) -> &str {
        &self.host
    }

    fn renderer(&self) -> &dyn DeviceRenderer {
        &self.renderer
    }

    async fn connect(&mut self) -> SessionResult<()> {
        self.transport
            .open()
            .await
            .map_err(|e| self.transport_error("connect", e))?;
        info!(host = %self.host, "connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> SessionResult<()> {
        self.transport
            .close()
            .await
            .map_err(|e| self.transport_error("disconnect", e))?;
        info!(host = %self.host, "disconnected");
        Ok(())
    }

    async fn get_interfaces(&mut self) -> SessionResult<Inventory> {
        let reply = self.get_filtered(ocnos::INTERFACES_FILTER).await?;
        ocnos::parse_interfaces(&reply, self.renderer.context())
            .map_err(|e| SessionError::parse(&self.host, "interfaces", e))
    }

    async fn get_vlans(&mut self) -> SessionResult<VlanMap> {
        let reply = self.get_filtered(ocnos::VLANS_FILTER).await?;
        ocnos::parse_vlans(&reply).map_err(|e| SessionError::parse(&self.host, "vlans", e))
    }

    async fn get_vnis(&mut self) -> SessionResult<VniMap> {
        let reply = self.get_filtered(ocnos::VNIS_FILTER).await?;
        ocnos::parse_vnis(&reply).map_err(|e| SessionError::parse(&self.host, "vnis", e))
    }

    async fn push_config(
        &mut self,
        payload: &Payload,
        dry_run: bool,
    ) -> SessionResult<CommitResult> {
        expect_kind(self.renderer.context(), payload, "document")?;
        let config = payload.to_text();

        let running = self.get_datastore(Datastore::Running).await?;
        debug!(host = %self.host, "running datastore retrieved");

        // Nothing is staged yet, so a failed lock needs no cleanup.
        let reply = self.transport.lock(Datastore::Candidate).await;
        self.check_ack("lock", Stage::Lock, reply)?;
        debug!(host = %self.host, "candidate locked");

        let staged = self.stage(&config, &running, dry_run).await;
        let discarded = match &staged {
            Ok(result) if result.committed => Ok(()),
            Ok(_) => {
                let discarded = self.discard().await;
                if discarded.is_ok() {
                    info!(host = %self.host, "dry run, candidate discarded");
                }
                discarded
            }
            Err(e) => {
                error!(host = %self.host, "push failed, discarding candidate: {}", e);
                if let Err(discard) = self.discard().await {
                    warn!(host = %self.host, "discard after failure also failed: {}", discard);
                }
                Ok(())
            }
        };

        let reply = self.transport.unlock(Datastore::Candidate).await;
        let unlocked = self.check_ack("unlock", Stage::Lock, reply);
        match &unlocked {
            Ok(()) => debug!(host = %self.host, "candidate unlocked"),
            Err(e) => warn!(host = %self.host, "unlock failed: {}", e),
        }

        let result = staged?;
        discarded?;
        unlocked?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datastore_names() {
        assert_eq!(Datastore::Running.as_str(), "running");
        assert_eq!(Datastore::Candidate.to_string(), "candidate");
        assert_eq!(Datastore::Startup.as_str(), "startup");
    }

    #[test]
    fn test_stage_errors() {
        assert!(matches!(
            Stage::Lock.error("leaf1", "busy".to_string()),
            SessionError::Lock { .. }
        ));
        assert!(matches!(
            Stage::Commit.error("leaf1", "x".to_string()),
            SessionError::Commit { .. }
        ));
    }
}
