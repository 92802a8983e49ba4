//! Line-command session over named configuration sessions.
//!
//! Commands are staged in `configure session <name>`, the session diff is
//! read back, then the session is committed and saved or aborted.

use async_trait::async_trait;
use netauto_model::{Inventory, VlanMap, VniMap};
use netauto_render::{DeviceRenderer, EosRenderer, Payload, PlatformContext};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::session::{expect_kind, CommitResult, DeviceSession, TransportResult};
use crate::state::eos;

/// Prefix of generated configuration session names
pub const SESSION_PREFIX: &str = "netauto";

/// Saves the running configuration
pub const SAVE_CMD: &str = "copy running-config startup-config";

/// Command channel to one device.
#[async_trait]
pub trait CliTransport: Send {
    async fn open(&mut self) -> TransportResult<()>;

    async fn close(&mut self) -> TransportResult<()>;

    /// Runs commands and returns one JSON result per command.
    async fn run_json(&mut self, commands: &[String]) -> TransportResult<Vec<Value>>;

    /// Runs commands and returns one text output per command.
    async fn run_text(&mut self, commands: &[String]) -> TransportResult<Vec<String>>;
}

pub fn build_configure_session_cmd(name: &str) -> String {
    format!("configure session {}", name)
}

pub fn build_session_diff_cmd(name: &str) -> String {
    format!("show session-config named {} diffs", name)
}

pub fn build_session_commit_cmd(name: &str) -> String {
    format!("configure session {} commit", name)
}

pub fn build_session_abort_cmd(name: &str) -> String {
    format!("configure session {} abort", name)
}

/// Session for line-command platforms.
pub struct CliSession<T> {
    host: String,
    transport: T,
    renderer: EosRenderer,
    sequence: u64,
}

impl<T: CliTransport> CliSession<T> {
    pub fn new(host: impl Into<String>, transport: T, context: PlatformContext) -> Self {
        Self {
            host: host.into(),
            transport,
            renderer: EosRenderer::new(context),
            sequence: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn next_session_name(&mut self) -> String {
        self.sequence += 1;
        format!("{}-{}", SESSION_PREFIX, self.sequence)
    }

    async fn show(&mut self, command: &str) -> SessionResult<Value> {
        let results = self
            .transport
            .run_json(&[command.to_string()])
            .await
            .map_err(|e| SessionError::transport(&self.host, format!("{}: {}", command, e)))?;
        results.into_iter().next().ok_or_else(|| {
            SessionError::parse(&self.host, command, "device returned no result")
        })
    }

    async fn run(&mut self, commands: Vec<String>) -> TransportResult<Vec<String>> {
        self.transport.run_text(&commands).await
    }

    async fn abort(&mut self, name: &str) {
        if let Err(e) = self.run(vec![build_session_abort_cmd(name)]).await {
            warn!(host = %self.host, "failed to abort session {}: {}", name, e);
        }
    }

    async fn stage(&mut self, name: &str, commands: &[String]) -> SessionResult<String> {
        let mut staged = Vec::with_capacity(commands.len() + 2);
        staged.push(build_configure_session_cmd(name));
        staged.extend(commands.iter().cloned());
        staged.push("end".to_string());
        self.run(staged).await.map_err(|message| SessionError::Staging {
            host: self.host.clone(),
            message,
        })?;
        debug!(host = %self.host, "staged {} commands in session {}", commands.len(), name);

        let output = self
            .run(vec![build_session_diff_cmd(name)])
            .await
            .map_err(|message| SessionError::Staging {
                host: self.host.clone(),
                message,
            })?;
        Ok(output.concat())
    }
}

#[async_trait]
impl<T: CliTransport> DeviceSession for CliSession<T> {
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
            .map_err(|e| SessionError::transport(&self.host, e))?;
        info!(host = %self.host, "connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> SessionResult<()> {
        self.transport
            .close()
            .await
            .map_err(|e| SessionError::transport(&self.host, e))?;
        info!(host = %self.host, "disconnected");
        Ok(())
    }

    async fn get_interfaces(&mut self) -> SessionResult<Inventory> {
        let interfaces = self.show(eos::SHOW_INTERFACES).await?;
        let switchports = self.show(eos::SHOW_SWITCHPORT).await?;
        eos::parse_interfaces(&interfaces, &switchports, self.renderer.context())
            .map_err(|e| SessionError::parse(&self.host, "interfaces", e))
    }

    async fn get_vlans(&mut self) -> SessionResult<VlanMap> {
        let reply = self.show(eos::SHOW_VLAN).await?;
        eos::parse_vlans(&reply).map_err(|e| SessionError::parse(&self.host, "vlans", e))
    }

    async fn get_vnis(&mut self) -> SessionResult<VniMap> {
        let reply = self.show(eos::SHOW_VXLAN_VNI).await?;
        eos::parse_vnis(&reply).map_err(|e| SessionError::parse(&self.host, "vnis", e))
    }

    async fn push_config(
        &mut self,
        payload: &Payload,
        dry_run: bool,
    ) -> SessionResult<CommitResult> {
        expect_kind(self.renderer.context(), payload, "commands")?;
        let commands = payload.as_commands().unwrap_or_default();
        let name = self.next_session_name();
        info!(host = %self.host, "started config session {}", name);

        let diff = match self.stage(&name, commands).await {
            Ok(diff) => diff,
            Err(e) => {
                error!(host = %self.host, "aborting session {}: {}", name, e);
                self.abort(&name).await;
                return Err(e);
            }
        };
        debug!(host = %self.host, "config diff for session {}:\n{}", name, diff);

        if dry_run {
            info!(host = %self.host, "dry run, aborting session {}", name);
            self.run(vec![build_session_abort_cmd(&name)])
                .await
                .map_err(|message| SessionError::Staging {
                    host: self.host.clone(),
                    message,
                })?;
            return Ok(CommitResult::new(diff, false));
        }

        info!(host = %self.host, "committing session {}", name);
        if let Err(message) = self.run(vec![build_session_commit_cmd(&name)]).await {
            error!(host = %self.host, "commit of session {} failed: {}", name, message);
            self.abort(&name).await;
            return Err(SessionError::Commit {
                host: self.host.clone(),
                message,
            });
        }
        self.run(vec![SAVE_CMD.to_string()])
            .await
            .map_err(|message| SessionError::Commit {
                host: self.host.clone(),
                message,
            })?;

        Ok(CommitResult::new(diff, true))
    }
}
