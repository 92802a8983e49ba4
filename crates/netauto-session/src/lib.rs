//! Device sessions.
//!
//! [`DeviceSession`] is the contract the reconciliation managers drive:
//! state retrieval plus one transactional push. [`NetconfSession`] and
//! [`CliSession`] implement it over abstract transports, [`MockSession`]
//! over seeded in-memory state.

pub mod cli;
pub mod error;
pub mod mock;
pub mod netconf;
pub mod push;
pub mod rpc;
pub mod session;
pub mod state;

pub use cli::{CliSession, CliTransport};
pub use error::{SessionError, SessionResult};
pub use mock::{MockSession, PushRecord, MOCK_HOST};
pub use netconf::{Datastore, NetconfSession, NetconfTransport};
pub use push::{push_interface, push_vlan};
pub use rpc::{extract_rpc_error_info, is_rpc_reply_ok, reply_status, ReplyStatus, RpcErrorInfo};
pub use session::{CommitResult, DeviceSession, TransportResult};
