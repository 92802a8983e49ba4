//! RPC reply inspection.

use netauto_diff::{parse, repair, DiffResult, Node};
use std::fmt;

/// Standard `rpc-error` leaves, in extraction order
pub const RPC_ERROR_FIELDS: &[&str] = &[
    "error-type",
    "error-tag",
    "error-severity",
    "error-app-tag",
    "error-path",
    "error-message",
];

/// Fields of the first `rpc-error` in a reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcErrorInfo {
    fields: Vec<(String, String)>,
}

impl RpcErrorInfo {
    /// Creates an info from ordered field/value pairs.
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn error_tag(&self) -> Option<&str> {
        self.get("error-tag")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.get("error-message")
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl fmt::Display for RpcErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.error_tag(), self.error_message()) {
            (Some(tag), Some(message)) => write!(f, "{}: {}", tag, message),
            (Some(tag), None) => write!(f, "{}", tag),
            (None, Some(message)) => write!(f, "{}", message),
            (None, None) => write!(f, "unspecified rpc-error"),
        }
    }
}

fn parse_reply(reply: &str) -> DiffResult<Node> {
    parse(&repair(reply))
}

/// True when the reply carries `<ok/>` and no `rpc-error`.
pub fn is_rpc_reply_ok(reply: &str) -> DiffResult<bool> {
    let root = parse_reply(reply)?;
    Ok(is_ok_node(&root))
}

fn is_ok_node(root: &Node) -> bool {
    let has = |name: &str| root.local_name() == name || root.find(name).is_some();
    !has("rpc-error") && has("ok")
}

/// Extracts the first `rpc-error`, including `error-info` children.
pub fn extract_rpc_error_info(reply: &str) -> DiffResult<Option<RpcErrorInfo>> {
    let root = parse_reply(reply)?;
    Ok(error_info_of(&root))
}

fn error_info_of(root: &Node) -> Option<RpcErrorInfo> {
    let error = if root.local_name() == "rpc-error" {
        root
    } else {
        root.find("rpc-error")?
    };

    let mut fields: Vec<(String, String)> = RPC_ERROR_FIELDS
        .iter()
        .filter_map(|field| {
            error
                .find(field)
                .map(|n| (field.to_string(), n.text.trim().to_string()))
        })
        .collect();
    if let Some(info) = error.find("error-info") {
        fields.extend(
            info.children
                .iter()
                .map(|c| (c.local_name().to_string(), c.text.trim().to_string())),
        );
    }
    Some(RpcErrorInfo { fields })
}

/// Outcome of checking one reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    Error(RpcErrorInfo),
    /// Neither `<ok/>` nor `rpc-error`
    Unexpected,
}

/// Classifies a reply in one parse.
pub fn reply_status(reply: &str) -> DiffResult<ReplyStatus> {
    let root = parse_reply(reply)?;
    if let Some(info) = error_info_of(&root) {
        return Ok(ReplyStatus::Error(info));
    }
    if is_ok_node(&root) {
        Ok(ReplyStatus::Ok)
    } else {
        Ok(ReplyStatus::Unexpected)
    }
}
