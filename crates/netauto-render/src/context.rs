//! Per-platform rendering parameters.

use std::fmt;
use std::str::FromStr;

use crate::eos::EosRenderer;
use crate::error::{RenderError, RenderResult};
use crate::ocnos::OcnosRenderer;
use crate::renderer::DeviceRenderer;

/// Platform identifier of line-command devices
pub const EOS_PLATFORM_ID: &str = "arista_eos";

/// Platform identifier of structured-document devices
pub const OCNOS_PLATFORM_ID: &str = "ipinfusion_ocnos";

/// LAG prefix on line-command devices
pub const EOS_LAG_PREFIX: &str = "Port-Channel";

/// LAG prefix on structured-document devices
pub const OCNOS_LAG_PREFIX: &str = "po";

/// Parameters a renderer needs beyond the intent itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformContext {
    /// Platform identifier
    pub platform_id: String,
    /// Prefix of LAG interface names
    pub lag_prefix: String,
}

impl PlatformContext {
    pub fn new(platform_id: impl Into<String>, lag_prefix: impl Into<String>) -> Self {
        Self {
            platform_id: platform_id.into(),
            lag_prefix: lag_prefix.into(),
        }
    }

    /// Context of line-command devices
    pub fn eos() -> Self {
        Self::new(EOS_PLATFORM_ID, EOS_LAG_PREFIX)
    }

    /// Context of structured-document devices
    pub fn ocnos() -> Self {
        Self::new(OCNOS_PLATFORM_ID, OCNOS_LAG_PREFIX)
    }

    /// Parses the numeric suffix of a LAG name.
    ///
    /// The remainder after the prefix must be a non-empty run of ASCII
    /// digits.
    pub fn lag_number(&self, name: &str) -> RenderResult<u32> {
        let naming_error = || RenderError::LagNaming {
            name: name.to_string(),
            prefix: self.lag_prefix.clone(),
        };
        let digits = name.strip_prefix(&self.lag_prefix).ok_or_else(naming_error)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(naming_error());
        }
        digits.parse::<u32>().map_err(|_| naming_error())
    }

    /// Builds a LAG name from its number.
    pub fn lag_name(&self, number: u32) -> String {
        format!("{}{}", self.lag_prefix, number)
    }

    /// Whether `name` is a LAG on this platform.
    pub fn is_lag(&self, name: &str) -> bool {
        self.lag_number(name).is_ok()
    }
}

/// Supported platform families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Line-command configuration through configure sessions
    Eos,
    /// Structured XML edits through a candidate datastore
    Ocnos,
}

impl PlatformFamily {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Eos => "eos",
            PlatformFamily::Ocnos => "ocnos",
        }
    }

    /// Default context of the family
    pub fn context(&self) -> PlatformContext {
        match self {
            PlatformFamily::Eos => PlatformContext::eos(),
            PlatformFamily::Ocnos => PlatformContext::ocnos(),
        }
    }

    /// Creates the family's renderer for `context`.
    pub fn renderer(&self, context: PlatformContext) -> Box<dyn DeviceRenderer> {
        match self {
            PlatformFamily::Eos => Box::new(EosRenderer::new(context)),
            PlatformFamily::Ocnos => Box::new(OcnosRenderer::new(context)),
        }
    }
}

impl FromStr for PlatformFamily {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eos" | EOS_PLATFORM_ID => Ok(PlatformFamily::Eos),
            "ocnos" | OCNOS_PLATFORM_ID => Ok(PlatformFamily::Ocnos),
            other => Err(RenderError::unsupported(other, "platform selection")),
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
