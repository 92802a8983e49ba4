//! Platform renderers.
//!
//! Turns intent snapshots from `netauto-model` into the payload a device
//! session pushes: ordered configuration lines for EOS, a structured edit
//! document for OcNOS. Both live behind [`DeviceRenderer`]; the family is
//! chosen once through [`PlatformFamily::renderer`].

pub mod context;
pub mod document;
pub mod eos;
pub mod error;
pub mod ocnos;
pub mod payload;
pub mod renderer;

pub use context::{PlatformContext, PlatformFamily};
pub use document::{ConfigDocument, Element, Namespace, NamespaceTable};
pub use eos::EosRenderer;
pub use error::{RenderError, RenderResult};
pub use ocnos::OcnosRenderer;
pub use payload::Payload;
pub use renderer::{evpn_vlan_name, subinterface_name, DeviceRenderer};
