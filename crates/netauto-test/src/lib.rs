//! Test infrastructure for netauto managers and sessions
//!
//! Provides:
//! - Inventory, EVPN and snapshot fixtures
//! - Pre-seeded mock sessions for both platform families
//! - Payload verification helpers

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
