//! # vaultsync
//!
//! Umbrella crate re-exporting the vaultsync libraries.

pub use vaultsync_core;
pub use vaultsync_mail;
