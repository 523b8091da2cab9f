//! # wlbridge common
//!
//! Shared vocabulary of the bridge between a network-management supplicant and a
//! vendor radio device.
//!
//! * **[`network`]**: BSSIDs, SSIDs and scan result entries.
//! * **[`device`]**: Session identity and the device-level enums (scan kind, power mode, ...).
//! * **Collaborators**: the traits the core drives but does not implement
//!   ([`control`], [`link`], [`events`], [`scheduler`]).
//! * **[`config`]**: Session defaults.

pub mod config;
pub mod control;
pub mod device;
pub mod events;
pub mod link;
pub mod network;
pub mod scheduler;
