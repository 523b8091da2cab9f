//! # wlbridge core
//!
//! Per-interface driver sessions that translate supplicant requests into the
//! radio's private command set.

pub mod command;
pub mod deadline;
pub mod device;
pub mod error;
pub mod events;
pub mod filter;
pub mod merge;
pub mod mock;
pub mod network;
pub mod scanner;
pub mod session;
pub mod transport;

pub use command::DriverCommand;
pub use error::DriverError;
pub use session::{AssociateParams, Collaborators, Session};
