//! Application core — the controller and its boundary.
//!
//! The controller consumes host resources exclusively through the port
//! traits in [`ports`], so the whole lifecycle is testable with mock
//! handles.

pub mod commands;
pub mod ports;
pub mod service;
