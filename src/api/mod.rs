//! API Module
//!
//! REST resolution interface: lookup, listing, reload, and health probes.

pub mod rest;
pub mod server;

pub use rest::*;
pub use server::*;
