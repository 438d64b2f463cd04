//! Registry Module
//!
//! Loads the service mapping from its CSV source and holds the current
//! snapshot for lock-free concurrent resolution.

pub mod loader;
pub mod store;

pub use loader::{load, LoadReport};
pub use store::{Registry, ServiceRecord, SharedRegistry};
