//! Service Locator
//!
//! A loopback-scoped name-to-address resolution service. Local clients
//! look up a symbolic service name and receive the current `(host, port)`
//! of that service, decoupling them from hostname and IP churn.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      Service Locator                      │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐        ┌───────────────────────┐    │
//! │  │  Registry Loader │───────▶│  Registry (ArcSwap)   │    │
//! │  │  (services.csv)  │ reload │  name → host, port    │    │
//! │  └──────────────────┘        └───────────┬───────────┘    │
//! │                                          │ lock-free read │
//! │                              ┌───────────┴───────────┐    │
//! │                              │  Resolution Server    │    │
//! │                              │  REST, 127.0.0.1 only │    │
//! │                              └───────────┬───────────┘    │
//! └──────────────────────────────────────────┼────────────────┘
//!                                            │ GET /service/:name
//!                                ┌───────────┴───────────┐
//!                                │     LocatorClient     │
//!                                │   (local consumers)   │
//!                                └───────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`registry`]: CSV loading and the atomically swappable registry
//! - [`api`]: REST resolution server
//! - [`client`]: client helper for local consumers
//! - [`error`]: error types and handling

pub mod api;
pub mod client;
pub mod error;
pub mod registry;

// Re-export commonly used types
pub use api::{
    ApiErrorResponse, ApiServer, ApiServerConfig, LocationResponse, ReloadResponse,
    ServiceEntryResponse, DEFAULT_BIND_ADDR,
};

pub use client::{LocatorClient, DEFAULT_LOCATOR_URL};

pub use error::{Error, Result};

pub use registry::{LoadReport, Registry, ServiceRecord, SharedRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
