//! In-memory service registry
//!
//! The registry is an immutable snapshot of service name → location
//! mappings. Concurrent resolution queries read the current snapshot
//! without locking; a reload builds a complete new [`Registry`] and
//! installs it with a single atomic pointer swap, so in-flight queries
//! always observe one consistent snapshot.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Service Record
// =============================================================================

/// Network location of a single registered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Hostname or IP literal
    pub host: String,
    /// TCP port (1-65535)
    pub port: u16,
}

impl ServiceRecord {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Registry Snapshot
// =============================================================================

/// One immutable snapshot of the service mapping
#[derive(Debug, Clone)]
pub struct Registry {
    services: HashMap<String, ServiceRecord>,
    loaded_at: DateTime<Utc>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::from_records(HashMap::new())
    }

    /// Create a registry from an already-built mapping
    pub fn from_records(services: HashMap<String, ServiceRecord>) -> Self {
        Self {
            services,
            loaded_at: Utc::now(),
        }
    }

    /// Resolve a service name to its record. Exact, case-sensitive match;
    /// the empty name never matches.
    pub fn resolve(&self, service_name: &str) -> Option<&ServiceRecord> {
        self.services.get(service_name)
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// When this snapshot was built
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Iterate over all (name, record) entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServiceRecord)> {
        self.services.iter()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Shared Registry
// =============================================================================

/// Process-wide handle to the current registry snapshot
///
/// Readers call [`SharedRegistry::snapshot`] and keep resolving against
/// that snapshot; [`SharedRegistry::replace`] swaps in a fresh snapshot
/// atomically. Cloning the handle is cheap and shares the same state.
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    inner: Arc<ArcSwap<Registry>>,
}

impl SharedRegistry {
    /// Wrap an initial registry snapshot
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    /// Get the current snapshot
    pub fn snapshot(&self) -> Arc<Registry> {
        self.inner.load_full()
    }

    /// Install a new snapshot, replacing the old one wholesale
    pub fn replace(&self, registry: Registry) {
        self.inner.store(Arc::new(registry));
    }

    /// Resolve against the current snapshot
    pub fn resolve(&self, service_name: &str) -> Option<ServiceRecord> {
        self.inner.load().resolve(service_name).cloned()
    }
}
