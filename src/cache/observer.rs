//! Cache event reporting.

use crate::cache::location::CacheLocation;
use std::fmt;

/// Something that happened to a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// An entry was found and decoded.
    Hit,
    /// No entry exists at the location.
    Miss,
    /// An entry was written.
    Set,
    /// An entry could not be decoded and was removed.
    Corrupt,
    /// An entry was removed after failing verification.
    Evicted,
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheEvent::Hit => "hit",
            CacheEvent::Miss => "miss",
            CacheEvent::Set => "set",
            CacheEvent::Corrupt => "corrupt",
            CacheEvent::Evicted => "evicted",
        };
        f.write_str(name)
    }
}

/// Receives cache events. The store has no opinion on how they surface.
pub trait CacheObserver: Send + Sync {
    /// Called once per cache event.
    fn record(&self, event: CacheEvent, location: &CacheLocation);
}

/// Default observer: emits each event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn record(&self, event: CacheEvent, location: &CacheLocation) {
        match event {
            CacheEvent::Corrupt | CacheEvent::Evicted => {
                tracing::warn!(%location, %event, "cache entry removed");
            }
            _ => tracing::debug!(%location, %event, "cache"),
        }
    }
}
