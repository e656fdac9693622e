//! Mutex-guarded failure counters.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory failure counts keyed by host identifier.
///
/// Counts start at zero for unseen hosts and only ever go up. All methods take
/// `&self`, so workers of one call can record concurrently.
#[derive(Debug, Default)]
pub struct ReliabilityTracker {
    failures: Mutex<HashMap<String, u32>>,
}

impl ReliabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        // Counters stay meaningful even if a worker panicked mid-update.
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one failed attempt against `host`.
    pub fn record_failure(&self, host: &str) {
        let mut map = self.lock();
        let count = map.entry(host.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        tracing::debug!("host {} failure count now {}", host, *count);
    }

    /// Failure count for `host` (0 if never seen).
    pub fn failures(&self, host: &str) -> u32 {
        self.lock().get(host).copied().unwrap_or(0)
    }

    /// Hosts reordered by ascending failure count; ties keep input order.
    pub fn rank<S: AsRef<str>>(&self, hosts: &[S]) -> Vec<String> {
        self.rank_by(
            hosts.iter().map(|h| h.as_ref().to_string()).collect(),
            |h| h.as_str(),
        )
    }

    /// Stable sort of arbitrary items by the failure count of the host each carries.
    pub fn rank_by<T, F>(&self, mut items: Vec<T>, host_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        let map = self.lock();
        items.sort_by_key(|item| map.get(host_of(item)).copied().unwrap_or(0));
        items
    }

    /// Copy of all counters, sorted by host, for reporting.
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.lock()
            .iter()
            .map(|(host, count)| (host.clone(), *count))
            .collect()
    }
}
