//! Per-host reliability tracking.
//!
//! Counts failed transfer attempts per host and orders hosts (or anything
//! carrying a host) from most to least reliable. The tracker is process-local
//! and never persisted; an `Orchestrator` owns one, or several orchestrators
//! share one through an `Arc`.

mod tracker;

pub use tracker::ReliabilityTracker;

#[cfg(test)]
mod tests;
