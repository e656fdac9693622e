//! Constructor and policy-helper tests. Transfer behavior is covered by the
//! integration tests under `tests/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{TransferBackend, TransferError};
use crate::config::RdistConfig;
use crate::reliability::ReliabilityTracker;

use super::upload::redundancy_met;
use super::{ErrorKind, Orchestrator};

struct NoBackend;

impl TransferBackend for NoBackend {
    fn upload(&self, _file: &Path, _host: &str) -> Result<String, TransferError> {
        Err(TransferError::EmptyOutput("none".into()))
    }

    fn download(&self, _locator: &str, _dest_dir: &Path) -> Result<PathBuf, TransferError> {
        Err(TransferError::EmptyOutput("none".into()))
    }
}

fn hosts(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn redundancy_threshold() {
    assert!(!redundancy_met(0, 3, 0.6));
    assert!(!redundancy_met(1, 3, 0.6));
    assert!(redundancy_met(2, 3, 0.6));
    assert!(redundancy_met(3, 3, 1.0));
    assert!(!redundancy_met(2, 3, 1.0));
    assert!(redundancy_met(1, 4, 0.2));
    assert!(!redundancy_met(0, 0, 0.5));
}

#[test]
fn rejects_ratio_outside_unit_interval() {
    for bad in [0.0, -0.1, 1.01, f64::NAN] {
        let err = Orchestrator::new(hosts(&["a"]), bad, Arc::new(NoBackend)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert!(Orchestrator::new(hosts(&["a"]), 1.0, Arc::new(NoBackend)).is_ok());
}

#[test]
fn from_config_carries_limits() {
    let mut cfg = RdistConfig::default();
    cfg.upload_parallelism = Some(2);
    cfg.download_parallelism = 3;
    let orch = Orchestrator::from_config(&cfg, Arc::new(NoBackend)).unwrap();
    assert_eq!(orch.hosts(), cfg.hosts.as_slice());
    assert!((orch.min_redundancy() - 0.6).abs() < 1e-9);
    assert_eq!(orch.upload_parallelism, Some(2));
    assert_eq!(orch.download_parallelism, 3);
}

#[test]
fn parallelism_limits_are_at_least_one() {
    let orch = Orchestrator::new(hosts(&["a"]), 0.5, Arc::new(NoBackend))
        .unwrap()
        .with_upload_parallelism(Some(0))
        .with_download_parallelism(0);
    assert_eq!(orch.upload_parallelism, Some(1));
    assert_eq!(orch.download_parallelism, 1);
}

#[test]
fn orchestrators_share_a_tracker_only_when_asked() {
    let shared = Arc::new(ReliabilityTracker::new());
    let a = Orchestrator::new(hosts(&["x"]), 0.5, Arc::new(NoBackend))
        .unwrap()
        .with_tracker(Arc::clone(&shared));
    let b = Orchestrator::new(hosts(&["x"]), 0.5, Arc::new(NoBackend))
        .unwrap()
        .with_tracker(Arc::clone(&shared));
    let c = Orchestrator::new(hosts(&["x"]), 0.5, Arc::new(NoBackend)).unwrap();
    a.tracker().record_failure("x");
    assert_eq!(b.tracker().failures("x"), 1);
    assert_eq!(c.tracker().failures("x"), 0);
}
