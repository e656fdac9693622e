use std::sync::Arc;

use super::ReliabilityTracker;

#[test]
fn unseen_host_has_zero_failures() {
    let tracker = ReliabilityTracker::new();
    assert_eq!(tracker.failures("nowhere"), 0);
    assert!(tracker.snapshot().is_empty());
}

#[test]
fn rank_puts_least_failing_host_first() {
    let tracker = ReliabilityTracker::new();
    for _ in 0..3 {
        tracker.record_failure("A");
    }
    assert_eq!(tracker.failures("A"), 3);
    assert_eq!(tracker.failures("B"), 0);
    assert_eq!(tracker.rank(&["A", "B"]), vec!["B", "A"]);
}

#[test]
fn rank_is_stable_for_ties() {
    let tracker = ReliabilityTracker::new();
    tracker.record_failure("multiupload");
    tracker.record_failure("multiupload");
    tracker.record_failure("multiupload");
    tracker.record_failure("ge_tt");
    let ranked = tracker.rank(&["ge_tt", "multiupload", "rghost", "fail", "zippy"]);
    assert_eq!(ranked, vec!["rghost", "fail", "zippy", "ge_tt", "multiupload"]);
}

#[test]
fn rank_keeps_duplicates() {
    let tracker = ReliabilityTracker::new();
    tracker.record_failure("x");
    assert_eq!(tracker.rank(&["x", "y", "x"]), vec!["y", "x", "x"]);
}

#[test]
fn rank_by_orders_items_carrying_hosts() {
    let tracker = ReliabilityTracker::new();
    tracker.record_failure("slow");
    let items = vec![("slow", 1), ("fast", 2), ("other", 3)];
    let ranked = tracker.rank_by(items, |item| item.0);
    assert_eq!(ranked, vec![("fast", 2), ("other", 3), ("slow", 1)]);
}

#[test]
fn concurrent_increments_are_not_lost() {
    let tracker = Arc::new(ReliabilityTracker::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                let host = if i % 2 == 0 { "even" } else { "odd" };
                for _ in 0..250 {
                    tracker.record_failure(host);
                    tracker.record_failure("shared");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(tracker.failures("even"), 1000);
    assert_eq!(tracker.failures("odd"), 1000);
    assert_eq!(tracker.failures("shared"), 2000);
    let snap = tracker.snapshot();
    assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["even", "odd", "shared"]);
}
