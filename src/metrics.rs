//! Thread-safe metric state owned by the exporter
//!
//! Values produced fresh on every scrape are plain [`Sample`]s; the types
//! here hold the few values that live across scrapes, such as the
//! availability signal of each API target.
//!
//! [`Sample`]: crate::exposition::Sample

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Thread-safe gauge using atomic operations
#[derive(Debug, Default)]
pub struct Gauge {
    /// Stored as bits of f64 for atomic operations
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Set the gauge to a specific value
    pub fn set(&self, v: f64) {
        self.value.store(v.to_bits(), Ordering::Release);
    }

    /// Get the current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Acquire))
    }
}

/// Gauges keyed by a single label value
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct GaugeVec {
    gauges: Arc<RwLock<BTreeMap<String, Arc<Gauge>>>>,
}

impl GaugeVec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the gauge for a label value
    pub fn with_label(&self, label: &str) -> Arc<Gauge> {
        {
            let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
            if let Some(gauge) = gauges.get(label) {
                return Arc::clone(gauge);
            }
        }

        let mut gauges = self.gauges.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(gauges.entry(label.to_string()).or_default())
    }

    /// Current value for a label, if it was ever set
    pub fn get(&self, label: &str) -> Option<f64> {
        let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
        gauges.get(label).map(|g| g.get())
    }

    /// Snapshot of all label/value pairs, sorted by label
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
        gauges.iter().map(|(k, g)| (k.clone(), g.get())).collect()
    }
}

/// Per-target up/down gauge (1 = last request succeeded, 0 = failed)
///
/// Owned by the API client and injected into the registry, so several
/// clients can share one signal without colliding.
#[derive(Debug, Clone, Default)]
pub struct AvailabilitySignal {
    gauges: GaugeVec,
}

impl AvailabilitySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful request
    pub fn mark_up(&self, target: &str) {
        self.gauges.with_label(target).set(1.0);
    }

    /// Record a failed request
    pub fn mark_down(&self, target: &str) {
        self.gauges.with_label(target).set(0.0);
    }

    /// Current value for a target, `None` before the first request
    pub fn get(&self, target: &str) -> Option<f64> {
        self.gauges.get(target)
    }

    /// All targets with their current value
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        self.gauges.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_operations() {
        let gauge = Gauge::new();
        assert_eq!(gauge.get(), 0.0);

        gauge.set(42.5);
        assert_eq!(gauge.get(), 42.5);
    }

    #[test]
    fn test_gauge_vec_shares_storage() {
        let vec = GaugeVec::new();
        let cloned = vec.clone();

        vec.with_label("a").set(3.0);
        assert_eq!(cloned.get("a"), Some(3.0));
        assert_eq!(cloned.get("b"), None);
    }

    #[test]
    fn test_gauge_vec_snapshot_sorted() {
        let vec = GaugeVec::new();
        vec.with_label("zeta").set(1.0);
        vec.with_label("alpha").set(2.0);

        assert_eq!(
            vec.snapshot(),
            vec![("alpha".to_string(), 2.0), ("zeta".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_availability_signal() {
        let signal = AvailabilitySignal::new();
        assert_eq!(signal.get("https://wg"), None);

        signal.mark_up("https://wg");
        assert_eq!(signal.get("https://wg"), Some(1.0));

        signal.mark_down("https://wg");
        assert_eq!(signal.get("https://wg"), Some(0.0));
    }

    #[test]
    fn test_availability_signal_concurrent_writers() {
        let signal = AvailabilitySignal::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let signal = signal.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if i % 2 == 0 {
                            signal.mark_up("target");
                        } else {
                            signal.mark_down("target");
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let value = signal.get("target").unwrap();
        assert!(value == 0.0 || value == 1.0);
        assert_eq!(signal.snapshot().len(), 1);
    }
}
