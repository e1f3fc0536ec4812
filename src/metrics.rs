//! Counters for the dynamic program.
//!
//! With the `tracing` feature the counters are relaxed atomics updated by the
//! state engine; without it every method is an inlined no-op and
//! [`DpMetrics::report`] returns zeros.
//!
//! ```rust,ignore
//! let engine = Engine::new(&problem, width);
//! // ... drive the decomposition ...
//! println!("{}", engine.metrics().report());
//! ```

#[cfg(feature = "tracing")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate counters for one evaluation.
#[cfg(feature = "tracing")]
pub struct DpMetrics {
    /// Vertex introductions applied to a whole state vector
    pub introduces: AtomicU64,
    /// Vertex forgets applied to a whole state vector
    pub forgets: AtomicU64,
    /// Edge events
    pub edges: AtomicU64,
    /// Join events at branch bags
    pub joins: AtomicU64,
    /// Successor states beyond the first produced by a callback
    pub branched: AtomicU64,
    /// Input states for which a callback produced no successor
    pub pruned: AtomicU64,
    /// Insertions absorbed by an exactly-equal state
    pub collapsed: AtomicU64,
    /// Weak-equal pairs handed to the join callbacks
    pub join_pairs: AtomicU64,
    /// Pairs discarded by some join callback
    pub join_rejected: AtomicU64,
    /// Largest live state count seen after any operation
    pub peak_states: AtomicU64,
}

#[cfg(feature = "tracing")]
impl DpMetrics {
    pub fn new() -> Self {
        Self {
            introduces: AtomicU64::new(0),
            forgets: AtomicU64::new(0),
            edges: AtomicU64::new(0),
            joins: AtomicU64::new(0),
            branched: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
            collapsed: AtomicU64::new(0),
            join_pairs: AtomicU64::new(0),
            join_rejected: AtomicU64::new(0),
            peak_states: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_introduce(&self) {
        self.introduces.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_forget(&self) {
        self.forgets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_edge(&self) {
        self.edges.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_join(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the successor count a callback returned for one input state.
    #[inline]
    pub fn record_successors(&self, count: usize) {
        if count == 0 {
            self.pruned.fetch_add(1, Ordering::Relaxed);
        } else if count > 1 {
            self.branched
                .fetch_add((count - 1) as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_collapse(&self) {
        self.collapsed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_join_pair(&self, accepted: bool) {
        self.join_pairs.fetch_add(1, Ordering::Relaxed);
        if !accepted {
            self.join_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn observe_live(&self, live: usize) {
        self.peak_states.fetch_max(live as u64, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            introduces: self.introduces.load(Ordering::Relaxed),
            forgets: self.forgets.load(Ordering::Relaxed),
            edges: self.edges.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            branched: self.branched.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            collapsed: self.collapsed.load(Ordering::Relaxed),
            join_pairs: self.join_pairs.load(Ordering::Relaxed),
            join_rejected: self.join_rejected.load(Ordering::Relaxed),
            peak_states: self.peak_states.load(Ordering::Relaxed),
        }
    }
}

#[cfg(feature = "tracing")]
impl Default for DpMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`DpMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsReport {
    pub introduces: u64,
    pub forgets: u64,
    pub edges: u64,
    pub joins: u64,
    pub branched: u64,
    pub pruned: u64,
    pub collapsed: u64,
    pub join_pairs: u64,
    pub join_rejected: u64,
    pub peak_states: u64,
}

impl MetricsReport {
    /// Fraction of weak-equal join pairs that survived every join callback.
    pub fn join_acceptance_rate(&self) -> f64 {
        if self.join_pairs == 0 {
            1.0
        } else {
            (self.join_pairs - self.join_rejected) as f64 / self.join_pairs as f64
        }
    }
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== DP Metrics ===")?;
        writeln!(
            f,
            "Events:        {} introduce, {} forget, {} edge, {} join",
            self.introduces, self.forgets, self.edges, self.joins
        )?;
        writeln!(
            f,
            "States:        {} branched, {} pruned, {} collapsed, peak {}",
            self.branched, self.pruned, self.collapsed, self.peak_states
        )?;
        writeln!(
            f,
            "Join pairs:    {} ({} rejected, {:.1}% accepted)",
            self.join_pairs,
            self.join_rejected,
            self.join_acceptance_rate() * 100.0
        )?;
        Ok(())
    }
}

#[cfg(not(feature = "tracing"))]
pub struct DpMetrics;

#[cfg(not(feature = "tracing"))]
impl DpMetrics {
    #[inline]
    pub fn new() -> Self {
        DpMetrics
    }
    #[inline]
    pub fn record_introduce(&self) {}
    #[inline]
    pub fn record_forget(&self) {}
    #[inline]
    pub fn record_edge(&self) {}
    #[inline]
    pub fn record_join(&self) {}
    #[inline]
    pub fn record_successors(&self, _count: usize) {}
    #[inline]
    pub fn record_collapse(&self) {}
    #[inline]
    pub fn record_join_pair(&self, _accepted: bool) {}
    #[inline]
    pub fn observe_live(&self, _live: usize) {}
    #[inline]
    pub fn report(&self) -> MetricsReport {
        MetricsReport::default()
    }
}

#[cfg(not(feature = "tracing"))]
impl Default for DpMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/metrics.rs"]
mod tests;
