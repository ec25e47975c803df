use super::{ApproachMetrics, ApproachSet, SignalPair};
use crate::config::{AllocatorConfig, Controls, SignalConfig};

/// Green-time split for the next cycle, with the demands it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDecision {
    pub we_split: f64,
    pub ns_split: f64,
    pub ns_demand: f64,
    pub we_demand: f64,
    /// True when a pair was pinned to the minimum split.
    pub clamped: bool,
}

impl SplitDecision {
    pub fn priority(&self) -> SignalPair {
        if self.we_demand > self.ns_demand {
            SignalPair::EastWest
        } else {
            SignalPair::NorthSouth
        }
    }

    pub fn total(&self) -> f64 {
        self.we_split + self.ns_split
    }
}

pub struct SplitAllocator {
    config: AllocatorConfig,
    signal: SignalConfig,
}

impl SplitAllocator {
    pub fn new(config: AllocatorConfig, signal: SignalConfig) -> Self {
        Self { config, signal }
    }

    pub fn allocate(&self, metrics: &ApproachSet<ApproachMetrics>, controls: &Controls) -> SplitDecision {
        let surge_bonus = controls.surge_level * self.config.surge_demand_per_level;
        let predictive_bonus = if controls.predictive { self.config.predictive_bonus } else { 0.0 };

        let ns_demand = (metrics.north.filtered + metrics.south.filtered + surge_bonus) as f64;
        let we_demand = (metrics.east.filtered + metrics.west.filtered + predictive_bonus) as f64;

        let available = self.signal.available_green(controls.cycle_length);

        let (we_split, ns_split, clamped) = if controls.adaptive {
            proportional_split(ns_demand, we_demand, available, self.signal.min_split)
        } else {
            (available / 2.0, available / 2.0, false)
        };

        debug_assert!((we_split + ns_split - available).abs() < 1e-9);

        SplitDecision {
            we_split,
            ns_split,
            ns_demand,
            we_demand,
            clamped,
        }
    }
}

/// Splits `available` seconds of green between the pairs in proportion to
/// their demand, pinning the weaker pair to `min_split` when it falls short.
///
/// Returns `(we_split, ns_split, clamped)`. Both minimums hold whenever
/// `available >= 2 * min_split`, which config validation enforces.
pub fn proportional_split(ns_demand: f64, we_demand: f64, available: f64, min_split: f64) -> (f64, f64, bool) {
    let total = (ns_demand + we_demand).max(1.0);

    let mut we_split = we_demand / total * available;
    let mut ns_split = available - we_split;
    let mut clamped = false;

    if we_split < min_split {
        we_split = min_split;
        ns_split = available - min_split;
        clamped = true;
    }
    if ns_split < min_split {
        ns_split = min_split;
        we_split = available - min_split;
        clamped = true;
    }

    (we_split, ns_split, clamped)
}
