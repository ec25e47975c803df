use std::sync::{Arc, RwLock};

use crate::simulation::{
    ApproachMetrics, ApproachSet, Direction, LightState, Point, SignalController, SignalPair,
    SimulationState, VehicleClass, VehicleId,
};

/// Render-facing view of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleView {
    pub id: VehicleId,
    pub class: VehicleClass,
    pub direction: Direction,
    pub position: Point,
    pub rotation: f32,
    pub color: &'static str,
    pub length: f32,
    pub width: f32,
    pub speed: f32,
    /// Simulated seconds since the vehicle entered the plane.
    pub age: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSignal {
    pub light: LightState,
    pub countdown: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    pub active: SignalPair,
    pub north_south: PairSignal,
    pub east_west: PairSignal,
    pub we_split: f64,
    pub ns_split: f64,
    pub cycle_length: f64,
    pub offset: f64,
    /// A new plan is waiting for the next cycle boundary.
    pub plan_pending: bool,
    pub metrics: ApproachSet<ApproachMetrics>,
}

impl SignalSnapshot {
    pub fn pair(&self, pair: SignalPair) -> &PairSignal {
        match pair {
            SignalPair::NorthSouth => &self.north_south,
            SignalPair::EastWest => &self.east_west,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSnapshot {
    pub time: f64,
    pub ticks: u64,
    pub vehicles: Vec<VehicleView>,
    pub signal: SignalSnapshot,
    pub total_spawned: u64,
    pub total_exited: u64,
}

impl SimulationSnapshot {
    pub fn capture(
        state: &SimulationState,
        signal: &SignalController,
        metrics: &ApproachSet<ApproachMetrics>,
    ) -> Self {
        let phase = signal.state();
        let plan = signal.plan();
        let pair_signal = |pair| PairSignal {
            light: phase.light_for(pair),
            countdown: phase.countdown_for(pair),
        };

        let vehicles = state
            .vehicles
            .iter()
            .map(|v| VehicleView {
                id: v.id,
                class: v.class,
                direction: v.direction,
                position: v.position,
                rotation: v.direction.rotation_degrees(),
                color: v.class.color(),
                length: v.length,
                width: v.width,
                speed: v.speed(),
                age: state.time - v.spawn_time,
            })
            .collect();

        Self {
            time: state.time,
            ticks: state.ticks,
            vehicles,
            signal: SignalSnapshot {
                active: phase.active,
                north_south: pair_signal(SignalPair::NorthSouth),
                east_west: pair_signal(SignalPair::EastWest),
                we_split: plan.we_split,
                ns_split: plan.ns_split,
                cycle_length: plan.cycle_length,
                offset: plan.offset,
                plan_pending: signal.pending().is_some(),
                metrics: metrics.clone(),
            },
            total_spawned: state.total_spawned,
            total_exited: state.total_exited,
        }
    }
}

/// Single-writer side of the snapshot slot. Each publish swaps the whole
/// snapshot; the lock is held only for the pointer swap.
#[derive(Debug)]
pub struct SnapshotPublisher {
    slot: Arc<RwLock<Arc<SimulationSnapshot>>>,
}

impl SnapshotPublisher {
    pub fn new(initial: SimulationSnapshot) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub fn publish(&self, snapshot: SimulationSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = snapshot;
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn latest(&self) -> Arc<SimulationSnapshot> {
        self.reader().latest()
    }
}

/// Read handle given to hosts; cheap to clone and safe to move across threads.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    slot: Arc<RwLock<Arc<SimulationSnapshot>>>,
}

impl SnapshotReader {
    pub fn latest(&self) -> Arc<SimulationSnapshot> {
        let slot = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&slot)
    }
}
