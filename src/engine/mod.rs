use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Controls, FilterKind, SimulationConfig, Validate};
use crate::error::{SimError, SimResult};
use crate::simulation::{
    ApproachMetrics, ApproachSet, MotionIntegrator, QueueEstimator, SignalController, SignalPlan,
    SimulationState, Spawner, SplitAllocator, SplitDecision,
};

pub mod observer;
pub mod snapshot;

pub use observer::*;
pub use snapshot::*;

/// Simulated time plus the accumulator that gates estimation cycles.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    elapsed: f64,
    since_estimate: f64,
    interval: f64,
}

impl SimulationClock {
    pub fn new(interval: f64) -> Self {
        Self {
            elapsed: 0.0,
            since_estimate: 0.0,
            interval,
        }
    }

    /// Adds `dt` seconds and reports whether an estimation cycle is due.
    ///
    /// At most one cycle fires per call; whole intervals beyond that are dropped.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        self.since_estimate += dt;

        if self.since_estimate < self.interval {
            return false;
        }

        self.since_estimate -= self.interval;
        if self.since_estimate >= self.interval {
            self.since_estimate %= self.interval;
        }
        true
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn since_estimate(&self) -> f64 {
        self.since_estimate
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.since_estimate = 0.0;
    }
}

/// Owns every piece of mutable simulation state and advances it one frame
/// at a time. Hosts read published snapshots and never touch the state.
pub struct SimulationDriver {
    config: SimulationConfig,
    controls: Controls,
    state: SimulationState,
    clock: SimulationClock,
    estimator: QueueEstimator,
    allocator: SplitAllocator,
    signal: SignalController,
    integrator: MotionIntegrator,
    spawner: Spawner,
    last_decision: SplitDecision,
    observers: Vec<Box<dyn SimulationObserver>>,
    publisher: SnapshotPublisher,
    rng: StdRng,
    paused: bool,
}

impl SimulationDriver {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.random.seed;
        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        let controls = Controls::from_config(&config);
        let state = SimulationState::new();
        let estimator = QueueEstimator::new(config.estimator.clone(), config.geometry.clone());
        let signal = SignalController::new(SignalPlan::even(&config.signal, controls.cycle_length, controls.offset));
        let publisher = SnapshotPublisher::new(SimulationSnapshot::capture(&state, &signal, estimator.metrics()));

        log::debug!(
            "Driver ready: cycle {:.0}s, yellow {:.0}s, estimation every {:.0}s, seed {:?}",
            controls.cycle_length, config.signal.yellow_time, config.estimator.interval, seed
        );

        Ok(Self {
            clock: SimulationClock::new(config.estimator.interval),
            allocator: SplitAllocator::new(config.allocator.clone(), config.signal.clone()),
            integrator: MotionIntegrator::new(config.geometry.clone(), config.motion.clone()),
            spawner: Spawner::new(&config, seed),
            last_decision: even_decision(&config, &controls),
            controls,
            state,
            estimator,
            signal,
            observers: Vec::new(),
            publisher,
            rng,
            paused: false,
            config,
        })
    }

    /// Advances the simulation by one host frame of `frame_dt` wall-clock
    /// seconds, scaled by the simulation speed control.
    pub fn tick(&mut self, frame_dt: f64) -> SimResult<()> {
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            return Err(SimError::InvalidTimestep(frame_dt));
        }
        if self.paused || frame_dt == 0.0 {
            return Ok(());
        }

        let dt = frame_dt * self.controls.sim_speed as f64;
        let estimate_due = self.clock.advance(dt);

        self.state.time = self.clock.elapsed();
        self.state.dt = dt as f32;
        self.state.ticks += 1;

        // A plan estimated this tick is queued before the signal advances, so
        // it can commit at a boundary reached on the same tick.
        if estimate_due {
            self.run_estimation_cycle();
        }

        let phase = self.signal.update(self.clock.elapsed());
        self.integrator.update(&mut self.state, &phase);
        self.spawner.update(&mut self.state, self.controls.surge_level);

        self.publish();
        Ok(())
    }

    fn run_estimation_cycle(&mut self) {
        let metrics = self.estimator.estimate(&self.state.vehicles).clone();
        let decision = self.allocator.allocate(&metrics, &self.controls);
        let plan = self.plan_for(&decision);
        self.signal.schedule(plan);

        let report = CycleReport::new(
            self.clock.elapsed(),
            &metrics,
            &decision,
            self.controls.adaptive,
            self.controls.surge_level,
            self.rng.gen_range(0.0..3.0),
        );
        let message = narrative(&metrics);
        for observer in &mut self.observers {
            observer.on_narrative(&message);
            observer.on_cycle_report(&report);
        }

        self.last_decision = decision;
    }

    fn plan_for(&self, decision: &SplitDecision) -> SignalPlan {
        SignalPlan {
            cycle_length: self.controls.cycle_length,
            yellow: self.config.signal.yellow_time,
            we_split: decision.we_split,
            ns_split: decision.ns_split,
            offset: self.controls.offset,
        }
    }

    fn publish(&self) {
        self.publisher.publish(SimulationSnapshot::capture(
            &self.state,
            &self.signal,
            self.estimator.metrics(),
        ));
    }

    /// Replaces the operator controls. Changes that affect signal timing are
    /// re-allocated from the latest metrics and wait for the next cycle boundary.
    pub fn set_controls(&mut self, controls: Controls) -> SimResult<()> {
        controls.check(&self.config.signal)?;
        if controls.smoothing_gain != self.controls.smoothing_gain
            && self.config.estimator.filter == FilterKind::Kalman
        {
            return Err(SimError::ControlNotApplicable {
                name: "smoothing gain",
                filter: "kalman",
            });
        }

        let previous = std::mem::replace(&mut self.controls, controls);
        if previous.smoothing_gain != self.controls.smoothing_gain {
            self.estimator.set_smoothing_gain(self.controls.smoothing_gain);
        }

        let replan = previous.adaptive != self.controls.adaptive
            || previous.predictive != self.controls.predictive
            || previous.surge_level != self.controls.surge_level
            || previous.cycle_length != self.controls.cycle_length
            || previous.offset != self.controls.offset;

        if replan {
            let decision = self.allocator.allocate(self.estimator.metrics(), &self.controls);
            let plan = self.plan_for(&decision);
            log::debug!("Controls changed, next cycle: WE {:.1}s NS {:.1}s", plan.we_split, plan.ns_split);
            self.signal.schedule(plan);
            self.last_decision = decision;
        }

        self.publish();
        Ok(())
    }

    /// Clears vehicles, metrics and the clock. Vehicle ids keep counting up.
    pub fn reset(&mut self) {
        self.state = SimulationState::new();
        self.clock.reset();
        self.estimator.reset();
        self.signal = SignalController::new(SignalPlan::even(
            &self.config.signal,
            self.controls.cycle_length,
            self.controls.offset,
        ));
        self.last_decision = even_decision(&self.config, &self.controls);

        log::debug!("Simulation reset");
        self.publish();
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn subscribe(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    pub fn snapshot(&self) -> std::sync::Arc<SimulationSnapshot> {
        self.publisher.latest()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn signal(&self) -> &SignalController {
        &self.signal
    }

    pub fn metrics(&self) -> &ApproachSet<ApproachMetrics> {
        self.estimator.metrics()
    }

    pub fn last_decision(&self) -> &SplitDecision {
        &self.last_decision
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }
}

fn even_decision(config: &SimulationConfig, controls: &Controls) -> SplitDecision {
    let half = config.signal.available_green(controls.cycle_length) / 2.0;
    SplitDecision {
        we_split: half,
        ns_split: half,
        ns_demand: 0.0,
        we_demand: 0.0,
        clamped: false,
    }
}
