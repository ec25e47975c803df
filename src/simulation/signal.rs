use super::SignalPair;
use crate::config::SignalConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

/// Timing of one signal cycle. Each split is the window of its pair: green
/// for `split - yellow`, then yellow for the rest of the split. Splits share
/// `cycle_length - 2 * yellow`; the north-south yellow runs on to the end of
/// the cycle and absorbs the remaining `2 * yellow`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPlan {
    pub cycle_length: f64,
    pub yellow: f64,
    pub we_split: f64,
    pub ns_split: f64,
    pub offset: f64,
}

impl SignalPlan {
    pub fn even(config: &SignalConfig, cycle_length: f64, offset: f64) -> Self {
        let half = config.available_green(cycle_length) / 2.0;
        Self {
            cycle_length,
            yellow: config.yellow_time,
            we_split: half,
            ns_split: half,
            offset,
        }
    }

    pub fn split(&self, pair: SignalPair) -> f64 {
        match pair {
            SignalPair::EastWest => self.we_split,
            SignalPair::NorthSouth => self.ns_split,
        }
    }
}

/// Where the signal group is inside its cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseState {
    pub active: SignalPair,
    /// Green or yellow; the other pair is red.
    pub light: LightState,
    /// Seconds left in the current green or yellow interval.
    pub remaining: f64,
}

impl PhaseState {
    pub fn light_for(&self, pair: SignalPair) -> LightState {
        if pair == self.active {
            self.light
        } else {
            LightState::Red
        }
    }

    pub fn is_green(&self, pair: SignalPair) -> bool {
        self.light_for(pair) == LightState::Green
    }

    /// Whole seconds shown to observers, never negative.
    pub fn countdown(&self) -> u32 {
        self.remaining.max(0.0).ceil() as u32
    }

    pub fn countdown_for(&self, pair: SignalPair) -> u32 {
        if pair == self.active {
            self.countdown()
        } else {
            0
        }
    }
}

/// Phase of the signal group as a pure function of the time into the cycle.
///
/// East-west is active for the first `we_split` seconds, north-south for
/// the rest of the cycle.
pub fn phase_at(plan: &SignalPlan, local: f64) -> PhaseState {
    let (active, green_end, window_end, into) = if local < plan.we_split {
        (SignalPair::EastWest, plan.we_split - plan.yellow, plan.we_split, local)
    } else {
        (
            SignalPair::NorthSouth,
            plan.ns_split - plan.yellow,
            plan.cycle_length - plan.we_split,
            local - plan.we_split,
        )
    };

    if into < green_end {
        PhaseState { active, light: LightState::Green, remaining: green_end - into }
    } else {
        PhaseState { active, light: LightState::Yellow, remaining: window_end - into }
    }
}

/// Two-pair fixed-order signal driven by total elapsed simulation time.
///
/// A new plan is only committed when the running cycle ends, so a phase is
/// never cut short by a split change.
#[derive(Debug, Clone)]
pub struct SignalController {
    plan: SignalPlan,
    pending: Option<SignalPlan>,
    /// Elapsed time at which the running cycle began.
    anchor: f64,
    state: PhaseState,
    cycles_completed: u64,
}

impl SignalController {
    pub fn new(plan: SignalPlan) -> Self {
        debug_assert!(plan.cycle_length > 0.0);

        let anchor = -plan.offset.rem_euclid(plan.cycle_length);
        let state = phase_at(&plan, -anchor);

        Self {
            plan,
            pending: None,
            anchor,
            state,
            cycles_completed: 0,
        }
    }

    pub fn update(&mut self, elapsed: f64) -> PhaseState {
        while elapsed - self.anchor >= self.plan.cycle_length {
            let boundary = self.anchor + self.plan.cycle_length;
            self.anchor = boundary;
            self.cycles_completed += 1;

            if let Some(next) = self.pending.take() {
                let shift = (next.offset - self.plan.offset).rem_euclid(next.cycle_length);
                self.anchor = boundary - shift;

                log::debug!(
                    "Committed signal plan at t={:.1}s: cycle {:.0}s, WE {:.1}s, NS {:.1}s",
                    boundary, next.cycle_length, next.we_split, next.ns_split
                );
                self.plan = next;
            }
        }

        let local = (elapsed - self.anchor).max(0.0);
        self.state = phase_at(&self.plan, local);
        self.state
    }

    /// Queues a plan for the next cycle boundary, replacing any plan already queued.
    pub fn schedule(&mut self, plan: SignalPlan) {
        debug_assert!(plan.cycle_length > 0.0);
        debug_assert!(
            (plan.we_split + plan.ns_split + 2.0 * plan.yellow - plan.cycle_length).abs() < 1e-9,
            "plan does not fill its cycle: {:?}", plan
        );
        self.pending = Some(plan);
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn plan(&self) -> &SignalPlan {
        &self.plan
    }

    pub fn pending(&self) -> Option<&SignalPlan> {
        self.pending.as_ref()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }
}

/// Offset in whole seconds that lets a platoon leaving one junction on green
/// arrive on green at a junction `distance_m` downstream.
pub fn coordination_offset(distance_m: f64, speed_kmph: f64) -> f64 {
    let speed_m_s = speed_kmph / 3.6;
    (distance_m / speed_m_s).round()
}
