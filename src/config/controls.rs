use super::{SignalConfig, SimulationConfig};
use crate::error::{SimError, SimResult};

pub const MAX_SURGE_LEVEL: f32 = 5.0;
pub const MAX_SIM_SPEED: f32 = 10.0;

/// Operator inputs the host may change while the simulation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    /// Demand-driven splits when on, a fixed even split when off.
    pub adaptive: bool,
    /// Adds the predictive demand bonus to the east-west pair.
    pub predictive: bool,
    pub surge_level: f32,
    /// Multiplier from wall-clock frame time to simulated time.
    pub sim_speed: f32,
    pub cycle_length: f64,
    pub offset: f64,
    pub smoothing_gain: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl Controls {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            adaptive: true,
            predictive: false,
            surge_level: 0.0,
            sim_speed: 1.0,
            cycle_length: config.signal.cycle_length,
            offset: config.signal.offset,
            smoothing_gain: config.estimator.smoothing_gain,
        }
    }

    pub fn check(&self, signal: &SignalConfig) -> SimResult<()> {
        check_range("surge level", self.surge_level as f64, 0.0, MAX_SURGE_LEVEL as f64)?;
        check_range("smoothing gain", self.smoothing_gain as f64, 0.01, 1.0)?;

        if !(self.sim_speed > 0.0 && self.sim_speed <= MAX_SIM_SPEED) {
            return Err(SimError::ControlOutOfRange {
                name: "simulation speed",
                value: self.sim_speed as f64,
                min: 0.0,
                max: MAX_SIM_SPEED as f64,
            });
        }

        let available = signal.available_green(self.cycle_length);
        let required = 2.0 * signal.min_split;
        if !self.cycle_length.is_finite() || available < required {
            return Err(SimError::CycleTooShort {
                cycle_length: self.cycle_length,
                available,
                required,
            });
        }

        check_range("signal offset", self.offset, 0.0, self.cycle_length)?;

        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> SimResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SimError::ControlOutOfRange { name, value, min, max })
    }
}
