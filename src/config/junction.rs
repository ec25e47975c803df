use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

/// Layout of the simulation plane and the single junction in its centre.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub plane_width: f32,
    pub plane_height: f32,
    /// Lateral distance of each travel lane from the road centre line.
    pub lane_offset: f32,
    /// How far outside the plane edge new vehicles appear.
    pub entry_margin: f32,
    /// How far beyond the far plane edge a vehicle is kept before removal.
    pub exit_margin: f32,
    /// Distance from the junction centre to each stop line.
    pub stop_line_distance: f32,
    /// Upstream edge of the window in which a red or yellow light holds traffic.
    pub approach_distance: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            plane_width: 2000.0,
            plane_height: 2000.0,
            lane_offset: 45.0,
            entry_margin: 50.0,
            exit_margin: 100.0,
            stop_line_distance: 60.0,
            approach_distance: 140.0,
        }
    }
}

impl GeometryConfig {
    pub fn junction_x(&self) -> f32 {
        self.plane_width / 2.0
    }

    pub fn junction_y(&self) -> f32 {
        self.plane_height / 2.0
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    pub cycle_length: f64,
    pub yellow_time: f64,
    pub min_split: f64,
    pub offset: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            cycle_length: 66.0,
            yellow_time: 3.0,
            min_split: 10.0,
            offset: 0.0,
        }
    }
}

impl SignalConfig {
    pub fn available_green(&self, cycle_length: f64) -> f64 {
        cycle_length - 2.0 * self.yellow_time
    }

    /// Rejects cycle lengths that cannot give both pairs their minimum split.
    pub fn check_cycle_length(&self, cycle_length: f64) -> Result<()> {
        if !cycle_length.is_finite() || cycle_length <= 0.0 {
            return Err(anyhow!("Cycle length must be positive, got {}", cycle_length));
        }

        let available = self.available_green(cycle_length);
        if available < 2.0 * self.min_split {
            return Err(anyhow!(
                "Cycle length {}s leaves {}s of green, less than two minimum splits of {}s",
                cycle_length, available, self.min_split
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Exponential,
    Kalman,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Simulated seconds between two sensing passes.
    pub interval: f64,
    /// Sensing window measured upstream from the stop line.
    pub sensing_range: f32,
    /// Weighted demand that maps to 100% density.
    pub saturation: f32,
    pub filter: FilterKind,
    pub smoothing_gain: f32,
    pub kalman: KalmanConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            interval: 10.0,
            sensing_range: 450.0,
            saturation: 40.0,
            filter: FilterKind::Exponential,
            smoothing_gain: 0.35,
            kalman: KalmanConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KalmanConfig {
    pub initial_error: f32,
    pub process_variance: f32,
    pub measurement_variance: f32,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            initial_error: 1.0,
            process_variance: 0.1,
            measurement_variance: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Demand added to the north-south pair per unit of surge level.
    pub surge_demand_per_level: f32,
    /// Demand added to the east-west pair while predictive mode is on.
    pub predictive_bonus: f32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            surge_demand_per_level: 20.0,
            predictive_bonus: 35.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Fraction of the gap between current and target speed closed per tick.
    pub friction: f32,
    /// Factor applied to the leader's speed when following inside the safe distance.
    pub follow_damping: f32,
    /// Extra bumper-to-bumper gap kept behind a leader or a held stop line.
    pub min_gap: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            friction: 0.08,
            follow_damping: 0.9,
            min_gap: 2.0,
        }
    }
}

impl Validate for GeometryConfig {
    fn validate(&self) -> Result<()> {
        if self.plane_width <= 0.0 || self.plane_height <= 0.0 {
            return Err(anyhow!("Plane dimensions must be positive"));
        }

        if self.lane_offset < 0.0 || self.entry_margin < 0.0 || self.exit_margin < 0.0 {
            return Err(anyhow!("Lane offset and plane margins must be non-negative"));
        }

        if self.stop_line_distance <= 0.0 {
            return Err(anyhow!("Stop line distance must be positive"));
        }

        if self.approach_distance <= self.stop_line_distance {
            return Err(anyhow!("Approach distance must be greater than stop line distance"));
        }

        let half_extent = self.junction_x().min(self.junction_y());
        if self.approach_distance >= half_extent {
            return Err(anyhow!("Approach window must fit inside the plane"));
        }

        Ok(())
    }
}

impl Validate for SignalConfig {
    fn validate(&self) -> Result<()> {
        if self.yellow_time < 0.0 {
            return Err(anyhow!("Yellow time must be non-negative"));
        }

        if self.min_split <= self.yellow_time {
            return Err(anyhow!("Minimum split must be longer than the yellow time"));
        }

        if !self.offset.is_finite() || self.offset < 0.0 || self.offset > self.cycle_length {
            return Err(anyhow!("Signal offset must be in range [0, cycle length]"));
        }

        self.check_cycle_length(self.cycle_length)
    }
}

impl Validate for EstimatorConfig {
    fn validate(&self) -> Result<()> {
        if self.interval <= 0.0 {
            return Err(anyhow!("Estimation interval must be positive"));
        }

        if self.sensing_range <= 0.0 {
            return Err(anyhow!("Sensing range must be positive"));
        }

        if self.saturation <= 0.0 {
            return Err(anyhow!("Saturation constant must be positive"));
        }

        if self.smoothing_gain < 0.01 || self.smoothing_gain > 1.0 {
            return Err(anyhow!("Smoothing gain must be in range [0.01, 1]"));
        }

        let kalman = &self.kalman;
        if kalman.initial_error < 0.0 || kalman.process_variance < 0.0 {
            return Err(anyhow!("Kalman error and process variance must be non-negative"));
        }

        if kalman.measurement_variance <= 0.0 {
            return Err(anyhow!("Kalman measurement variance must be positive"));
        }

        Ok(())
    }
}

impl Validate for AllocatorConfig {
    fn validate(&self) -> Result<()> {
        if self.surge_demand_per_level < 0.0 || self.predictive_bonus < 0.0 {
            return Err(anyhow!("Demand bonuses must be non-negative"));
        }

        Ok(())
    }
}

impl Validate for MotionConfig {
    fn validate(&self) -> Result<()> {
        if self.friction <= 0.0 || self.friction > 1.0 {
            return Err(anyhow!("Friction must be in range (0, 1]"));
        }

        if self.follow_damping < 0.0 || self.follow_damping > 1.0 {
            return Err(anyhow!("Follow damping must be in range [0, 1]"));
        }

        if self.min_gap <= 0.0 {
            return Err(anyhow!("Minimum gap must be positive"));
        }

        Ok(())
    }
}
