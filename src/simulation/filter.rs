use crate::config::{EstimatorConfig, FilterKind, KalmanConfig};

/// Low-pass filter turning noisy per-cycle demand into a smoothed estimate.
///
/// Implementations must keep every output between the previous estimate and
/// the new measurement, so the estimate never overshoots.
pub trait DemandFilter: std::fmt::Debug + Send {
    fn update(&mut self, measurement: f32) -> f32;
    fn value(&self) -> f32;
    fn reset(&mut self);
    /// Retunes the filter gain where the filter has one.
    fn set_gain(&mut self, _gain: f32) {}
}

/// First-order exponential smoothing: `value += k * (measurement - value)`.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    gain: f32,
    value: f32,
}

impl ExponentialFilter {
    pub fn new(gain: f32) -> Self {
        debug_assert!(gain > 0.0 && gain <= 1.0, "smoothing gain {} out of range", gain);
        Self { gain, value: 0.0 }
    }
}

impl DemandFilter for ExponentialFilter {
    fn update(&mut self, measurement: f32) -> f32 {
        self.value += self.gain * (measurement - self.value);
        self.value
    }

    fn value(&self) -> f32 {
        self.value
    }

    fn reset(&mut self) {
        self.value = 0.0;
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(f32::EPSILON, 1.0);
    }
}

/// Scalar Kalman filter with a constant-state model.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    params: KalmanConfig,
    state: f32,
    estimate_error: f32,
}

impl KalmanFilter {
    pub fn new(params: KalmanConfig) -> Self {
        Self {
            state: 0.0,
            estimate_error: params.initial_error,
            params,
        }
    }

    pub fn estimate_error(&self) -> f32 {
        self.estimate_error
    }
}

impl DemandFilter for KalmanFilter {
    fn update(&mut self, measurement: f32) -> f32 {
        let gain = self.estimate_error / (self.estimate_error + self.params.measurement_variance);
        self.state += gain * (measurement - self.state);
        self.estimate_error = (1.0 - gain) * self.estimate_error + self.params.process_variance;
        self.state
    }

    fn value(&self) -> f32 {
        self.state
    }

    fn reset(&mut self) {
        self.state = 0.0;
        self.estimate_error = self.params.initial_error;
    }
}

pub fn build_filter(config: &EstimatorConfig) -> Box<dyn DemandFilter> {
    match config.filter {
        FilterKind::Exponential => Box::new(ExponentialFilter::new(config.smoothing_gain)),
        FilterKind::Kalman => Box::new(KalmanFilter::new(config.kalman.clone())),
    }
}
