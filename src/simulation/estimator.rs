use super::{Approach, ApproachSet, DemandFilter, Vehicle, VehicleClass, build_filter};
use crate::config::{EstimatorConfig, GeometryConfig};

/// Vehicle counts per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassMix {
    pub heavy: u32,
    pub standard: u32,
    pub light: u32,
}

impl ClassMix {
    pub fn record(&mut self, class: VehicleClass) {
        match class {
            VehicleClass::Heavy => self.heavy += 1,
            VehicleClass::Standard => self.standard += 1,
            VehicleClass::Light => self.light += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.heavy + self.standard + self.light
    }
}

/// Sensed demand on one approach after an estimation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproachMetrics {
    pub raw: f32,
    pub filtered: f32,
    pub queue_length: f32,
    /// Raw demand against the saturation constant, 0-100.
    pub density: u32,
    pub mix: ClassMix,
}

/// Weighted demand seen on one approach, before smoothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproachReading {
    pub raw: f32,
    pub queue_length: f32,
    pub mix: ClassMix,
}

pub struct QueueEstimator {
    config: EstimatorConfig,
    geometry: GeometryConfig,
    filters: ApproachSet<Box<dyn DemandFilter>>,
    metrics: ApproachSet<ApproachMetrics>,
}

impl QueueEstimator {
    pub fn new(config: EstimatorConfig, geometry: GeometryConfig) -> Self {
        let filters = ApproachSet::from_fn(|_| build_filter(&config));

        Self {
            config,
            geometry,
            filters,
            metrics: ApproachSet::default(),
        }
    }

    /// Runs one sensing pass over the vehicle set and replaces the metrics snapshot.
    pub fn estimate(&mut self, vehicles: &[Vehicle]) -> &ApproachSet<ApproachMetrics> {
        let readings = ApproachSet::from_fn(|approach| self.sense(approach, vehicles));

        let saturation = self.config.saturation;
        let filters = &mut self.filters;
        let next = ApproachSet::from_fn(|approach| {
            let reading = readings.get(approach);
            let filtered = filters.get_mut(approach).update(reading.raw);
            ApproachMetrics {
                raw: reading.raw,
                filtered,
                queue_length: reading.queue_length,
                density: density(reading.raw, saturation),
                mix: reading.mix,
            }
        });

        self.metrics = next;
        &self.metrics
    }

    /// Weighted demand, queue length and class mix of the vehicles inside
    /// the sensing window of one approach.
    pub fn sense(&self, approach: Approach, vehicles: &[Vehicle]) -> ApproachReading {
        let direction = approach.inbound();
        let mut reading = ApproachReading::default();

        for vehicle in vehicles.iter().filter(|v| v.direction == direction) {
            let to_stop_line = direction.distance_to_junction(&vehicle.position, &self.geometry)
                - self.geometry.stop_line_distance;

            if to_stop_line < 0.0 || to_stop_line > self.config.sensing_range {
                continue;
            }

            reading.raw += vehicle.weight;
            reading.queue_length = reading.queue_length.max(to_stop_line - vehicle.half_length());
            reading.mix.record(vehicle.class);
        }

        reading
    }

    pub fn metrics(&self) -> &ApproachSet<ApproachMetrics> {
        &self.metrics
    }

    pub fn set_smoothing_gain(&mut self, gain: f32) {
        for approach in Approach::ALL {
            self.filters.get_mut(approach).set_gain(gain);
        }
    }

    pub fn reset(&mut self) {
        for approach in Approach::ALL {
            self.filters.get_mut(approach).reset();
        }
        self.metrics = ApproachSet::default();
    }
}

pub fn density(raw: f32, saturation: f32) -> u32 {
    ((raw / saturation * 100.0).round() as u32).min(100)
}
