use nalgebra::{Vector2, Point2};
use serde::{Deserialize, Serialize};
use crate::config::VehicleClassConfig;

pub mod direction;
pub mod filter;
pub mod estimator;
pub mod allocator;
pub mod signal;
pub mod physics;
pub mod traffic;

pub use direction::*;
pub use filter::*;
pub use estimator::*;
pub use allocator::*;
pub use signal::*;
pub use physics::*;
pub use traffic::*;

pub type Vec2 = Vector2<f32>;
pub type Point = Point2<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Heavy,
    Standard,
    Light,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [VehicleClass::Heavy, VehicleClass::Standard, VehicleClass::Light];

    pub fn name(self) -> &'static str {
        match self {
            VehicleClass::Heavy => "heavy",
            VehicleClass::Standard => "standard",
            VehicleClass::Light => "light",
        }
    }

    /// Colour tag handed to renderers.
    pub fn color(self) -> &'static str {
        match self {
            VehicleClass::Heavy => "slate",
            VehicleClass::Standard => "orange",
            VehicleClass::Light => "green",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub class: VehicleClass,
    pub direction: Direction,
    pub position: Point,
    pub velocity: Vec2,
    pub weight: f32,
    pub length: f32,
    pub width: f32,
    pub free_flow_speed: f32,
    pub safe_distance: f32,
    pub crash_distance: f32,
    pub spawn_time: f64,
}

impl Vehicle {
    /// Creates a stationary vehicle carrying its class parameters.
    pub fn new(
        id: VehicleId,
        params: &VehicleClassConfig,
        direction: Direction,
        position: Point,
        spawn_time: f64,
    ) -> Self {
        Self {
            id,
            class: params.class,
            direction,
            position,
            velocity: Vec2::zeros(),
            weight: params.weight,
            length: params.length,
            width: params.width,
            free_flow_speed: params.free_flow_speed,
            safe_distance: params.safe_distance,
            crash_distance: params.crash_distance,
            spawn_time,
        }
    }

    /// Signed speed along the direction of travel.
    pub fn speed(&self) -> f32 {
        self.velocity.dot(&self.direction.heading())
    }

    /// Distance travelled along the direction axis, in plane coordinates.
    pub fn progress(&self) -> f32 {
        self.direction.progress(&self.position)
    }

    pub fn half_length(&self) -> f32 {
        self.length / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub vehicles: Vec<Vehicle>,
    /// Total simulated seconds since the last reset.
    pub time: f64,
    /// Simulated seconds covered by the most recent tick.
    pub dt: f32,
    pub ticks: u64,
    pub total_spawned: u64,
    pub total_exited: u64,
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            vehicles: Vec::new(),
            time: 0.0,
            dt: 0.0,
            ticks: 0,
            total_spawned: 0,
            total_exited: 0,
        }
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
        self.total_spawned += 1;
    }

    /// Swaps in the vehicle set produced by a motion pass.
    pub fn replace_vehicles(&mut self, vehicles: Vec<Vehicle>, exited: usize) {
        self.vehicles = vehicles;
        self.total_exited += exited as u64;
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn active_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn class_counts(&self) -> ClassMix {
        let mut mix = ClassMix::default();
        for vehicle in &self.vehicles {
            mix.record(vehicle.class);
        }
        mix
    }

    pub fn average_speed(&self) -> f32 {
        if self.vehicles.is_empty() {
            return 0.0;
        }

        self.vehicles.iter().map(|v| v.speed()).sum::<f32>() / self.vehicles.len() as f32
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}
