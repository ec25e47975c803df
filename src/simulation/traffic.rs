use super::{Direction, SimulationState, Vehicle, VehicleClass, VehicleId};
use crate::config::{GeometryConfig, SimulationConfig, SpawnerConfig, VehicleClassConfig};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

pub struct Spawner {
    vehicle_classes: Vec<VehicleClassConfig>,
    geometry: GeometryConfig,
    config: SpawnerConfig,
    next_vehicle_id: u64,
    rng: StdRng,
}

impl Spawner {
    pub fn new(config: &SimulationConfig, seed: Option<u64>) -> Self {
        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        Self {
            vehicle_classes: config.vehicle_classes.clone(),
            geometry: config.geometry.clone(),
            config: config.spawner.clone(),
            next_vehicle_id: 0,
            rng,
        }
    }

    /// Per-tick spawn probability for the given surge level.
    pub fn spawn_probability(&self, surge_level: f32, dt: f32) -> f32 {
        let rate = self.config.base_rate + surge_level * self.config.surge_rate;
        (rate * dt).clamp(0.0, 1.0)
    }

    /// Rolls for at most one new vehicle this tick.
    pub fn update(&mut self, state: &mut SimulationState, surge_level: f32) -> Option<VehicleId> {
        let chance = self.spawn_probability(surge_level, state.dt);
        if self.rng.gen::<f32>() >= chance {
            return None;
        }

        let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        let class = self.select_random_class();

        if !self.can_spawn_at_entry(direction, state) {
            log::debug!("Cannot spawn {} vehicle {:?} - entry blocked", class.name(), direction);
            return None;
        }

        Some(self.spawn_vehicle_at_entry(direction, class, state))
    }

    pub fn select_random_class(&mut self) -> VehicleClass {
        let total_weight: u32 = self.vehicle_classes.iter().map(|c| c.spawn_share).sum();
        let mut random_value = self.rng.gen_range(0..total_weight);

        for params in &self.vehicle_classes {
            if random_value < params.spawn_share {
                return params.class;
            }
            random_value -= params.spawn_share;
        }

        unreachable!("spawn shares sum to {} but no class matched", total_weight)
    }

    /// An entry is free when no vehicle of the same direction is within the
    /// entry clearance downstream of it.
    pub fn can_spawn_at_entry(&self, direction: Direction, state: &SimulationState) -> bool {
        let entry = direction.entry_point(&self.geometry);
        let entry_progress = direction.progress(&entry);

        state
            .vehicles
            .iter()
            .filter(|v| v.direction == direction)
            .all(|v| v.progress() - entry_progress >= self.config.entry_clearance)
    }

    /// Places a stationary vehicle at the entry point of `direction`,
    /// bypassing the random roll and the clearance check.
    pub fn spawn_vehicle_at_entry(
        &mut self,
        direction: Direction,
        class: VehicleClass,
        state: &mut SimulationState,
    ) -> VehicleId {
        let params = self
            .vehicle_classes
            .iter()
            .find(|c| c.class == class)
            .unwrap_or_else(|| panic!("no parameters configured for vehicle class {:?}", class));

        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;

        let position = direction.entry_point(&self.geometry);
        state.add_vehicle(Vehicle::new(id, params, direction, position, state.time));

        log::debug!("Spawned {} vehicle {} heading {:?}", class.name(), id.0, direction);
        id
    }
}
