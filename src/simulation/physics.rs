use super::{PhaseState, Point, SimulationState, Vec2, Vehicle};
use crate::config::{GeometryConfig, MotionConfig};

pub struct MotionIntegrator {
    geometry: GeometryConfig,
    motion: MotionConfig,
}

impl MotionIntegrator {
    pub fn new(geometry: GeometryConfig, motion: MotionConfig) -> Self {
        Self { geometry, motion }
    }

    /// Advances every vehicle by `state.dt` and drops the ones that left the plane.
    ///
    /// All updates are computed against the vehicle set as it was at the start
    /// of the tick and then swapped in as a whole.
    pub fn update(&self, state: &mut SimulationState, phase: &PhaseState) {
        let dt = state.dt;
        let mut next = Vec::with_capacity(state.vehicles.len());
        let mut exited = 0;

        for vehicle in &state.vehicles {
            let update = self.calculate_vehicle_update(vehicle, &state.vehicles, phase, dt);

            let distance = vehicle.direction.distance_to_junction(&update.position, &self.geometry);
            if distance < -vehicle.direction.exit_distance(&self.geometry) {
                exited += 1;
                continue;
            }

            let mut moved = vehicle.clone();
            moved.position = update.position;
            moved.velocity = update.velocity;
            next.push(moved);
        }

        state.replace_vehicles(next, exited);
    }

    /// True while the vehicle sits between its approach mark and the stop
    /// line and its pair does not have a green light.
    pub fn is_held(&self, vehicle: &Vehicle, phase: &PhaseState) -> bool {
        let distance = vehicle.direction.distance_to_junction(&vehicle.position, &self.geometry);
        distance > self.geometry.stop_line_distance
            && distance < self.geometry.approach_distance
            && !phase.is_green(vehicle.direction.pair())
    }

    pub fn target_speed(&self, vehicle: &Vehicle, vehicles: &[Vehicle], phase: &PhaseState) -> f32 {
        let mut target_speed = vehicle.free_flow_speed;

        if self.is_held(vehicle, phase) {
            target_speed = 0.0;
        }

        if let Some((leader, gap)) = find_leader(vehicle, vehicles) {
            if gap < vehicle.safe_distance {
                target_speed = target_speed.min(leader.speed().max(0.0) * self.motion.follow_damping);
            }
            if gap <= vehicle.crash_distance {
                target_speed = 0.0;
            }
        }

        target_speed
    }

    fn calculate_vehicle_update(
        &self,
        vehicle: &Vehicle,
        vehicles: &[Vehicle],
        phase: &PhaseState,
        dt: f32,
    ) -> VehicleUpdate {
        let heading = vehicle.direction.heading();
        let target_speed = self.target_speed(vehicle, vehicles, phase);

        let current_speed = vehicle.speed().max(0.0);
        let smoothed_speed = current_speed + (target_speed - current_speed) * self.motion.friction;

        if dt <= 0.0 {
            return VehicleUpdate {
                position: vehicle.position,
                velocity: heading * smoothed_speed,
            };
        }

        // Furthest the vehicle may move this tick without crossing a stop
        // line that is not green or closing on its leader. The stop line
        // check covers the whole swept segment, so a long step cannot jump
        // over the approach window.
        let mut limit = f32::INFINITY;
        let to_stop_line = vehicle.direction.distance_to_junction(&vehicle.position, &self.geometry)
            - self.geometry.stop_line_distance;
        if to_stop_line > 0.0 && !phase.is_green(vehicle.direction.pair()) {
            limit = to_stop_line - self.motion.min_gap;
        }
        if let Some((leader, gap)) = find_leader(vehicle, vehicles) {
            let bumper_gap = gap - (vehicle.length + leader.length) / 2.0 - self.motion.min_gap;
            limit = limit.min(bumper_gap);
        }

        let free_advance = smoothed_speed * dt;
        let advance = free_advance.min(limit).max(0.0);
        let speed = if advance < free_advance { advance / dt } else { smoothed_speed };

        VehicleUpdate {
            position: vehicle.position + heading * advance,
            velocity: heading * speed,
        }
    }
}

/// Nearest vehicle ahead in the same direction and the centre-to-centre gap to it.
///
/// Vehicles at identical progress are ordered by id, the older one in front.
pub fn find_leader<'a>(vehicle: &Vehicle, vehicles: &'a [Vehicle]) -> Option<(&'a Vehicle, f32)> {
    let progress = vehicle.progress();
    let mut leader: Option<(&Vehicle, f32)> = None;

    for other in vehicles {
        if other.id == vehicle.id || other.direction != vehicle.direction {
            continue;
        }

        let gap = other.progress() - progress;
        let ahead = gap > 0.0 || (gap == 0.0 && other.id < vehicle.id);
        if !ahead {
            continue;
        }

        match leader {
            Some((_, nearest)) if nearest <= gap => {}
            _ => leader = Some((other, gap)),
        }
    }

    leader
}

#[derive(Debug, Clone)]
struct VehicleUpdate {
    position: Point,
    velocity: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleClassConfig;
    use crate::simulation::{Direction, LightState, SignalPair, VehicleClass, VehicleId};

    const DT: f32 = 1.0 / 60.0;

    fn integrator() -> MotionIntegrator {
        MotionIntegrator::new(GeometryConfig::default(), MotionConfig::default())
    }

    fn green(pair: SignalPair) -> PhaseState {
        PhaseState { active: pair, light: LightState::Green, remaining: 20.0 }
    }

    fn vehicle(id: u64, class: VehicleClass, direction: Direction, to_centre: f32, speed: f32) -> Vehicle {
        let params = VehicleClassConfig::defaults()
            .into_iter()
            .find(|c| c.class == class)
            .unwrap();
        let mut v = Vehicle::new(
            VehicleId(id),
            &params,
            direction,
            direction.lane_point(to_centre, &GeometryConfig::default()),
            0.0,
        );
        v.velocity = direction.heading() * speed;
        v
    }

    fn state_with(vehicles: Vec<Vehicle>) -> SimulationState {
        let mut state = SimulationState::new();
        state.dt = DT;
        for v in vehicles {
            state.add_vehicle(v);
        }
        state
    }

    #[test]
    fn free_road_targets_free_flow_speed() {
        let v = vehicle(1, VehicleClass::Light, Direction::Eastbound, 800.0, 0.0);
        let target = integrator().target_speed(&v, &[v.clone()], &green(SignalPair::NorthSouth));
        assert_eq!(target, 480.0);
    }

    #[test]
    fn leader_at_crash_distance_forces_full_stop() {
        let follower = vehicle(2, VehicleClass::Standard, Direction::Eastbound, 500.0, 300.0);
        let leader = vehicle(1, VehicleClass::Standard, Direction::Eastbound, 435.0, 400.0);
        let vehicles = vec![leader, follower.clone()];

        let target = integrator().target_speed(&follower, &vehicles, &green(SignalPair::EastWest));
        assert_eq!(target, 0.0);
    }

    #[test]
    fn leader_inside_safe_distance_caps_speed() {
        let follower = vehicle(2, VehicleClass::Standard, Direction::Eastbound, 500.0, 300.0);
        let leader = vehicle(1, VehicleClass::Standard, Direction::Eastbound, 420.0, 200.0);
        let vehicles = vec![leader, follower.clone()];

        let target = integrator().target_speed(&follower, &vehicles, &green(SignalPair::EastWest));
        assert!((target - 180.0).abs() < 1e-3);
    }

    #[test]
    fn heavy_vehicles_keep_longer_distances() {
        let follower = vehicle(2, VehicleClass::Heavy, Direction::Northbound, 500.0, 200.0);
        let leader = vehicle(1, VehicleClass::Standard, Direction::Northbound, 425.0, 400.0);
        let vehicles = vec![leader, follower.clone()];

        // 75 is outside a standard crash distance but inside the heavy one.
        let target = integrator().target_speed(&follower, &vehicles, &green(SignalPair::NorthSouth));
        assert_eq!(target, 0.0);
    }

    #[test]
    fn red_light_holds_vehicles_in_the_approach_window() {
        let v = vehicle(1, VehicleClass::Standard, Direction::Southbound, 100.0, 0.0);
        let integrator = integrator();

        assert_eq!(integrator.target_speed(&v, &[v.clone()], &green(SignalPair::EastWest)), 0.0);
        assert_eq!(integrator.target_speed(&v, &[v.clone()], &green(SignalPair::NorthSouth)), 420.0);

        let yellow = PhaseState { active: SignalPair::NorthSouth, light: LightState::Yellow, remaining: 2.0 };
        assert_eq!(integrator.target_speed(&v, &[v.clone()], &yellow), 0.0);
    }

    #[test]
    fn vehicles_past_the_stop_line_clear_the_junction() {
        let v = vehicle(1, VehicleClass::Standard, Direction::Southbound, 40.0, 300.0);
        let target = integrator().target_speed(&v, &[v.clone()], &green(SignalPair::EastWest));
        assert_eq!(target, 420.0);
    }

    #[test]
    fn speed_approaches_target_smoothly() {
        let mut state = state_with(vec![vehicle(1, VehicleClass::Standard, Direction::Westbound, 900.0, 0.0)]);
        integrator().update(&mut state, &green(SignalPair::EastWest));

        let speed = state.vehicles[0].speed();
        assert!((speed - 420.0 * 0.08).abs() < 1e-3);
    }

    #[test]
    fn held_vehicle_stops_before_the_stop_line() {
        let geometry = GeometryConfig::default();
        let mut state = state_with(vec![vehicle(1, VehicleClass::Light, Direction::Eastbound, 400.0, 480.0)]);
        let red = green(SignalPair::NorthSouth);
        let integrator = integrator();

        for _ in 0..600 {
            integrator.update(&mut state, &red);
        }

        let v = &state.vehicles[0];
        let distance = v.direction.distance_to_junction(&v.position, &geometry);
        assert!(distance > geometry.stop_line_distance);
        assert!(distance < geometry.approach_distance);
        assert!(v.speed() < 1e-3);
    }

    #[test]
    fn long_step_cannot_jump_a_red_stop_line() {
        let geometry = GeometryConfig::default();
        let mut state = state_with(vec![vehicle(1, VehicleClass::Light, Direction::Eastbound, 200.0, 480.0)]);
        state.dt = 1.0 / 3.0;
        let red = green(SignalPair::NorthSouth);
        let integrator = integrator();

        integrator.update(&mut state, &red);
        let v = &state.vehicles[0];
        let distance = v.direction.distance_to_junction(&v.position, &geometry);
        assert!((distance - 62.0).abs() < 1e-3, "stopped at {}", distance);
        assert!(v.speed() <= 480.0);

        for _ in 0..10 {
            integrator.update(&mut state, &red);
            let v = &state.vehicles[0];
            assert!(v.direction.distance_to_junction(&v.position, &geometry) > geometry.stop_line_distance);
        }
    }

    #[test]
    fn long_step_on_green_passes_the_stop_line() {
        let geometry = GeometryConfig::default();
        let mut state = state_with(vec![vehicle(1, VehicleClass::Light, Direction::Eastbound, 200.0, 480.0)]);
        state.dt = 1.0 / 3.0;

        integrator().update(&mut state, &green(SignalPair::EastWest));
        let v = &state.vehicles[0];
        assert!((v.direction.distance_to_junction(&v.position, &geometry) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn queue_forms_without_overlaps() {
        let vehicles = (0..6)
            .map(|i| vehicle(i, VehicleClass::Standard, Direction::Northbound, 300.0 + i as f32 * 40.0, 420.0))
            .collect();
        let mut state = state_with(vehicles);
        let red = green(SignalPair::EastWest);
        let integrator = integrator();

        for _ in 0..900 {
            let before: Vec<f32> = state.vehicles.iter().map(|v| v.progress()).collect();
            integrator.update(&mut state, &red);
            for (v, p) in state.vehicles.iter().zip(before) {
                assert!(v.progress() >= p);
            }
        }

        let mut progress: Vec<f32> = state.vehicles.iter().map(|v| v.progress()).collect();
        progress.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in progress.windows(2) {
            assert!(pair[1] - pair[0] >= 32.0, "overlap: {:?}", pair);
        }
    }

    #[test]
    fn vehicles_past_the_far_edge_are_removed() {
        let mut state = state_with(vec![
            vehicle(1, VehicleClass::Standard, Direction::Eastbound, -1099.0, 420.0),
            vehicle(2, VehicleClass::Standard, Direction::Westbound, 500.0, 420.0),
        ]);
        integrator().update(&mut state, &green(SignalPair::EastWest));

        assert_eq!(state.active_vehicles(), 1);
        assert_eq!(state.vehicles[0].id, VehicleId(2));
        assert_eq!(state.total_exited, 1);
    }

    #[test]
    fn leader_is_the_nearest_vehicle_ahead() {
        let me = vehicle(3, VehicleClass::Standard, Direction::Eastbound, 500.0, 0.0);
        let vehicles = vec![
            vehicle(1, VehicleClass::Standard, Direction::Eastbound, 200.0, 0.0),
            vehicle(2, VehicleClass::Standard, Direction::Eastbound, 400.0, 0.0),
            vehicle(4, VehicleClass::Standard, Direction::Eastbound, 700.0, 0.0),
            vehicle(5, VehicleClass::Standard, Direction::Westbound, 450.0, 0.0),
            me.clone(),
        ];
        let (leader, gap) = find_leader(&me, &vehicles).unwrap();
        assert_eq!(leader.id, VehicleId(2));
        assert!((gap - 100.0).abs() < 1e-3);
    }
}
