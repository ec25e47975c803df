use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use junction_sim::{
    config::{Controls, SimulationConfig},
    engine::SimulationDriver,
    simulation::{Direction, QueueEstimator, SimulationState, Vehicle, VehicleClass, VehicleId},
};

fn seeded_driver(surge_level: f32) -> SimulationDriver {
    let mut config = SimulationConfig::load_from_file("junction.toml")
        .expect("Failed to load configuration");
    config.random.seed = Some(42);

    let mut driver = SimulationDriver::new(config).expect("Invalid configuration");
    let controls = Controls { surge_level, ..driver.controls().clone() };
    driver.set_controls(controls).expect("Invalid controls");
    driver
}

fn benchmark_driver_tick(c: &mut Criterion) {
    let mut driver = seeded_driver(1.0);

    // Warm up to a realistic vehicle count
    for _ in 0..1800 {
        driver.tick(1.0 / 60.0).unwrap();
    }

    c.bench_function("driver_tick", |b| {
        b.iter(|| {
            driver.tick(black_box(1.0 / 60.0)).unwrap();
        })
    });
}

fn benchmark_surge_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("surge_scaling");

    for surge_level in [0.0f32, 1.0, 3.0, 5.0].iter() {
        let mut driver = seeded_driver(*surge_level);
        for _ in 0..1800 {
            driver.tick(1.0 / 60.0).unwrap();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("surge_{}", surge_level)),
            surge_level,
            |b, _| {
                b.iter(|| {
                    driver.tick(black_box(1.0 / 60.0)).unwrap();
                })
            },
        );
    }

    group.finish();
}

fn benchmark_estimation_pass(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut state = SimulationState::new();

    // 50 queued vehicles per approach, all inside the sensing window
    let mut next_id = 0;
    for direction in Direction::ALL {
        for slot in 0..50 {
            let class = VehicleClass::ALL[slot % VehicleClass::ALL.len()];
            let position = direction.lane_point(70.0 + slot as f32 * 9.0, &config.geometry);
            state.add_vehicle(Vehicle::new(VehicleId(next_id), config.class(class), direction, position, 0.0));
            next_id += 1;
        }
    }

    let mut estimator = QueueEstimator::new(config.estimator.clone(), config.geometry.clone());
    c.bench_function("estimation_pass", |b| {
        b.iter(|| {
            black_box(estimator.estimate(black_box(&state.vehicles)));
        })
    });
}

criterion_group!(
    benches,
    benchmark_driver_tick,
    benchmark_surge_scaling,
    benchmark_estimation_pass
);
criterion_main!(benches);
