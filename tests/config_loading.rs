use anyhow::Result;
use junction_sim::{
    config::{FilterKind, SimulationConfig},
    engine::SimulationDriver,
    simulation::VehicleClass,
};

/// The shipped junction.toml matches the built-in defaults apart from the seed
#[test]
fn test_shipped_config_matches_defaults() -> Result<()> {
    let loaded = SimulationConfig::load_from_file("junction.toml")?;
    let defaults = SimulationConfig::default();

    assert_eq!(loaded.random.seed, Some(42));
    assert_eq!(loaded.signal.cycle_length, defaults.signal.cycle_length);
    assert_eq!(loaded.signal.yellow_time, defaults.signal.yellow_time);
    assert_eq!(loaded.signal.min_split, defaults.signal.min_split);
    assert_eq!(loaded.estimator.interval, defaults.estimator.interval);
    assert_eq!(loaded.estimator.sensing_range, defaults.estimator.sensing_range);
    assert_eq!(loaded.estimator.filter, FilterKind::Exponential);
    assert_eq!(loaded.geometry.stop_line_distance, defaults.geometry.stop_line_distance);
    assert_eq!(loaded.spawner.base_rate, defaults.spawner.base_rate);

    for class in VehicleClass::ALL {
        let (a, b) = (loaded.class(class), defaults.class(class));
        assert_eq!(a.weight, b.weight, "{:?} weight", class);
        assert_eq!(a.free_flow_speed, b.free_flow_speed, "{:?} speed", class);
        assert_eq!(a.spawn_share, b.spawn_share, "{:?} share", class);
    }
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(SimulationConfig::load_from_file("does-not-exist.toml").is_err());
}

#[test]
fn test_kalman_filter_can_be_selected() -> Result<()> {
    let config = SimulationConfig::from_toml_str(
        r#"
        [estimator]
        filter = "kalman"

        [random]
        seed = 9
        "#,
    )?;
    assert_eq!(config.estimator.filter, FilterKind::Kalman);

    let mut driver = SimulationDriver::new(config)?;
    for _ in 0..1200 {
        driver.tick(1.0 / 60.0)?;
    }
    assert!(driver.metrics().iter().all(|(_, m)| m.filtered >= 0.0));
    Ok(())
}

#[test]
fn test_invalid_tables_are_rejected() {
    let cases = [
        "[signal]\ncycle_length = 20.0",
        "[geometry]\napproach_distance = 50.0",
        "[estimator]\nsmoothing_gain = 1.5",
        "[motion]\nmin_gap = 0.0",
        "[[vehicle_classes]]\nclass = \"heavy\"\nweight = 3.0\nlength = 48.0\nwidth = 22.0\nfree_flow_speed = 300.0\nsafe_distance = 140.0\ncrash_distance = 80.0\nspawn_share = 100",
    ];
    for case in cases {
        assert!(SimulationConfig::from_toml_str(case).is_err(), "accepted:\n{}", case);
    }
}
