use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::Path;
use std::time::{Duration, Instant};

use junction_sim::{
    config::{Controls, SimulationConfig},
    engine::{LogObserver, SimulationDriver},
    simulation::SignalPair,
};

#[derive(Parser)]
#[command(name = "junction-sim")]
#[command(about = "Adaptive four-way junction signal simulation")]
struct Args {
    /// Junction configuration file; built-in defaults are used when it does not exist
    #[arg(short, long, default_value = "junction.toml")]
    config: String,

    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 120.0)]
    duration: f64,

    /// Random seed for reproducible simulations
    #[arg(short, long)]
    seed: Option<u64>,

    /// Surge level added to north-south demand (0-5)
    #[arg(long, default_value_t = 0.0)]
    surge: f32,

    /// Run fixed even splits instead of adaptive control
    #[arg(long)]
    no_adaptive: bool,

    /// Add the predictive bonus to east-west demand
    #[arg(long)]
    predictive: bool,

    /// Simulation speed multiplier (0-10]
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Pace frames against the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging for detailed simulation progress
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = if Path::new(&args.config).exists() {
        info!("Loading junction configuration from: {}", &args.config);
        SimulationConfig::load_from_file(&args.config)
            .with_context(|| format!("failed to load {}", &args.config))?
    } else {
        info!("{} not found, using built-in defaults", &args.config);
        SimulationConfig::default()
    };

    if args.seed.is_some() {
        config.random.seed = args.seed;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting junction simulation");

    let config = load_config(&args)?;
    let mut driver = SimulationDriver::new(config)?;

    let controls = Controls {
        adaptive: !args.no_adaptive,
        predictive: args.predictive,
        surge_level: args.surge,
        sim_speed: args.speed,
        ..driver.controls().clone()
    };
    driver.set_controls(controls)?;
    driver.add_observer(Box::new(LogObserver));

    let dt = 1.0 / 60.0;
    let controls = driver.controls();
    info!("=== Simulation Configuration ===");
    info!("Mode: {}", if controls.adaptive { "adaptive" } else { "fixed" });
    info!("Cycle: {:.0}s, offset {:.0}s", controls.cycle_length, controls.offset);
    info!("Surge level: {:.1}, predictive: {}", controls.surge_level, controls.predictive);
    if let Some(seed) = driver.config().random.seed {
        info!("Random Seed: {}", seed);
    }
    if args.verbose {
        info!("Frame timestep: {:.3}s ({:.1} Hz) x{:.1}", dt, 1.0 / dt, controls.sim_speed);
    }

    let start_time = Instant::now();
    let mut next_status = 10.0;

    while driver.state().time < args.duration {
        let frame_start = Instant::now();
        driver.tick(dt)?;

        let state = driver.state();
        if state.time >= next_status {
            let snapshot = driver.snapshot();
            let active = snapshot.signal.active;
            info!(
                "t={:.0}s: {} vehicles active, avg speed {:.0}, {} {:?} ({}s)",
                state.time,
                state.active_vehicles(),
                state.average_speed(),
                active.label(),
                snapshot.signal.pair(active).light,
                snapshot.signal.pair(active).countdown,
            );
            next_status += 10.0;
        }

        if args.realtime {
            let target_frame_time = Duration::from_secs_f64(dt);
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }
    }

    let state = driver.state();
    let signal = driver.signal();
    let mix = state.class_counts();
    info!("Simulation completed!");
    info!("Wall time: {:.2}s for {:.0}s simulated", start_time.elapsed().as_secs_f64(), state.time);
    info!("Total ticks: {}", state.ticks);
    info!("Signal cycles completed: {}", signal.cycles_completed());
    info!(
        "Final splits: {} {:.1}s, {} {:.1}s",
        SignalPair::EastWest.label(),
        signal.plan().we_split,
        SignalPair::NorthSouth.label(),
        signal.plan().ns_split
    );
    info!(
        "Vehicles: {} spawned, {} exited, {} active ({} heavy, {} standard, {} light)",
        state.total_spawned,
        state.total_exited,
        state.active_vehicles(),
        mix.heavy,
        mix.standard,
        mix.light
    );
    for (approach, metrics) in driver.metrics().iter() {
        info!(
            "  {} approach: demand {:.1} (raw {:.1}), queue {:.0}, density {}%",
            approach.name(),
            metrics.filtered,
            metrics.raw,
            metrics.queue_length,
            metrics.density
        );
    }

    Ok(())
}
