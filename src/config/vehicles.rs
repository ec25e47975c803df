use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;
use crate::simulation::VehicleClass;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleClassConfig {
    pub class: VehicleClass,
    /// Contribution of one vehicle to approach demand.
    pub weight: f32,
    pub length: f32,
    pub width: f32,
    pub free_flow_speed: f32,
    pub safe_distance: f32,
    pub crash_distance: f32,
    /// Share of spawned vehicles, in percent.
    pub spawn_share: u32,
}

impl VehicleClassConfig {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                class: VehicleClass::Heavy,
                weight: 3.0,
                length: 48.0,
                width: 22.0,
                free_flow_speed: 300.0,
                safe_distance: 140.0,
                crash_distance: 80.0,
                spawn_share: 15,
            },
            Self {
                class: VehicleClass::Standard,
                weight: 1.0,
                length: 32.0,
                width: 16.0,
                free_flow_speed: 420.0,
                safe_distance: 100.0,
                crash_distance: 65.0,
                spawn_share: 55,
            },
            Self {
                class: VehicleClass::Light,
                weight: 0.3,
                length: 20.0,
                width: 10.0,
                free_flow_speed: 480.0,
                safe_distance: 100.0,
                crash_distance: 65.0,
                spawn_share: 30,
            },
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Expected spawns per simulated second with no surge.
    pub base_rate: f32,
    /// Additional spawns per simulated second for each surge level.
    pub surge_rate: f32,
    /// No spawn happens while a same-direction vehicle is this close to the entry point.
    pub entry_clearance: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.9,
            surge_rate: 3.0,
            entry_clearance: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

impl Validate for SpawnerConfig {
    fn validate(&self) -> Result<()> {
        if self.base_rate < 0.0 || self.surge_rate < 0.0 {
            return Err(anyhow!("Spawn rates must be non-negative"));
        }

        if self.entry_clearance < 0.0 {
            return Err(anyhow!("Entry clearance must be non-negative"));
        }

        Ok(())
    }
}

impl Validate for VehicleClassConfig {
    fn validate(&self) -> Result<()> {
        let name = self.class.name();

        if self.weight <= 0.0 {
            return Err(anyhow!("Demand weight for '{}' must be positive", name));
        }

        if self.length <= 0.0 || self.width <= 0.0 {
            return Err(anyhow!("Dimensions for '{}' must be positive", name));
        }

        if self.free_flow_speed <= 0.0 {
            return Err(anyhow!("Free-flow speed for '{}' must be positive", name));
        }

        if self.crash_distance <= 0.0 {
            return Err(anyhow!("Crash distance for '{}' must be positive", name));
        }

        if self.safe_distance <= self.crash_distance {
            return Err(anyhow!("Safe distance for '{}' must exceed its crash distance", name));
        }

        Ok(())
    }
}

pub fn validate_vehicle_classes(classes: &[VehicleClassConfig]) -> Result<()> {
    for class in VehicleClass::ALL {
        let count = classes.iter().filter(|c| c.class == class).count();
        if count != 1 {
            return Err(anyhow!(
                "Vehicle class '{}' must be configured exactly once, found {}",
                class.name(), count
            ));
        }
    }

    for class in classes {
        class.validate()?;
    }

    let total_share: u32 = classes.iter().map(|c| c.spawn_share).sum();
    if total_share != 100 {
        return Err(anyhow!("Vehicle spawn shares must sum to 100, got {}", total_share));
    }

    Ok(())
}
