use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod junction;
pub mod vehicles;
pub mod controls;

pub use junction::*;
pub use vehicles::*;
pub use controls::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub geometry: GeometryConfig,
    pub signal: SignalConfig,
    pub estimator: EstimatorConfig,
    pub allocator: AllocatorConfig,
    pub motion: MotionConfig,
    pub spawner: SpawnerConfig,
    pub vehicle_classes: Vec<VehicleClassConfig>,
    pub random: RandomConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            signal: SignalConfig::default(),
            estimator: EstimatorConfig::default(),
            allocator: AllocatorConfig::default(),
            motion: MotionConfig::default(),
            spawner: SpawnerConfig::default(),
            vehicle_classes: VehicleClassConfig::defaults(),
            random: RandomConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    /// Looks up the parameters of one vehicle class.
    ///
    /// Validation guarantees every class has exactly one entry, so a miss
    /// here means the config was built by hand and never validated.
    pub fn class(&self, class: crate::simulation::VehicleClass) -> &VehicleClassConfig {
        self.vehicle_classes
            .iter()
            .find(|c| c.class == class)
            .unwrap_or_else(|| panic!("no parameters configured for vehicle class {:?}", class))
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.signal.validate()?;
        self.estimator.validate()?;
        self.allocator.validate()?;
        self.motion.validate()?;
        self.spawner.validate()?;
        validate_vehicle_classes(&self.vehicle_classes)?;
        Ok(())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}
