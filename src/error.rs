use thiserror::Error;

/// Runtime rejections raised by the simulation driver.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("frame delta must be finite and non-negative, got {0}")]
    InvalidTimestep(f64),

    #[error("{name} must be in range [{min}, {max}], got {value}")]
    ControlOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("cycle length {cycle_length}s leaves {available}s of green, need at least {required}s")]
    CycleTooShort {
        cycle_length: f64,
        available: f64,
        required: f64,
    },

    #[error("{name} has no effect with the {filter} demand filter")]
    ControlNotApplicable {
        name: &'static str,
        filter: &'static str,
    },
}

pub type SimResult<T> = std::result::Result<T, SimError>;
