//! Rigid 2D transformation of G-code toolpaths.
//!
//! Motion commands are rotated about a center point and/or shifted, while every
//! other byte of the program is left alone. The pieces, leaf first:
//!
//! - [`line`] - split one line into a command, letter-coded words and a comment
//! - [`state`] - positioning mode (`G90`/`G91`) and the tracked position
//! - [`transform`] - rotation about a center plus translation
//! - [`format`] - fixed-precision rendering and span-based line rewriting
//! - [`pipeline`] - the single sequential pass over a program

pub mod config;
pub mod format;
pub mod line;
pub mod pipeline;
pub mod state;
pub mod transform;

pub use config::{AxisPolicy, Center, ConfigLayer, TransformConfig};
pub use line::{Command, Parameters, ParsedLine};
pub use pipeline::{TransformStats, Transformer, header_lines, transform_reader, transform_str};
pub use state::{PositionState, PositioningMode};
pub use transform::RigidTransform;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid center '{0}': expected '<X>x<Y>' (e.g. '125x100')")]
    InvalidCenter(String),

    #[error("Precision must be non-negative, got {0}")]
    NegativePrecision(i64),

    #[error("Precision must be at most {}, got {0}", config::MAX_PRECISION)]
    PrecisionTooLarge(i64),

    #[error("Value for '{name}' must be a finite number, got {value}")]
    NonFiniteValue { name: &'static str, value: f64 },

    #[error("Invalid config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransformError>;
