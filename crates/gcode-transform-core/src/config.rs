use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glam::DVec2;
use serde::Deserialize;

use crate::{Result, TransformError};

pub const DEFAULT_CENTER: Center = Center { x: 125.0, y: 100.0 };
pub const DEFAULT_PRECISION: usize = 3;
/// An f64 carries about 17 significant digits; more decimals are noise.
pub const MAX_PRECISION: usize = 17;

/// Rotation center on the work surface, written as `<X>x<Y>` (e.g. `125x100`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Center {
    pub x: f64,
    pub y: f64,
}

impl Center {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_vec(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl Default for Center {
    fn default() -> Self {
        DEFAULT_CENTER
    }
}

impl FromStr for Center {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TransformError::InvalidCenter(s.to_string());

        let mut parts = s.trim().split(['x', 'X']);
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let x: f64 = x.trim().parse().map_err(|_| invalid())?;
        let y: f64 = y.trim().parse().map_err(|_| invalid())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(invalid());
        }
        Ok(Self { x, y })
    }
}

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// What to do with an axis the source line did not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPolicy {
    /// Emit the missing axis whenever the rotation mixes X and Y.
    #[default]
    Force,
    /// Only ever write the axes the source line had.
    Preserve,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    pub shift_x: f64,
    pub shift_y: f64,
    /// Positive is clockwise.
    pub rotate_degrees: f64,
    pub center: Center,
    pub precision: usize,
    pub axis_policy: AxisPolicy,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            shift_x: 0.0,
            shift_y: 0.0,
            rotate_degrees: 0.0,
            center: DEFAULT_CENTER,
            precision: DEFAULT_PRECISION,
            axis_policy: AxisPolicy::default(),
        }
    }
}

impl TransformConfig {
    pub fn shift(&self) -> DVec2 {
        DVec2::new(self.shift_x, self.shift_y)
    }

    /// No rotation and no shift: motion lines are copied verbatim.
    pub fn is_identity(&self) -> bool {
        self.rotate_degrees == 0.0 && self.shift_x == 0.0 && self.shift_y == 0.0
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("shiftx", self.shift_x),
            ("shifty", self.shift_y),
            ("rotate", self.rotate_degrees),
            ("center.x", self.center.x),
            ("center.y", self.center.y),
        ] {
            if !value.is_finite() {
                return Err(TransformError::NonFiniteValue { name, value });
            }
        }
        Ok(())
    }
}

/// One unresolved source of settings: a config file or the command line.
///
/// Layers are stacked with [`ConfigLayer::overlay`] and turned into a
/// [`TransformConfig`] by [`ConfigLayer::resolve`], which is where all
/// validation happens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub rotate: Option<f64>,
    pub shiftx: Option<f64>,
    pub shifty: Option<f64>,
    pub center: Option<String>,
    pub precision: Option<i64>,
    pub axes: Option<AxisPolicy>,
}

impl ConfigLayer {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Values set in `other` win over values set in `self`.
    pub fn overlay(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            rotate: other.rotate.or(self.rotate),
            shiftx: other.shiftx.or(self.shiftx),
            shifty: other.shifty.or(self.shifty),
            center: other.center.or(self.center),
            precision: other.precision.or(self.precision),
            axes: other.axes.or(self.axes),
        }
    }

    pub fn resolve(self) -> Result<TransformConfig> {
        let center = match self.center.as_deref() {
            Some(text) => text.parse()?,
            None => DEFAULT_CENTER,
        };
        let precision = match self.precision {
            Some(p) if p < 0 => return Err(TransformError::NegativePrecision(p)),
            Some(p) if p > MAX_PRECISION as i64 => {
                return Err(TransformError::PrecisionTooLarge(p));
            }
            Some(p) => p as usize,
            None => DEFAULT_PRECISION,
        };

        let config = TransformConfig {
            shift_x: self.shiftx.unwrap_or(0.0),
            shift_y: self.shifty.unwrap_or(0.0),
            rotate_degrees: self.rotate.unwrap_or(0.0),
            center,
            precision,
            axis_policy: self.axes.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
