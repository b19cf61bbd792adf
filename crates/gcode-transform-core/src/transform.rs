use glam::{DAffine2, DMat2, DVec2};

use crate::config::{AxisPolicy, TransformConfig};
use crate::state::{PositionState, PositioningMode};

/// Below this |sin θ| a rotation is treated as not mixing X into Y.
const AXIS_MIX_EPSILON: f64 = 1e-9;

/// Rotation about a center followed by a translation.
///
/// Positive angles turn clockwise:
///
/// ```text
/// x' = cx + (x - cx)·cos θ + (y - cy)·sin θ + shift_x
/// y' = cy - (x - cx)·sin θ + (y - cy)·cos θ + shift_y
/// ```
///
/// Displacements only see the rotation part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    affine: DAffine2,
    mixes_axes: bool,
}

impl RigidTransform {
    pub fn new(rotate_degrees: f64, center: DVec2, shift: DVec2) -> Self {
        let theta = rotate_degrees.to_radians();
        // glam angles are counter-clockwise.
        let rotation = DMat2::from_angle(-theta);
        let affine = DAffine2::from_translation(center + shift)
            * DAffine2::from_mat2(rotation)
            * DAffine2::from_translation(-center);

        Self {
            affine,
            mixes_axes: theta.sin().abs() > AXIS_MIX_EPSILON,
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(config.rotate_degrees, config.center.as_vec(), config.shift())
    }

    /// Transform an absolute position.
    pub fn apply_position(&self, position: DVec2) -> DVec2 {
        self.affine.transform_point2(position)
    }

    /// Transform a displacement. Translation never applies to a delta.
    pub fn apply_displacement(&self, delta: DVec2) -> DVec2 {
        self.affine.transform_vector2(delta)
    }

    /// Whether a move along one axis can come out with a component on the other.
    pub fn mixes_axes(&self) -> bool {
        self.mixes_axes
    }

    /// Transform the X/Y words of one linear move under the current mode.
    ///
    /// Absolute moves resolve a missing axis from the tracked source position;
    /// relative moves treat it as zero displacement. Returns both transformed
    /// components (position or displacement, matching the mode) and the state
    /// after the move.
    pub fn apply_move(
        &self,
        state: PositionState,
        x: Option<f64>,
        y: Option<f64>,
    ) -> (DVec2, PositionState) {
        match state.mode {
            PositioningMode::Absolute => {
                let target = DVec2::new(x.unwrap_or(state.source.x), y.unwrap_or(state.source.y));
                let moved = self.apply_position(target);
                (moved, state.moved_to(target, moved))
            }
            PositioningMode::Relative => {
                let delta = DVec2::new(x.unwrap_or(0.0), y.unwrap_or(0.0));
                let moved = self.apply_displacement(delta);
                (moved, state.moved_by(delta, moved))
            }
        }
    }
}

/// Which of X/Y to write back for a move that had `has_x`/`has_y`.
pub fn axes_to_emit(
    policy: AxisPolicy,
    has_x: bool,
    has_y: bool,
    mixes_axes: bool,
) -> (bool, bool) {
    match policy {
        AxisPolicy::Force if mixes_axes && (has_x || has_y) => (true, true),
        _ => (has_x, has_y),
    }
}
