//! Modal positioning state.

use glam::DVec2;

use crate::line::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositioningMode {
    /// Coordinates are positions on the work surface (`G90`).
    #[default]
    Absolute,
    /// Coordinates are displacements from the current position (`G91`).
    Relative,
}

/// Interpreter state threaded through the pass, one line at a time.
///
/// `current` is always an absolute position in the output (machine) frame,
/// even while in relative mode. `source` is the same position in the
/// untransformed frame of the input program; absolute moves that omit an axis
/// take the missing coordinate from it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionState {
    pub mode: PositioningMode,
    pub current: DVec2,
    pub source: DVec2,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_x(&self) -> f64 {
        self.current.x
    }

    pub fn current_y(&self) -> f64 {
        self.current.y
    }

    /// Apply a mode directive. Every other command leaves the mode alone.
    pub fn with_command(self, command: Command) -> Self {
        let mode = match command {
            Command::SetAbsoluteMode => PositioningMode::Absolute,
            Command::SetRelativeMode => PositioningMode::Relative,
            _ => self.mode,
        };
        Self { mode, ..self }
    }

    /// Record an absolute move. Both positions are stored unrounded.
    pub fn moved_to(self, source: DVec2, current: DVec2) -> Self {
        Self {
            source,
            current,
            ..self
        }
    }

    /// Record a relative move by accumulating unrounded displacements.
    pub fn moved_by(self, source_delta: DVec2, current_delta: DVec2) -> Self {
        Self {
            source: self.source + source_delta,
            current: self.current + current_delta,
            ..self
        }
    }

    pub fn is_relative(&self) -> bool {
        self.mode == PositioningMode::Relative
    }
}
