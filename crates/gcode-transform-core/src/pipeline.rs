use std::fmt;
use std::io::{BufRead, Write};

use log::{debug, warn};

use crate::config::TransformConfig;
use crate::format::{NumberFormat, rewrite_motion};
use crate::line::{COMMENT_MARKER, Command, ParsedLine};
use crate::state::PositionState;
use crate::transform::{RigidTransform, axes_to_emit};

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub lines: usize,
    /// Linear moves whose X/Y words were rewritten.
    pub rewritten: usize,
    /// Linear moves copied verbatim because the transform is the identity.
    pub unchanged_moves: usize,
    /// Arc moves left untouched.
    pub arcs: usize,
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} moves rewritten, {} moves unchanged, {} arcs skipped",
            self.lines, self.rewritten, self.unchanged_moves, self.arcs
        )
    }
}

/// Drives the single forward pass over a program.
///
/// Owns the [`PositionState`]; each call to [`Transformer::transform_line`]
/// consumes the state left by the previous line and replaces it.
#[derive(Debug)]
pub struct Transformer {
    config: TransformConfig,
    rigid: RigidTransform,
    format: NumberFormat,
    state: PositionState,
    stats: TransformStats,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        if config.is_identity() {
            warn!("No rotation or shift requested; motion lines will be copied unchanged");
        }
        debug!(
            "Transform: rotate {}° about {}, shift ({}, {}), precision {}, axes {:?}",
            config.rotate_degrees,
            config.center,
            config.shift_x,
            config.shift_y,
            config.precision,
            config.axis_policy
        );

        Self {
            rigid: RigidTransform::from_config(&config),
            format: NumberFormat::new(config.precision),
            state: PositionState::new(),
            stats: TransformStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Transform one line (without its terminator) and return its replacement.
    pub fn transform_line(&mut self, raw: &str) -> String {
        self.stats.lines += 1;
        let line = ParsedLine::parse(raw);
        self.state = self.state.with_command(line.command);

        match line.command {
            Command::LinearMove => {}
            Command::ArcMove => {
                // The endpoint is not rewritten, but later moves still start from it.
                let (_, state) = self.rigid.apply_move(
                    self.state,
                    line.parameters.get('X'),
                    line.parameters.get('Y'),
                );
                self.state = state;
                warn!(
                    "line {}: arc move left untransformed: {}",
                    self.stats.lines,
                    raw.trim()
                );
                self.stats.arcs += 1;
                return raw.to_string();
            }
            _ => return raw.to_string(),
        }

        let x = line.parameters.get('X');
        let y = line.parameters.get('Y');
        if x.is_none() && y.is_none() {
            return raw.to_string();
        }

        let (moved, state) = self.rigid.apply_move(self.state, x, y);
        self.state = state;

        if self.config.is_identity() {
            self.stats.unchanged_moves += 1;
            return raw.to_string();
        }

        let emit = axes_to_emit(
            self.config.axis_policy,
            x.is_some(),
            y.is_some(),
            self.rigid.mixes_axes(),
        );
        self.stats.rewritten += 1;
        rewrite_motion(&line, moved, emit, &self.format)
    }

    /// Like [`Transformer::transform_line`], but for raw bytes.
    ///
    /// A line that is not valid UTF-8 is still transformed when the bad bytes
    /// sit inside its comment; the comment bytes are copied as they were.
    /// Anything else is copied unchanged.
    pub fn transform_line_bytes(&mut self, raw: &[u8]) -> Vec<u8> {
        let valid_up_to = match std::str::from_utf8(raw) {
            Ok(text) => return self.transform_line(text).into_bytes(),
            Err(err) => err.valid_up_to(),
        };
        let (head, tail) = raw.split_at(valid_up_to);
        match std::str::from_utf8(head) {
            Ok(head) if head.contains(COMMENT_MARKER) => {
                let mut out = self.transform_line(head).into_bytes();
                out.extend_from_slice(tail);
                out
            }
            _ => {
                self.stats.lines += 1;
                warn!(
                    "line {}: not valid UTF-8, copied unchanged",
                    self.stats.lines
                );
                raw.to_vec()
            }
        }
    }
}

/// Split a line read with its terminator into body and terminator.
fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn split_line_ending_bytes(line: &[u8]) -> (&[u8], &[u8]) {
    if let Some(body) = line.strip_suffix(b"\r\n") {
        (body, b"\r\n")
    } else if let Some(body) = line.strip_suffix(b"\n") {
        (body, b"\n")
    } else {
        (line, b"")
    }
}

/// Transform a whole program held in memory. Line terminators are preserved.
pub fn transform_str(config: &TransformConfig, input: &str) -> String {
    let mut transformer = Transformer::new(config.clone());
    let mut out = String::with_capacity(input.len());
    for line in input.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        out.push_str(&transformer.transform_line(body));
        out.push_str(ending);
    }
    debug!("{}", transformer.stats());
    out
}

/// Stream a program from `reader` to `writer`, one line at a time.
///
/// Input is handled as bytes, so text in another encoding (a Latin-1 `°` in
/// a slicer comment, say) passes through untouched.
pub fn transform_reader<R: BufRead, W: Write>(
    config: &TransformConfig,
    mut reader: R,
    mut writer: W,
) -> crate::Result<TransformStats> {
    let mut transformer = Transformer::new(config.clone());
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let (body, ending) = split_line_ending_bytes(&buf);
        writer.write_all(&transformer.transform_line_bytes(body))?;
        writer.write_all(ending)?;
    }
    writer.flush()?;

    let stats = transformer.stats();
    debug!("{stats}");
    Ok(stats)
}

/// Comment block describing a run, for prepending to the output.
pub fn header_lines(config: &TransformConfig, source: &str) -> Vec<String> {
    vec![
        "; G-code file modified by gcode-transform".to_string(),
        format!("; Original: {source}"),
        format!(
            "; Center: {}, Rotation: {}°",
            config.center, config.rotate_degrees
        ),
        format!(
            "; Translation: X={:.3}mm, Y={:.3}mm",
            config.shift_x, config.shift_y
        ),
        String::new(),
    ]
}
