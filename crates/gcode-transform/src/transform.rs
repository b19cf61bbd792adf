use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gcode_transform_core::{
    AxisPolicy, ConfigLayer, TransformConfig, header_lines, transform_reader,
};
use log::{debug, info};

use crate::output::{self, Input, Output};

#[derive(Args, Debug, Default, Clone)]
pub struct TransformArgs {
    /// G-code file to transform. Reads stdin when omitted or `-`.
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Angle in degrees (positive = clockwise, negative = counter-clockwise) [default: 0]
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub rotate: Option<f64>,

    /// Shift along X in mm (positive = right, negative = left) [default: 0]
    #[arg(long, value_name = "MM", allow_negative_numbers = true)]
    pub shiftx: Option<f64>,

    /// Shift along Y in mm (positive = forward, negative = backward) [default: 0]
    #[arg(long, value_name = "MM", allow_negative_numbers = true)]
    pub shifty: Option<f64>,

    /// Rotation center as `<X>x<Y>` in mm [default: 125x100]
    #[arg(long, value_name = "XxY", allow_hyphen_values = true)]
    pub center: Option<String>,

    /// Decimal places for rewritten coordinates [default: 3]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub precision: Option<i64>,

    /// Only write the axes a move already had, even when the rotation would
    /// move the other axis too
    #[arg(long)]
    pub preserve_axes: bool,

    /// TOML file with default settings; command-line flags take precedence
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Write the result to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE", conflicts_with_all = ["in_place", "diff"])]
    pub output: Option<PathBuf>,

    /// Rewrite INPUT in place
    #[arg(short = 'i', long, requires = "input", conflicts_with = "diff")]
    pub in_place: bool,

    /// Print a unified diff of the changes instead of the program
    #[arg(long)]
    pub diff: bool,

    /// Prepend a comment block describing the transformation
    #[arg(long)]
    pub header: bool,
}

impl TransformArgs {
    fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            rotate: self.rotate,
            shiftx: self.shiftx,
            shifty: self.shifty,
            center: self.center.clone(),
            precision: self.precision,
            axes: self.preserve_axes.then_some(AxisPolicy::Preserve),
        }
    }
}

/// Merge the optional config file with the command line and validate.
pub fn resolve_config(args: &TransformArgs) -> Result<TransformConfig> {
    let file_layer = match &args.config {
        Some(path) => ConfigLayer::load(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        None => ConfigLayer::default(),
    };

    file_layer
        .overlay(args.config_layer())
        .resolve()
        .context("Invalid transform configuration")
}

pub fn execute(args: TransformArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let input = Input::from_arg(args.input.as_deref());
    debug!("Transforming {}", input.display_name());

    let header = args
        .header
        .then(|| header_lines(&config, &input.display_name()));

    if args.diff || args.in_place {
        let source = input.read_bytes()?;
        let mut transformed: Vec<u8> = Vec::with_capacity(source.len());
        for line in header.iter().flatten() {
            writeln!(transformed, "{line}")?;
        }
        let stats = transform_reader(&config, source.as_slice(), &mut transformed)
            .with_context(|| format!("Failed to transform {}", input.display_name()))?;
        info!("{stats}");

        if args.diff {
            print!(
                "{}",
                output::unified_diff(
                    &String::from_utf8_lossy(&source),
                    &String::from_utf8_lossy(&transformed),
                    &input.display_name()
                )
            );
            return Ok(());
        }

        let Some(path) = input.path() else {
            anyhow::bail!("--in-place needs an input file, not stdin");
        };
        output::write_atomic(path, &transformed)?;
        info!("Rewrote {}", path.display());
        return Ok(());
    }

    let destination = Output::from_arg(args.output.as_deref());
    if let (Some(src), Output::File(dst)) = (input.path(), &destination) {
        // Creating the output would truncate the input before it is read.
        if output::same_file(src, dst) {
            anyhow::bail!(
                "Output file '{}' is the input file; use --in-place to rewrite it",
                dst.display()
            );
        }
    }

    let reader = input.open()?;
    let mut writer = destination.open()?;
    for line in header.iter().flatten() {
        writeln!(writer, "{line}")?;
    }
    let stats = transform_reader(&config, reader, &mut writer)
        .with_context(|| format!("Failed to transform {}", input.display_name()))?;
    info!("{stats}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcode_transform_core::Center;
    use std::io::Write as _;

    #[test]
    fn test_resolve_config_defaults() {
        let config = resolve_config(&TransformArgs::default()).unwrap();
        assert_eq!(config, TransformConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rotate = 4\nshiftx = -5\ncenter = \"0x0\"").unwrap();

        let args = TransformArgs {
            config: Some(file.path().to_path_buf()),
            rotate: Some(-4.0),
            preserve_axes: true,
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.rotate_degrees, -4.0);
        assert_eq!(config.shift_x, -5.0);
        assert_eq!(config.center, Center::new(0.0, 0.0));
        assert_eq!(config.axis_policy, AxisPolicy::Preserve);
    }

    #[test]
    fn test_bad_center_is_reported() {
        let args = TransformArgs {
            center: Some("125/100".into()),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert_eq!(err.to_string(), "Invalid transform configuration");
        assert!(format!("{:#}", err).contains("Invalid center '125/100'"));
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let args = TransformArgs {
            config: Some(PathBuf::from("/nonexistent/gcode-transform.toml")),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config file"));
    }
}
