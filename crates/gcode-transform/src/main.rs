#[cfg(all(feature = "mimalloc", not(target_family = "wasm")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use colored::Colorize;
use env_logger::Env;

mod output;
mod transform;

#[derive(Parser)]
#[command(name = "gcode-transform")]
#[command(about = "Rotate and shift G-code coordinates", long_about = None)]
#[command(version)]
#[command(
    after_help = "Example: gcode-transform --rotate 4 --shiftx -5 part.gcode > transformed.gcode\n\
                  Positive --rotate turns clockwise, negative counter-clockwise.\n\
                  Positive --shiftx moves right, positive --shifty moves forward."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    #[command(flatten)]
    transform: transform::TransformArgs,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    transform::execute(cli.transform)
}
