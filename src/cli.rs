use clap::{Parser, Subcommand};
use motionbox::humanize::HumanDuration;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "motionbox")]
#[command(about = "MotionBox CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the drifting label and rotating polygon workers
    Run(RunArgs),
    /// Print the vertices of a regular polygon as JSON
    Polygon(PolygonArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Configuration file (defaults to $MOTIONBOX_CONFIG or config/motionbox.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop after this long (e.g. "5s"); runs until Ctrl+C when omitted
    #[arg(long)]
    pub duration: Option<HumanDuration>,

    /// Leave the drifting label idle
    #[arg(long)]
    pub no_display: bool,

    /// Leave the rotating polygon idle
    #[arg(long)]
    pub no_triangle: bool,
}

#[derive(clap::Args, Debug)]
pub struct PolygonArgs {
    /// Number of sides (at least 3)
    #[arg(long, default_value_t = 3)]
    pub sides: usize,

    #[arg(long, default_value_t = 100.0)]
    pub radius: f64,

    /// Angle of the first vertex, in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub angle: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub cx: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub cy: f64,
}
