mod app;
mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use motionbox::config::Config;
use motionbox::geometry::{Point, polygon_vertices};
use motionbox::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = match args.config.clone() {
                Some(path) => Config::load_from_path(path)?,
                None => Config::load()?,
            };
            observability::init_tracing(&config.telemetry.log_filter);

            app::run(config, app::RunOptions::from(&args)).await?
        }
        Commands::Polygon(args) => {
            let vertices = polygon_vertices(
                args.sides,
                args.radius,
                args.angle,
                Point::new(args.cx, args.cy),
            )?;
            println!("{}", serde_json::to_string_pretty(&vertices)?);
        }
    }

    Ok(())
}
