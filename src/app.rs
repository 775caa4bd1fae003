use motionbox::config::Config;
use motionbox::controller::Controller;
use motionbox::render::{RenderContext, RenderHandle, Scene};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub struct RunOptions {
    pub duration: Option<Duration>,
    pub display: bool,
    pub triangle: bool,
}

impl From<&RunArgs> for RunOptions {
    fn from(args: &RunArgs) -> Self {
        Self {
            duration: args.duration.map(|d| d.as_duration()),
            display: !args.no_display,
            triangle: !args.no_triangle,
        }
    }
}

pub async fn run(config: Config, options: RunOptions) -> Result<(), AnyError> {
    let (render, render_task) = RenderContext::spawn(Scene::from_config(&config));
    let mut controller = Controller::new(&config, &render).await?;

    if options.display {
        controller.start_display_worker()?;
    }
    if options.triangle {
        controller.start_triangle_worker()?;
    }

    let elapsed = async {
        match options.duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    let shutdown = shutdown_signal();
    tokio::pin!(elapsed, shutdown);

    let mut report = tokio::time::interval(config.telemetry.report_interval.as_duration());

    loop {
        tokio::select! {
            _ = &mut elapsed => {
                info!("Run duration elapsed");
                break;
            }
            _ = &mut shutdown => break,
            _ = report.tick() => report_progress(&controller, &render).await,
        }
    }

    let outcome = controller.shutdown_all().await;
    render.close().await;
    let scene = render_task.await?;

    info!(revision = scene.revision(), ?outcome, "MotionBox stopped");
    Ok(())
}

async fn report_progress(controller: &Controller, render: &RenderHandle) {
    let label = controller.display_state().await;
    let polygon = controller.triangle_state().await;

    match render.snapshot().await {
        Ok(snapshot) => info!(
            revision = snapshot.revision,
            label_x = label.margin.x,
            label_y = label.margin.y,
            angle = polygon.angle_degrees,
            display_ticks = controller.display().metrics().ticks,
            triangle_ticks = controller.triangle().metrics().ticks,
            "Progress"
        ),
        Err(e) => warn!(error = %e, "Scene snapshot unavailable"),
    }
}

/// Resolves on Ctrl+C or SIGTERM, the equivalent of closing the window
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
