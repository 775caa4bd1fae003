//! Control surface: maps start/stop intents onto the two workers

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::geometry::Point;
use crate::render::{CanvasId, ElementId, RenderHandle};
use crate::worker::{
    DisplayMotion, DisplayState, PeriodicWorker, Termination, TickError, TriangleMotion,
    TriangleState, WorkerError,
};

pub type DisplayWorker = PeriodicWorker<DisplayMotion<RenderHandle>>;
pub type TriangleWorker = PeriodicWorker<TriangleMotion<RenderHandle>>;

/// Enabled state of the four start/stop controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub display_start: bool,
    pub display_stop: bool,
    pub triangle_start: bool,
    pub triangle_stop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub display: Termination,
    pub triangle: Termination,
}

pub struct Controller {
    display: DisplayWorker,
    triangle: TriangleWorker,
    stop_attempts: u32,
    force_deadline: Duration,
}

impl Controller {
    /// Build both workers and draw the polygon at its initial angle.
    ///
    /// `config` is expected to be validated already.
    pub async fn new(config: &Config, render: &RenderHandle) -> Result<Self, TickError> {
        let display_config = config.display.worker();
        let triangle_config = config.triangle.worker();

        let label = &config.display.label;
        let display = DisplayMotion::new(
            render.for_canvas(CanvasId::Display),
            ElementId::DISPLAY_LABEL,
            display_config.step_speed,
            Point::new(label.x, label.y),
        );

        let triangle = TriangleMotion::new(
            render.for_canvas(CanvasId::Triangle),
            triangle_config.step_speed,
            config.triangle.sides,
            config.triangle.initial_angle,
        );
        triangle.draw().await?;

        let display_worker = PeriodicWorker::from_config("display", display_config, display);
        let triangle_worker = PeriodicWorker::from_config("triangle", triangle_config, triangle);

        for worker in [display_worker.name(), triangle_worker.name()] {
            debug!(worker, "Worker registered");
        }
        let display_interval_ms = display_worker.interval().as_secs_f64() * 1000.0;
        let triangle_interval_ms = triangle_worker.interval().as_secs_f64() * 1000.0;
        info!(display_interval_ms, triangle_interval_ms, "Controller ready");

        Ok(Self {
            display: display_worker,
            triangle: triangle_worker,
            stop_attempts: config.shutdown.stop_attempts,
            force_deadline: config.shutdown.force_deadline.as_duration(),
        })
    }

    pub fn start_display_worker(&mut self) -> Result<(), WorkerError> {
        self.display.start()
    }

    pub async fn stop_display_worker(&mut self) -> Result<(), WorkerError> {
        self.display.stop_and_wait(self.stop_attempts).await
    }

    pub fn start_triangle_worker(&mut self) -> Result<(), WorkerError> {
        self.triangle.start()
    }

    pub async fn stop_triangle_worker(&mut self) -> Result<(), WorkerError> {
        self.triangle.stop_and_wait(self.stop_attempts).await
    }

    /// Window-close path: stop both, aborting whatever misses the deadline
    pub async fn shutdown_all(&mut self) -> ShutdownReport {
        self.display.request_stop();
        self.triangle.request_stop();

        let (display_outcome, triangle_outcome) = tokio::join!(
            self.display.force_terminate(self.force_deadline),
            self.triangle.force_terminate(self.force_deadline),
        );

        if display_outcome == Termination::Aborted || triangle_outcome == Termination::Aborted {
            warn!(
                display = ?display_outcome,
                triangle = ?triangle_outcome,
                "Shutdown aborted a worker"
            );
        } else {
            info!(
                display = ?display_outcome,
                triangle = ?triangle_outcome,
                "All workers shut down"
            );
        }

        ShutdownReport {
            display: display_outcome,
            triangle: triangle_outcome,
        }
    }

    /// A start control is enabled only once the previous execution unit is
    /// gone; a stop control only while the worker is running.
    pub fn controls(&self) -> ControlState {
        ControlState {
            display_start: !self.display.is_active(),
            display_stop: self.display.is_running(),
            triangle_start: !self.triangle.is_active(),
            triangle_stop: self.triangle.is_running(),
        }
    }

    pub fn display(&self) -> &DisplayWorker {
        &self.display
    }

    pub fn triangle(&self) -> &TriangleWorker {
        &self.triangle
    }

    pub async fn display_state(&self) -> DisplayState {
        self.display.state().await
    }

    pub async fn triangle_state(&self) -> TriangleState {
        self.triangle.state().await
    }
}
