//! Periodic animation workers
//!
//! A [`PeriodicWorker`] drives one [`Tick`] implementation on its own tokio
//! task. [`DisplayMotion`] bounces the label around its canvas and
//! [`TriangleMotion`] spins the polygon.

pub mod display;
pub mod periodic;
pub mod triangle;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::geometry::GeometryError;
use crate::render::RenderError;

pub use display::{DisplayMotion, DisplayState};
pub use periodic::{PeriodicWorker, Termination};
pub use triangle::{TriangleMotion, TriangleState, advance_angle, triangle_radius};

/// Retry budget for a bounded stop, in step intervals
pub const DEFAULT_STOP_ATTEMPTS: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum WorkerError {
    #[error("worker '{worker}' already has an active execution unit")]
    AlreadyRunning { worker: &'static str },

    #[error("worker '{worker}' still active after {attempts} stop attempts")]
    ShutdownTimeout { worker: &'static str, attempts: u32 },
}

/// Failure of a single tick; fatal to that worker's loop only
#[derive(Debug, Error, PartialEq)]
pub enum TickError {
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Cadence and step size of a worker, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerConfig {
    pub step_interval: Duration,
    pub step_speed: f64,
}

/// One step of a periodic computation
#[async_trait]
pub trait Tick: Send + 'static {
    /// Copy of the motion state handed out to observers
    type State: Clone + Send + std::fmt::Debug;

    /// Compute the next state and submit it for rendering
    async fn tick(&mut self) -> Result<(), TickError>;

    fn state(&self) -> Self::State;
}
