//! Render sink: the single-threaded owner of presentation state
//!
//! Workers never touch the [`Scene`] directly. They hold a [`RenderHandle`]
//! scoped to one canvas and submit commands to the [`RenderContext`] task,
//! which applies them one at a time in submission order.

pub mod context;
pub mod scene;

use async_trait::async_trait;
use thiserror::Error;

use crate::geometry::{Point, Rect};

pub use context::{RenderContext, RenderHandle};
pub use scene::{Canvas, CanvasId, CanvasSnapshot, ElementId, Scene, SceneSnapshot};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("render context is closed")]
    SinkClosed,

    #[error("unknown element: {0}")]
    UnknownElement(ElementId),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Capability the workers draw through.
///
/// Every method may be called from any task; implementations marshal the
/// call onto the render context and return once it has been applied.
#[async_trait]
pub trait RenderSink: Send + Sync {
    /// Bounding box of the canvas
    async fn query_bounds(&self) -> Result<Rect>;

    /// Current rectangle of an element, relative to the canvas
    async fn query_element_position(&self, id: ElementId) -> Result<Rect>;

    async fn set_element_position(&self, id: ElementId, position: Point) -> Result<()>;

    /// Replace the polygon drawn on the canvas
    async fn set_polygon(&self, vertices: Vec<Point>) -> Result<()>;
}
