//! Drifting label
//!
//! Each tick reads the label and canvas rectangles from the render sink,
//! reflects the drift offset off whichever edges the label touches, and
//! moves the label by the offset.

use async_trait::async_trait;
use tracing::trace;

use super::{Tick, TickError};
use crate::geometry::{Point, bounce_offset, edge_gaps};
use crate::render::{ElementId, RenderSink};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    /// Per-tick displacement
    pub offset: Point,
    /// Last position submitted for the label
    pub margin: Point,
}

pub struct DisplayMotion<S> {
    sink: S,
    label: ElementId,
    speed: f64,
    offset: Point,
    margin: Point,
}

impl<S: RenderSink> DisplayMotion<S> {
    /// Start drifting right and up at `speed` per tick
    pub fn new(sink: S, label: ElementId, speed: f64, initial_margin: Point) -> Self {
        Self {
            sink,
            label,
            speed,
            offset: Point::new(speed, -speed),
            margin: initial_margin,
        }
    }
}

#[async_trait]
impl<S: RenderSink + 'static> Tick for DisplayMotion<S> {
    type State = DisplayState;

    async fn tick(&mut self) -> Result<(), TickError> {
        let bounds = self.sink.query_bounds().await?;
        let label = self.sink.query_element_position(self.label).await?;

        let (near, far) = edge_gaps(label, bounds);
        self.offset = bounce_offset(self.offset, self.speed, near, far);

        let next = label.origin + self.offset;
        self.sink.set_element_position(self.label, next).await?;
        self.margin = next;

        trace!(x = next.x, y = next.y, "Label moved");
        Ok(())
    }

    fn state(&self) -> DisplayState {
        DisplayState {
            offset: self.offset,
            margin: self.margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::render::{Canvas, CanvasId, RenderContext, RenderError, RenderHandle, Scene};

    const EPS: f64 = 1e-9;

    fn spawn_scene(label: Rect) -> RenderHandle {
        let scene = Scene::new(Canvas::new(400.0, 300.0), Canvas::new(300.0, 300.0))
            .with_element(CanvasId::Display, ElementId::DISPLAY_LABEL, label);
        let (handle, _join) = RenderContext::spawn(scene);
        handle.for_canvas(CanvasId::Display)
    }

    #[tokio::test]
    async fn test_first_tick_flips_off_top_edge() {
        let sink = spawn_scene(Rect::new(0.0, 0.0, 50.0, 20.0));
        let mut motion = DisplayMotion::new(sink.clone(), ElementId::DISPLAY_LABEL, 0.2, Point::default());

        assert_eq!(motion.state().offset, Point::new(0.2, -0.2));

        motion.tick().await.unwrap();

        // Touching the top edge turns the upward drift into downward drift
        let state = motion.state();
        assert_eq!(state.offset, Point::new(0.2, 0.2));
        assert!((state.margin.x - 0.2).abs() < EPS);
        assert!((state.margin.y - 0.2).abs() < EPS);

        let rect = sink.query_element_position(ElementId::DISPLAY_LABEL).await.unwrap();
        assert_eq!(rect.origin, state.margin);
        assert_eq!((rect.width, rect.height), (50.0, 20.0));
    }

    #[tokio::test]
    async fn test_bounces_off_bottom_right_corner() {
        let sink = spawn_scene(Rect::new(350.0, 280.0, 50.0, 20.0));
        let mut motion =
            DisplayMotion::new(sink.clone(), ElementId::DISPLAY_LABEL, 1.0, Point::new(350.0, 280.0));

        motion.tick().await.unwrap();

        assert_eq!(motion.state().offset, Point::new(-1.0, -1.0));
        assert_eq!(motion.state().margin, Point::new(349.0, 279.0));
    }

    #[tokio::test]
    async fn test_label_stays_in_bounds() {
        let sink = spawn_scene(Rect::new(10.0, 10.0, 50.0, 20.0));
        let speed = 3.0;
        let mut motion = DisplayMotion::new(sink.clone(), ElementId::DISPLAY_LABEL, speed, Point::new(10.0, 10.0));

        for _ in 0..2000 {
            motion.tick().await.unwrap();
            let rect = sink.query_element_position(ElementId::DISPLAY_LABEL).await.unwrap();

            // One step of overshoot past an edge is allowed before the flip
            assert!(rect.origin.x >= -speed && rect.origin.x + rect.width <= 400.0 + speed);
            assert!(rect.origin.y >= -speed && rect.origin.y + rect.height <= 300.0 + speed);
        }
    }

    #[tokio::test]
    async fn test_closed_sink_fails_tick() {
        let sink = spawn_scene(Rect::new(0.0, 0.0, 50.0, 20.0));
        sink.close().await;

        let mut motion = DisplayMotion::new(sink, ElementId::DISPLAY_LABEL, 0.2, Point::default());
        let result = motion.tick().await;

        assert_eq!(result, Err(TickError::Render(RenderError::SinkClosed)));
    }
}
