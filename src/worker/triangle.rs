//! Rotating polygon

use async_trait::async_trait;
use tracing::trace;

use super::{Tick, TickError};
use crate::geometry::{Rect, normalize_degrees, polygon_vertices};
use crate::render::RenderSink;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleState {
    /// Always within `[0, 360)`
    pub angle_degrees: f64,
}

/// Rotate clockwise by one tick.
///
/// The angle is decremented by `speed` twice per tick, with the upper wrap
/// checked between the two steps and the lower wrap after them.
// TODO: confirm whether the double decrement is meant as "spin twice as
// fast"; if not, drop the second step and double the configured speeds.
pub fn advance_angle(angle_degrees: f64, speed: f64) -> f64 {
    let mut angle = angle_degrees - speed;
    if angle > 360.0 {
        angle -= 360.0;
    }
    angle -= speed;
    if angle < 0.0 {
        angle += 360.0;
    }

    normalize_degrees(angle)
}

/// Circumradius fitting the polygon inside its canvas with some margin
pub fn triangle_radius(bounds: Rect) -> f64 {
    (bounds.width / 2.5).min(bounds.height / 2.5)
}

pub struct TriangleMotion<S> {
    sink: S,
    speed: f64,
    sides: usize,
    angle: f64,
}

impl<S: RenderSink> TriangleMotion<S> {
    pub fn new(sink: S, speed: f64, sides: usize, initial_angle: f64) -> Self {
        Self {
            sink,
            speed,
            sides,
            angle: normalize_degrees(initial_angle),
        }
    }

    /// Draw the polygon at the current angle, replacing the previous one
    pub async fn draw(&self) -> Result<(), TickError> {
        let bounds = self.sink.query_bounds().await?;
        let vertices = polygon_vertices(
            self.sides,
            triangle_radius(bounds),
            self.angle,
            bounds.center(),
        )?;

        self.sink.set_polygon(vertices).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: RenderSink + 'static> Tick for TriangleMotion<S> {
    type State = TriangleState;

    async fn tick(&mut self) -> Result<(), TickError> {
        self.angle = advance_angle(self.angle, self.speed);
        trace!(angle = self.angle, "Polygon rotated");

        self.draw().await
    }

    fn state(&self) -> TriangleState {
        TriangleState {
            angle_degrees: self.angle,
        }
    }
}
