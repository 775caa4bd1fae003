//! Pure geometry helpers for the animated elements
//!
//! Coordinates follow a top-left origin: X grows to the right, Y grows
//! downwards. Angles are in degrees, 0° pointing along +X and increasing
//! counter-clockwise on screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Point (or displacement) in canvas coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.origin.x + self.width, self.origin.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }
}

/// Convert a polar angle around `origin` into a canvas point.
///
/// The Y component is negated so that increasing angles turn
/// counter-clockwise on a top-left-origin canvas.
pub fn point_on_circle(angle_degrees: f64, radius: f64, origin: Point) -> Point {
    let radians = angle_degrees * std::f64::consts::PI / 180.0;

    Point::new(
        radians.cos() * radius + origin.x,
        (-radians).sin() * radius + origin.y,
    )
}

/// Vertices of a regular polygon, in ascending angle order.
///
/// The renderer connects vertices in sequence, so the order is part of the
/// contract.
pub fn polygon_vertices(
    sides: usize,
    radius: f64,
    starting_angle_degrees: f64,
    center: Point,
) -> Result<Vec<Point>> {
    if sides < 3 {
        return Err(GeometryError::InvalidArgument(format!(
            "polygon must have 3 sides or more, got {sides}"
        )));
    }

    let step = 360.0 / sides as f64;

    // Index-based stepping so float drift never adds or drops a vertex
    let vertices = (0..sides)
        .map(|i| point_on_circle(starting_angle_degrees + step * i as f64, radius, center))
        .collect();

    Ok(vertices)
}

/// Reflect one axis of a drift offset.
///
/// `near_gap` is the distance from the near edge of the box to the
/// object's leading edge, `far_gap` the distance from the object's trailing
/// edge to the far edge of the box. When both are exhausted in the same
/// tick the far check runs last and wins.
pub fn bounce_axis(current: f64, speed: f64, near_gap: f64, far_gap: f64) -> f64 {
    let mut offset = current;

    if near_gap <= 0.0 {
        offset = speed;
    }
    if far_gap <= 0.0 {
        offset = -speed;
    }

    offset
}

/// Reflect a 2D drift offset against a containing box.
///
/// Both axes are evaluated independently on every call.
pub fn bounce_offset(current: Point, speed: f64, near_gap: Point, far_gap: Point) -> Point {
    Point::new(
        bounce_axis(current.x, speed, near_gap.x, far_gap.x),
        bounce_axis(current.y, speed, near_gap.y, far_gap.y),
    )
}

/// Gaps between an element and the box that contains it, as consumed by
/// [`bounce_offset`]: `(near, far)`.
pub fn edge_gaps(element: Rect, bounds: Rect) -> (Point, Point) {
    let near = Point::new(
        element.origin.x - bounds.origin.x,
        element.origin.y - bounds.origin.y,
    );
    let element_br = element.bottom_right();
    let bounds_br = bounds.bottom_right();
    let far = Point::new(bounds_br.x - element_br.x, bounds_br.y - element_br.y);

    (near, far)
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
