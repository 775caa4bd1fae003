//! Presentation state owned by the render context

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::RenderError;
use crate::config::Config;
use crate::geometry::{Point, Rect};

/// Canvas a render handle is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasId {
    Display,
    Triangle,
}

/// Identifier of a positioned element on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub &'static str);

impl ElementId {
    /// The drifting text label on the display canvas
    pub const DISPLAY_LABEL: ElementId = ElementId("display-text");
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    bounds: Rect,
    elements: BTreeMap<ElementId, Rect>,
    polygon: Option<Vec<Point>>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn element(&self, id: ElementId) -> Result<Rect, RenderError> {
        self.elements
            .get(&id)
            .copied()
            .ok_or(RenderError::UnknownElement(id))
    }

    pub fn polygon(&self) -> Option<&[Point]> {
        self.polygon.as_deref()
    }
}

/// Both canvases plus a revision counter bumped on every mutation
#[derive(Debug, Clone)]
pub struct Scene {
    display: Canvas,
    triangle: Canvas,
    revision: u64,
}

impl Scene {
    pub fn new(display: Canvas, triangle: Canvas) -> Self {
        Self {
            display,
            triangle,
            revision: 0,
        }
    }

    /// Lay out both canvases and the label from configuration
    pub fn from_config(config: &Config) -> Self {
        let display = &config.display;
        let triangle = &config.triangle;

        Scene::new(
            Canvas::new(display.canvas.width, display.canvas.height),
            Canvas::new(triangle.canvas.width, triangle.canvas.height),
        )
        .with_element(
            CanvasId::Display,
            ElementId::DISPLAY_LABEL,
            Rect::new(
                display.label.x,
                display.label.y,
                display.label.width,
                display.label.height,
            ),
        )
    }

    pub fn with_element(mut self, canvas: CanvasId, id: ElementId, rect: Rect) -> Self {
        self.canvas_mut(canvas).elements.insert(id, rect);
        self
    }

    pub fn canvas(&self, id: CanvasId) -> &Canvas {
        match id {
            CanvasId::Display => &self.display,
            CanvasId::Triangle => &self.triangle,
        }
    }

    fn canvas_mut(&mut self, id: CanvasId) -> &mut Canvas {
        match id {
            CanvasId::Display => &mut self.display,
            CanvasId::Triangle => &mut self.triangle,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Move an element, keeping its size
    pub fn move_element(
        &mut self,
        canvas: CanvasId,
        id: ElementId,
        position: Point,
    ) -> Result<(), RenderError> {
        let rect = self
            .canvas_mut(canvas)
            .elements
            .get_mut(&id)
            .ok_or(RenderError::UnknownElement(id))?;
        rect.origin = position;
        self.revision += 1;
        Ok(())
    }

    /// Replace whatever polygon the canvas shows
    pub fn replace_polygon(&mut self, canvas: CanvasId, vertices: Vec<Point>) {
        self.canvas_mut(canvas).polygon = Some(vertices);
        self.revision += 1;
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            revision: self.revision,
            display: CanvasSnapshot::from(&self.display),
            triangle: CanvasSnapshot::from(&self.triangle),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub revision: u64,
    pub display: CanvasSnapshot,
    pub triangle: CanvasSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasSnapshot {
    pub bounds: Rect,
    pub elements: BTreeMap<String, Rect>,
    pub polygon: Option<Vec<Point>>,
}

impl From<&Canvas> for CanvasSnapshot {
    fn from(canvas: &Canvas) -> Self {
        Self {
            bounds: canvas.bounds,
            elements: canvas
                .elements
                .iter()
                .map(|(id, rect)| (id.to_string(), *rect))
                .collect(),
            polygon: canvas.polygon.clone(),
        }
    }
}
