use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::scene::{CanvasId, ElementId, Scene, SceneSnapshot};
use super::{RenderError, RenderSink, Result};
use crate::geometry::{Point, Rect};

/// Commands buffered ahead of the render context before senders wait
const COMMAND_BUFFER: usize = 64;

enum Command {
    Bounds {
        canvas: CanvasId,
        reply: oneshot::Sender<Rect>,
    },
    Element {
        canvas: CanvasId,
        id: ElementId,
        reply: oneshot::Sender<Result<Rect>>,
    },
    MoveElement {
        canvas: CanvasId,
        id: ElementId,
        position: Point,
        reply: oneshot::Sender<Result<()>>,
    },
    ReplacePolygon {
        canvas: CanvasId,
        vertices: Vec<Point>,
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SceneSnapshot>,
    },
    Close,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Bounds { .. } => "Bounds",
            Command::Element { .. } => "Element",
            Command::MoveElement { .. } => "MoveElement",
            Command::ReplacePolygon { .. } => "ReplacePolygon",
            Command::Snapshot { .. } => "Snapshot",
            Command::Close => "Close",
        };
        f.write_str(name)
    }
}

/// Task that owns the [`Scene`]
///
/// Commands are applied whole and in arrival order. Replies are best effort:
/// a caller that went away (for instance an aborted worker) does not undo or
/// interrupt the update it already submitted.
pub struct RenderContext {
    scene: Scene,
    rx: mpsc::Receiver<Command>,
}

impl RenderContext {
    /// Spawn the render context on the current runtime.
    ///
    /// The returned join handle yields the final scene once the context is
    /// closed or every handle has been dropped.
    pub fn spawn(scene: Scene) -> (RenderHandle, JoinHandle<Scene>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let context = RenderContext { scene, rx };

        let join = tokio::spawn(context.run());
        info!("Render context started");

        let handle = RenderHandle {
            tx,
            canvas: CanvasId::Display,
        };

        (handle, join)
    }

    async fn run(mut self) -> Scene {
        while let Some(command) = self.rx.recv().await {
            if !self.apply(command) {
                break;
            }
        }

        // Drop queued commands so their callers observe SinkClosed
        self.rx.close();
        info!(revision = self.scene.revision(), "Render context stopped");
        self.scene
    }

    /// Returns false once the context should stop
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Bounds { canvas, reply } => {
                let _ = reply.send(self.scene.canvas(canvas).bounds());
            }
            Command::Element { canvas, id, reply } => {
                let _ = reply.send(self.scene.canvas(canvas).element(id));
            }
            Command::MoveElement {
                canvas,
                id,
                position,
                reply,
            } => {
                let result = self.scene.move_element(canvas, id, position);
                trace!(?canvas, %id, x = position.x, y = position.y, "Element moved");
                let _ = reply.send(result);
            }
            Command::ReplacePolygon {
                canvas,
                vertices,
                reply,
            } => {
                trace!(?canvas, vertices = vertices.len(), "Polygon replaced");
                self.scene.replace_polygon(canvas, vertices);
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.scene.snapshot());
            }
            Command::Close => {
                debug!("Render context close requested");
                return false;
            }
        }

        true
    }
}

/// Cloneable handle to the render context, scoped to one canvas
#[derive(Debug, Clone)]
pub struct RenderHandle {
    tx: mpsc::Sender<Command>,
    canvas: CanvasId,
}

impl RenderHandle {
    /// Same render context, different canvas
    pub fn for_canvas(&self, canvas: CanvasId) -> RenderHandle {
        RenderHandle {
            tx: self.tx.clone(),
            canvas,
        }
    }

    pub fn canvas(&self) -> CanvasId {
        self.canvas
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn snapshot(&self) -> Result<SceneSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Ask the context to stop. Commands queued behind this one are dropped.
    pub async fn close(&self) {
        if self.tx.send(Command::Close).await.is_err() {
            debug!("Render context already closed");
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();

        self.tx
            .send(build(reply))
            .await
            .map_err(|_| RenderError::SinkClosed)?;

        response.await.map_err(|_| RenderError::SinkClosed)
    }
}

#[async_trait]
impl RenderSink for RenderHandle {
    async fn query_bounds(&self) -> Result<Rect> {
        let canvas = self.canvas;
        self.request(|reply| Command::Bounds { canvas, reply }).await
    }

    async fn query_element_position(&self, id: ElementId) -> Result<Rect> {
        let canvas = self.canvas;
        self.request(|reply| Command::Element { canvas, id, reply })
            .await?
    }

    async fn set_element_position(&self, id: ElementId, position: Point) -> Result<()> {
        let canvas = self.canvas;
        self.request(|reply| Command::MoveElement {
            canvas,
            id,
            position,
            reply,
        })
        .await?
    }

    async fn set_polygon(&self, vertices: Vec<Point>) -> Result<()> {
        let canvas = self.canvas;
        self.request(|reply| Command::ReplacePolygon {
            canvas,
            vertices,
            reply,
        })
        .await
    }
}
