//! DragSurface: the UI-thread end of a drop target
//!
//! Receives the OS drag callbacks, converts coordinates, and forwards
//! events to the message sink and the coordinator. The sink lives here and
//! is only ever touched from the thread that owns the surface.

use crate::access::SecurityScope;
use crate::channel::{MessageSink, MethodCall};
use crate::config::DropConfig;
use crate::error::DropResult;
use crate::ingest::{CompletedDrop, DragPasteboard, DropCoordinator, DropTicket};
use crate::model::{DropBatch, DropPoint};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Operation reported back to the OS for a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOperation {
    None,
    Copy,
}

/// Size of the drop surface, used to flip OS coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub width: f64,
    pub height: f64,
}

impl SurfaceGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// OS location (origin bottom-left) to surface-local (origin top-left).
    pub fn convert_point(&self, x: f64, y: f64) -> DropPoint {
        DropPoint::from_surface(x, y, self.height)
    }
}

pub struct DragSurface<S: MessageSink> {
    sink: S,
    geometry: SurfaceGeometry,
    coordinator: DropCoordinator,
    completions: mpsc::UnboundedReceiver<CompletedDrop>,
}

impl<S: MessageSink> DragSurface<S> {
    pub fn new(
        sink: S,
        geometry: SurfaceGeometry,
        coordinator: DropCoordinator,
        completions: mpsc::UnboundedReceiver<CompletedDrop>,
    ) -> Self {
        Self {
            sink,
            geometry,
            coordinator,
            completions,
        }
    }

    /// Build a surface with its own coordinator.
    pub fn attach(
        sink: S,
        geometry: SurfaceGeometry,
        config: DropConfig,
        scope: Arc<dyn SecurityScope>,
        runtime: Handle,
    ) -> DropResult<Self> {
        let (coordinator, completions) = DropCoordinator::new(config, scope, runtime)?;
        Ok(Self::new(sink, geometry, coordinator, completions))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn coordinator(&self) -> &DropCoordinator {
        &self.coordinator
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.geometry = SurfaceGeometry::new(width, height);
    }

    pub fn dragging_entered(&mut self, x: f64, y: f64) -> DragOperation {
        let point = self.geometry.convert_point(x, y);
        self.sink.invoke_method(MethodCall::entered(point));
        DragOperation::Copy
    }

    pub fn dragging_updated(&mut self, x: f64, y: f64) -> DragOperation {
        let point = self.geometry.convert_point(x, y);
        self.sink.invoke_method(MethodCall::updated(point));
        DragOperation::Copy
    }

    pub fn dragging_exited(&mut self) {
        self.sink.invoke_method(MethodCall::exited());
    }

    /// Accept a drop. Call from inside the OS drop callback.
    ///
    /// `dropReceived` is sent before this returns; the batch follows later
    /// through `pump` or `next_completed`.
    pub fn perform_drag_operation(
        &mut self,
        pasteboard: &dyn DragPasteboard,
        x: f64,
        y: f64,
    ) -> DropTicket {
        let location = self.geometry.convert_point(x, y);
        let (ticket, received) = self.coordinator.begin_drop(pasteboard, location);
        self.sink.invoke_method(received);
        ticket
    }

    /// Deliver every batch that has finished so far. Returns how many.
    ///
    /// Meant to be called from the UI event loop.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(completed) = self.completions.try_recv() {
            completed.deliver(&mut self.sink);
            delivered += 1;
        }
        delivered
    }

    /// Wait for the next finished batch and deliver it.
    pub async fn next_completed(&mut self) -> Option<DropBatch> {
        let completed = self.completions.recv().await?;
        Some(completed.deliver(&mut self.sink))
    }
}
