//! desktop-drop: drag-and-drop ingestion for desktop surfaces
//!
//! Turns an OS drop payload (file URLs, a legacy filename list, or file
//! promises that must be written to disk first) into a deduplicated batch
//! of file descriptors, and hands that batch back to the UI layer without
//! blocking it.
//!
//! # Core Concepts
//!
//! - **Surface**: the UI-thread end. Receives drag callbacks and owns the
//!   message sink the consumer listens on.
//! - **Coordinator**: classifies a drop on the UI thread, answers with an
//!   immediate `dropReceived`, then enriches items in the background.
//! - **Batch**: every descriptor produced by one drop, delivered at once
//!   as `performOperation`.
//!
//! # Example
//!
//! ```no_run
//! use desktop_drop::{DragSurface, DropConfig, DropPayload, PortableBookmarks, RecordingSink, SurfaceGeometry};
//! use std::sync::Arc;
//!
//! # async fn run() -> desktop_drop::DropResult<()> {
//! let mut surface = DragSurface::attach(
//!     RecordingSink::new(),
//!     SurfaceGeometry::new(800.0, 600.0),
//!     DropConfig::default(),
//!     Arc::new(PortableBookmarks::new()),
//!     tokio::runtime::Handle::current(),
//! )?;
//!
//! let payload = DropPayload::new().with_file_url("file:///Users/me/report.pdf");
//! surface.perform_drag_operation(&payload, 120.0, 40.0);
//! surface.next_completed().await;
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod channel;
pub mod config;
mod error;
pub mod ingest;
pub mod model;
pub mod surface;

pub use access::{PortableBookmarks, ScopeError, SecurityScope};
pub use channel::{
    CommandResult, JsonLinesSink, MessageSink, MethodCall, RecordingSink, ResourceAccessHandler,
};
pub use config::{ConfigError, DropConfig};
pub use error::{DropError, DropResult};
pub use ingest::{
    Classification, CompletedDrop, CopyFilePromise, DragPasteboard, DropCoordinator, DropPayload,
    DropPhase, DropTicket, FilePromise, ItemEnricher, PasteboardError, PathDeduplicator,
    PayloadClassifier, PayloadKind, PromiseError, PromiseMaterializer, SandboxRoots,
};
pub use model::{AccessToken, DropBatch, DropPoint, FileDescriptor};
pub use surface::{DragOperation, DragSurface, SurfaceGeometry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
