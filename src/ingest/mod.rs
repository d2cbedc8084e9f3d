//! Drop ingestion pipeline
//!
//! One drop gesture flows through these stages:
//! 1. `classify` reads the pasteboard once, on the UI thread
//! 2. `coordinator` answers with `dropReceived` and moves to the background
//! 3. `enrich` turns each concrete path into a descriptor, in parallel
//! 4. `materialize` writes file promises to disk, then enriches them
//! 5. `coordinator` assembles the batch and hands it back to the UI thread
//!
//! `dedup` is the only state shared between workers of one drop.

mod classify;
mod coordinator;
mod dedup;
mod enrich;
mod materialize;

pub use classify::{
    Classification, DragPasteboard, DropPayload, PasteboardError, PayloadClassifier, PayloadKind,
};
pub use coordinator::{CompletedDrop, DropCoordinator, DropPhase, DropTicket};
pub use dedup::PathDeduplicator;
pub use enrich::{ItemEnricher, SandboxRoots};
pub use materialize::{
    unique_drop_destination, CopyFilePromise, FilePromise, MaterializeReport, PromiseError,
    PromiseMaterializer,
};
