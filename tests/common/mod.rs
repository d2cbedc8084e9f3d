//! Shared fixtures for drop scenario tests
//!
//! Surfaces built here use sandbox roots under `/nonexistent`, so files in a
//! test's temp directory count as outside the sandbox and receive tokens.

#![allow(dead_code)]

use async_trait::async_trait;
use desktop_drop::{
    DragPasteboard, DragSurface, DropConfig, FilePromise, PasteboardError, PortableBookmarks,
    PromiseError, RecordingSink, SurfaceGeometry,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use url::Url;

pub const SURFACE_WIDTH: f64 = 800.0;
pub const SURFACE_HEIGHT: f64 = 600.0;

pub fn test_config() -> DropConfig {
    DropConfig::default()
        .with_container_root("/nonexistent/container")
        .with_temp_root("/nonexistent/tmp")
}

/// A recording surface on the current runtime, plus its scope.
pub fn recording_surface(
    config: DropConfig,
) -> (DragSurface<RecordingSink>, Arc<PortableBookmarks>) {
    let scope = Arc::new(PortableBookmarks::new());
    let surface = DragSurface::attach(
        RecordingSink::new(),
        SurfaceGeometry::new(SURFACE_WIDTH, SURFACE_HEIGHT),
        config,
        scope.clone(),
        Handle::current(),
    )
    .expect("test config is valid");
    (surface, scope)
}

/// Create `count` files named `file-<n>.txt` under `dir`.
pub fn make_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|n| {
            let path = dir.join(format!("file-{}.txt", n));
            std::fs::write(&path, format!("contents {}", n)).expect("write fixture");
            path
        })
        .collect()
}

pub fn file_url(path: &Path) -> String {
    Url::from_file_path(path)
        .expect("absolute fixture path")
        .to_string()
}

/// A promise whose transfer always fails.
pub struct FailingPromise {
    pub name: String,
}

impl FailingPromise {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl FilePromise for FailingPromise {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn receive(&self, _destination: &Path) -> Result<PathBuf, PromiseError> {
        Err(PromiseError::Cancelled)
    }
}

/// A promise that writes fixed contents under a fixed name.
pub struct WritingPromise {
    pub name: String,
    pub contents: Vec<u8>,
}

impl WritingPromise {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

#[async_trait]
impl FilePromise for WritingPromise {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn receive(&self, destination: &Path) -> Result<PathBuf, PromiseError> {
        let target = destination.join(&self.name);
        tokio::fs::write(&target, &self.contents).await?;
        Ok(target)
    }
}

/// A pasteboard whose file-URL type cannot be read.
///
/// Legacy filenames and promises still come through.
pub struct UnreadableUrlsPasteboard {
    pub legacy: Vec<String>,
    pub promises: Vec<Arc<dyn FilePromise>>,
}

impl DragPasteboard for UnreadableUrlsPasteboard {
    fn file_urls(&self) -> Result<Vec<String>, PasteboardError> {
        Err(PasteboardError::Unreadable("public.file-url".to_string()))
    }

    fn legacy_filenames(&self) -> Result<Vec<String>, PasteboardError> {
        Ok(self.legacy.clone())
    }

    fn file_promises(&self) -> Result<Vec<Arc<dyn FilePromise>>, PasteboardError> {
        Ok(self.promises.clone())
    }
}
