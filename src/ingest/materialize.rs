//! Promise materialization
//!
//! A file promise is a sender-side deferred file: it has to be written into
//! a destination directory before it can be enriched. Each promise runs as
//! its own task; `materialize_all` is the join point that returns once every
//! promise has resolved or failed.

use super::enrich::ItemEnricher;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Why a single promise produced no file.
#[derive(Debug, Error)]
pub enum PromiseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer cancelled by sender")]
    Cancelled,

    #[error("promise did not resolve within {0:?}")]
    TimedOut(Duration),

    #[error("{0}")]
    Other(String),
}

/// A deferred file reference from the drag source.
#[async_trait]
pub trait FilePromise: Send + Sync {
    /// Short label for logs (usually the promised file name).
    fn describe(&self) -> String;

    /// Write the promised file into `destination` and return its path.
    async fn receive(&self, destination: &Path) -> Result<PathBuf, PromiseError>;
}

impl std::fmt::Debug for dyn FilePromise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FilePromise({})", self.describe())
    }
}

/// A promise fulfilled by copying an existing local file.
#[derive(Debug, Clone)]
pub struct CopyFilePromise {
    source: PathBuf,
}

impl CopyFilePromise {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[async_trait]
impl FilePromise for CopyFilePromise {
    fn describe(&self) -> String {
        self.source.display().to_string()
    }

    async fn receive(&self, destination: &Path) -> Result<PathBuf, PromiseError> {
        let name = self.source.file_name().ok_or_else(|| {
            PromiseError::Other(format!("{} has no file name", self.source.display()))
        })?;
        let target = destination.join(name);
        tokio::fs::copy(&self.source, &target).await?;
        Ok(target)
    }
}

/// Create a fresh destination directory for one drop's promises.
///
/// Named `<yyyyMMdd_HHmmss_SSS>Z-<8 hex>` under `base`; the random suffix
/// keeps two drops in the same millisecond apart. A creation failure is
/// logged and the path returned anyway, so each promise reports its own
/// I/O error.
pub fn unique_drop_destination(base: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3fZ");
    let suffix = Uuid::new_v4().simple().to_string();
    let destination = base.join(format!("{}-{}", stamp, &suffix[..8]));
    if let Err(e) = std::fs::create_dir_all(&destination) {
        tracing::warn!(
            destination = %destination.display(),
            error = %e,
            "failed to create drop destination"
        );
    }
    destination
}

/// Tally of one `materialize_all` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Promises that produced a descriptor
    pub recorded: usize,
    /// Promises whose path was already in the batch
    pub duplicates: usize,
    /// Promises that failed, timed out, or panicked
    pub failed: usize,
}

enum PromiseOutcome {
    Recorded,
    Duplicate,
    Failed,
}

/// Drives file promises to disk and enriches what they produce.
pub struct PromiseMaterializer {
    enricher: Arc<ItemEnricher>,
    timeout: Option<Duration>,
}

impl PromiseMaterializer {
    pub fn new(enricher: Arc<ItemEnricher>) -> Self {
        Self {
            enricher,
            timeout: None,
        }
    }

    /// Bound each promise's resolution time; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve every promise into `destination`, recording descriptors in the
    /// enricher's deduplicator. Returns after all promises have settled.
    pub async fn materialize_all(
        &self,
        promises: Vec<Arc<dyn FilePromise>>,
        destination: &Path,
    ) -> MaterializeReport {
        let mut tasks = JoinSet::new();

        for promise in promises {
            let enricher = self.enricher.clone();
            let destination = destination.to_path_buf();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let label = promise.describe();
                let received = match timeout {
                    Some(limit) => {
                        match tokio::time::timeout(limit, promise.receive(&destination)).await {
                            Ok(result) => result,
                            Err(_) => Err(PromiseError::TimedOut(limit)),
                        }
                    }
                    None => promise.receive(&destination).await,
                };

                let path = match received {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!(promise = %label, error = %e, "file promise failed");
                        return PromiseOutcome::Failed;
                    }
                };

                match tokio::task::spawn_blocking(move || enricher.enrich_and_record(&path, true))
                    .await
                {
                    Ok(true) => PromiseOutcome::Recorded,
                    Ok(false) => PromiseOutcome::Duplicate,
                    Err(e) => {
                        tracing::warn!(promise = %label, error = %e, "promise enrichment panicked");
                        PromiseOutcome::Failed
                    }
                }
            });
        }

        let mut report = MaterializeReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(PromiseOutcome::Recorded) => report.recorded += 1,
                Ok(PromiseOutcome::Duplicate) => report.duplicates += 1,
                Ok(PromiseOutcome::Failed) => report.failed += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "promise task aborted");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
