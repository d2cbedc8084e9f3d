//! DropCoordinator: the end-to-end flow for one drop gesture
//!
//! Phases: Idle → Classifying → Enriching → Finalizing → Idle
//!
//! Classifying runs on the caller's (UI) thread because the pasteboard is
//! only readable inside the drop callback. Enriching and Finalizing run on
//! the tokio runtime. The finished batch travels back over a channel and is
//! delivered by whoever owns the message sink, on the UI thread.

use super::classify::{Classification, DragPasteboard, PayloadClassifier, PayloadKind};
use super::dedup::PathDeduplicator;
use super::enrich::ItemEnricher;
use super::materialize::{unique_drop_destination, FilePromise, PromiseMaterializer};
use crate::access::SecurityScope;
use crate::channel::{MessageSink, MethodCall};
use crate::config::DropConfig;
use crate::error::DropResult;
use crate::model::{DropBatch, DropPoint};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use uuid::Uuid;

/// Where a drop run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropPhase {
    Idle,
    Classifying,
    Enriching,
    Finalizing,
}

/// Caller-side handle on one drop run.
#[derive(Debug, Clone)]
pub struct DropTicket {
    pub id: Uuid,
    /// Count announced in `dropReceived`
    pub item_count: usize,
    phase: watch::Receiver<DropPhase>,
}

impl DropTicket {
    pub fn phase(&self) -> DropPhase {
        *self.phase.borrow()
    }

    /// Wait until the batch has been delivered and the run is back to Idle.
    pub async fn wait_idle(&mut self) {
        // A closed channel means the run was torn down, which is idle too.
        let _ = self.phase.wait_for(|phase| *phase == DropPhase::Idle).await;
    }
}

/// A finished batch waiting to be delivered on the UI thread.
#[derive(Debug)]
pub struct CompletedDrop {
    pub batch: DropBatch,
    phase: watch::Sender<DropPhase>,
    in_flight: Arc<DashMap<Uuid, DropPhase>>,
}

impl CompletedDrop {
    /// Send `performOperation` with the batch's items and return the run to Idle.
    pub fn deliver(self, sink: &mut dyn MessageSink) -> DropBatch {
        sink.invoke_method(MethodCall::perform_operation(&self.batch.items));
        self.phase.send_replace(DropPhase::Idle);
        self.in_flight.remove(&self.batch.id);
        tracing::debug!(drop_id = %self.batch.id, "batch delivered");
        self.batch
    }
}

enum RunWork {
    Concrete(Vec<PathBuf>),
    Promises {
        promises: Vec<Arc<dyn FilePromise>>,
        destination: PathBuf,
    },
    Empty,
}

/// State owned by one drop run. Nothing here is shared with other runs.
struct DropRun {
    id: Uuid,
    item_count: usize,
    location: DropPoint,
    enricher: Arc<ItemEnricher>,
    concurrency: usize,
    promise_timeout: Option<Duration>,
    phase: watch::Sender<DropPhase>,
    in_flight: Arc<DashMap<Uuid, DropPhase>>,
    completions: mpsc::UnboundedSender<CompletedDrop>,
}

impl DropRun {
    fn advance(&self, phase: DropPhase) {
        self.phase.send_replace(phase);
        self.in_flight.insert(self.id, phase);
        tracing::debug!(drop_id = %self.id, ?phase, "drop phase");
    }

    async fn execute(self, work: RunWork) {
        match work {
            RunWork::Concrete(paths) => self.enrich_concrete(paths).await,
            RunWork::Promises {
                promises,
                destination,
            } => {
                let report = PromiseMaterializer::new(self.enricher.clone())
                    .with_timeout(self.promise_timeout)
                    .materialize_all(promises, &destination)
                    .await;
                tracing::debug!(
                    drop_id = %self.id,
                    recorded = report.recorded,
                    duplicates = report.duplicates,
                    failed = report.failed,
                    "promises settled"
                );
            }
            RunWork::Empty => {}
        }

        // Every worker has joined; nothing else touches the item list now.
        self.advance(DropPhase::Finalizing);
        let items = self.enricher.dedup().take_recorded();
        tracing::info!(
            drop_id = %self.id,
            announced = self.item_count,
            delivered = items.len(),
            "drop finalized"
        );

        let completed = CompletedDrop {
            batch: DropBatch {
                id: self.id,
                item_count: self.item_count,
                drop_location: self.location,
                items,
            },
            phase: self.phase,
            in_flight: self.in_flight.clone(),
        };
        if let Err(mpsc::error::SendError(orphan)) = self.completions.send(completed) {
            tracing::warn!(drop_id = %self.id, "surface detached; batch discarded");
            orphan.phase.send_replace(DropPhase::Idle);
            self.in_flight.remove(&self.id);
        }
    }

    async fn enrich_concrete(&self, paths: Vec<PathBuf>) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for path in paths {
            let enricher = self.enricher.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let joined =
                    tokio::task::spawn_blocking(move || enricher.enrich_and_record(&path, false))
                        .await;
                if let Err(e) = joined {
                    tracing::warn!(error = %e, "enrichment task panicked");
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(drop_id = %self.id, error = %e, "enrichment task aborted");
            }
        }
    }
}

/// Owns the drop flow: classify, announce, enrich, hand back.
///
/// Each `begin_drop` starts an independent run with its own deduplicator
/// and scratch directory. Runs may overlap.
pub struct DropCoordinator {
    config: DropConfig,
    scope: Arc<dyn SecurityScope>,
    runtime: Handle,
    completions: mpsc::UnboundedSender<CompletedDrop>,
    in_flight: Arc<DashMap<Uuid, DropPhase>>,
}

impl DropCoordinator {
    /// Create a coordinator that runs background work on `runtime`.
    ///
    /// Returns the receiving end for finished batches; the UI side drains it.
    pub fn new(
        config: DropConfig,
        scope: Arc<dyn SecurityScope>,
        runtime: Handle,
    ) -> DropResult<(Self, mpsc::UnboundedReceiver<CompletedDrop>)> {
        config.validate()?;
        let (completions, receiver) = mpsc::unbounded_channel();
        Ok((
            Self {
                config,
                scope,
                runtime,
                completions,
                in_flight: Arc::new(DashMap::new()),
            },
            receiver,
        ))
    }

    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    /// Number of runs that have not been delivered yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Current phase of an undelivered run.
    pub fn phase_of(&self, id: &Uuid) -> Option<DropPhase> {
        self.in_flight.get(id).map(|entry| *entry.value())
    }

    /// Start a drop run.
    ///
    /// Classifies `pasteboard` synchronously, so this must be called from
    /// inside the drop callback. Returns the ticket and the `dropReceived`
    /// call, which the caller sends before anything else for this drop.
    pub fn begin_drop(
        &self,
        pasteboard: &dyn DragPasteboard,
        location: DropPoint,
    ) -> (DropTicket, MethodCall) {
        let id = Uuid::new_v4();
        let (phase_tx, phase_rx) = watch::channel(DropPhase::Classifying);
        self.in_flight.insert(id, DropPhase::Classifying);

        let Classification { kind, item_count } = PayloadClassifier::classify(pasteboard);
        tracing::info!(drop_id = %id, kind = kind.label(), item_count, "drop received");

        let work = match kind {
            PayloadKind::ConcreteRefs(paths) => RunWork::Concrete(paths),
            PayloadKind::Promises(promises) => RunWork::Promises {
                promises,
                destination: unique_drop_destination(&self.config.scratch_base()),
            },
            PayloadKind::Empty => RunWork::Empty,
        };

        let run = DropRun {
            id,
            item_count,
            location,
            enricher: Arc::new(ItemEnricher::new(
                self.config.sandbox_roots(),
                self.scope.clone(),
                Arc::new(PathDeduplicator::new()),
            )),
            concurrency: self.config.enrich_concurrency,
            promise_timeout: self.config.promise_timeout(),
            phase: phase_tx,
            in_flight: self.in_flight.clone(),
            completions: self.completions.clone(),
        };
        run.advance(DropPhase::Enriching);
        self.runtime.spawn(run.execute(work));

        let ticket = DropTicket {
            id,
            item_count,
            phase: phase_rx,
        };
        (ticket, MethodCall::drop_received(item_count, location))
    }
}
