//! Segment worker pool.
//!
//! Jobs are pulled from a shared queue by a fixed number of workers. Each
//! finished job is written into the slot matching its item index, so the
//! order of completion never affects the order of assembly.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

use slidereel_media::{render_segment, SegmentSettings, ToolGateway};
use slidereel_models::{AssemblyDescriptor, SegmentJob};

use crate::error::{PipelineError, WorkerResult};
use crate::logging::ItemLogger;

/// Cancellation flag shared by the pool, its workers and the binary.
///
/// Raising it stops workers from starting new jobs; jobs already running are
/// left to finish.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Raise the flag. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

/// Runs segment jobs with bounded parallelism.
pub struct SegmentWorkerPool {
    gateway: Arc<dyn ToolGateway>,
    settings: Arc<SegmentSettings>,
    workers: usize,
    cancel: CancelToken,
}

type JobQueue = Arc<Mutex<VecDeque<SegmentJob>>>;
type ResultSlots = Arc<Vec<OnceLock<SegmentJob>>>;

impl SegmentWorkerPool {
    /// Create a pool with `workers` workers (at least one).
    pub fn new(
        gateway: Arc<dyn ToolGateway>,
        settings: SegmentSettings,
        workers: usize,
        cancel: CancelToken,
    ) -> Self {
        Self {
            gateway,
            settings: Arc::new(settings),
            workers: workers.max(1),
            cancel,
        }
    }

    /// Run every job and return the segments ordered by item index.
    ///
    /// The first failure raises the cancellation flag: queued jobs are not
    /// started, running jobs finish, and the failure is returned once every
    /// worker has stopped.
    pub async fn run(&self, jobs: Vec<SegmentJob>) -> WorkerResult<AssemblyDescriptor> {
        let total = jobs.len();
        let workers = self.workers.min(total).max(1);
        info!(jobs = total, workers, "Starting segment jobs");

        let slots: ResultSlots = Arc::new((0..total).map(|_| OnceLock::new()).collect());
        let queue: JobQueue = Arc::new(Mutex::new(jobs.into()));

        let mut set = JoinSet::new();
        for worker in 0..workers {
            let gateway = Arc::clone(&self.gateway);
            let settings = Arc::clone(&self.settings);
            let queue = Arc::clone(&queue);
            let slots = Arc::clone(&slots);
            let cancel = self.cancel.clone();
            set.spawn(
                run_worker(worker, gateway, settings, queue, slots, cancel).in_current_span(),
            );
        }

        let mut first_error: Option<PipelineError> = None;
        while let Some(joined) = set.join_next().await {
            let result = joined
                .map_err(|e| PipelineError::internal(format!("segment worker panicked: {e}")))
                .and_then(|r| r);
            if let Err(e) = result {
                self.cancel.cancel();
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    debug!(error = %e, "Additional segment failure");
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        if self.cancel.is_cancelled() && !queue.lock().await.is_empty() {
            warn!("Segment jobs cancelled before completion");
            return Err(PipelineError::Cancelled);
        }

        let descriptor = AssemblyDescriptor::from_slots(
            slots
                .iter()
                .map(|slot| slot.get().map(|job| job.output_path().to_path_buf())),
        )
        .map_err(|index| PipelineError::MissingSegment { index })?;

        info!(segments = descriptor.len(), "All segment jobs completed");
        Ok(descriptor)
    }
}

async fn run_worker(
    worker: usize,
    gateway: Arc<dyn ToolGateway>,
    settings: Arc<SegmentSettings>,
    queue: JobQueue,
    slots: ResultSlots,
    cancel: CancelToken,
) -> WorkerResult<()> {
    let cancelled = cancel.subscribe();
    loop {
        if *cancelled.borrow() {
            debug!(worker, "Cancellation observed, worker stopping");
            return Ok(());
        }

        let Some(job) = queue.lock().await.pop_front() else {
            return Ok(());
        };

        let logger = ItemLogger::new(job.item());
        logger.log_start(worker);

        let result = render_segment(gateway.as_ref(), &job, &settings)
            .instrument(logger.create_span())
            .await;

        match result {
            Ok(segment) => {
                logger.log_completion(&segment);
                let index = job.index();
                let slot = slots
                    .get(index)
                    .ok_or_else(|| PipelineError::internal(format!("no result slot for item {index}")))?;
                slot.set(job.complete())
                    .map_err(|_| PipelineError::internal(format!("result slot {index} written twice")))?;
            }
            Err(e) => {
                logger.log_error(&e, e.tool_output());
                cancel.cancel();
                let job = job.fail();
                return Err(PipelineError::job_failed(
                    job.index(),
                    job.item().path(),
                    e,
                ));
            }
        }
    }
}
