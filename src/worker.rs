//! Background conversion worker.
//!
//! An interactive front end must not block while a batch runs. A
//! [`ConversionWorker`] runs one [`ConversionJob`] per
//! [`start`](ConversionWorker::start) on a dedicated thread and reports
//! through an unbounded `tokio::sync::mpsc` channel:
//!
//! ```text
//!   ConversionWorker::start ──► worker thread ──► job.run(converter)
//!                                    │
//!                   progress events  │  exactly one terminal event
//!                                    ▼
//!                              WorkerHandle  (try_recv / blocking_recv / recv)
//! ```
//!
//! Only one job runs at a time: `start` returns [`WorkerBusy`] while a job
//! is in flight. The busy flag is cleared and a terminal event
//! ([`WorkerEvent::Finished`] or [`WorkerEvent::Failed`]) is sent on every
//! exit path of the worker thread, panics included.
//!
//! There is no cancellation: once started, a job runs to completion.

use crate::convert::Converter;
use crate::error::{Img2PdfError, Result};
use crate::job::{ConversionJob, JobOutcome};
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

/// Returned by [`ConversionWorker::start`] while another job is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("A conversion is already running")]
pub struct WorkerBusy;

/// Messages from the worker thread, in the order they happen.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A merge or batch is about to process `total` inputs.
    Started { total: usize },
    ItemStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    ItemCompleted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// The item was skipped or failed; the job goes on.
    ItemFailed {
        index: usize,
        total: usize,
        path: PathBuf,
        error: String,
    },
    /// Terminal: the job produced output.
    Finished(JobOutcome),
    /// Terminal: the job failed as a whole.
    Failed(Img2PdfError),
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerEvent::Finished(_) | WorkerEvent::Failed(_))
    }

    /// Status line for this event, if it changes what the user should see.
    pub fn status_text(&self) -> Option<String> {
        match self {
            WorkerEvent::Started { total } => Some(format!("Converting {total} images...")),
            WorkerEvent::ItemStarted { index, total, path } => Some(format!(
                "Converting {index}/{total}: {}",
                file_name(path)
            )),
            WorkerEvent::ItemCompleted { .. } | WorkerEvent::ItemFailed { .. } => None,
            WorkerEvent::Finished(outcome) => Some(outcome.status_text()),
            WorkerEvent::Failed(_) => Some("Conversion failed".to_string()),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Worker ──────────────────────────────────────────────────────────────────

/// Runs at most one conversion job at a time off the calling thread.
#[derive(Debug, Clone, Default)]
pub struct ConversionWorker {
    busy: Arc<AtomicBool>,
}

impl ConversionWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn mark_busy(&self) {
        self.busy.store(true, Ordering::Release);
    }

    /// Start `job` on a new thread.
    ///
    /// Progress callbacks already configured on `converter` keep receiving
    /// events; the same events are also forwarded to the returned handle.
    pub fn start(
        &self,
        converter: Converter,
        job: ConversionJob,
    ) -> std::result::Result<WorkerHandle, WorkerBusy> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkerBusy);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let guard = RunGuard {
            busy: Arc::clone(&self.busy),
            tx: tx.clone(),
            outcome: None,
        };
        let forwarding = ChannelProgress {
            tx,
            inner: converter.config().progress_callback.clone(),
        };
        let converter = converter.with_progress_callback(Arc::new(forwarding));

        let spawned = thread::Builder::new()
            .name("img2pdf-worker".into())
            .spawn(move || {
                let mut guard = guard;
                debug!(?job, "Worker started");
                let result = panic::catch_unwind(AssertUnwindSafe(|| job.run(&converter)));
                guard.outcome = Some(match result {
                    Ok(Ok(outcome)) => WorkerEvent::Finished(outcome),
                    Ok(Err(e)) => WorkerEvent::Failed(e),
                    Err(_) => {
                        error!("Conversion worker panicked");
                        WorkerEvent::Failed(Img2PdfError::Internal(
                            "conversion worker panicked".into(),
                        ))
                    }
                });
            });

        // On spawn failure the closure, and the guard with it, is dropped
        // here, which still clears the flag and sends `Failed`.
        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to spawn conversion worker: {e}");
                None
            }
        };

        Ok(WorkerHandle { events: rx, thread })
    }
}

/// Clears the busy flag and sends the terminal event when dropped.
struct RunGuard {
    busy: Arc<AtomicBool>,
    tx: UnboundedSender<WorkerEvent>,
    outcome: Option<WorkerEvent>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let event = self.outcome.take().unwrap_or_else(|| {
            WorkerEvent::Failed(Img2PdfError::Internal(
                "conversion worker stopped without a result".into(),
            ))
        });
        // Clear before sending so a consumer reacting to the terminal event
        // can start the next job straight away.
        self.busy.store(false, Ordering::Release);
        let _ = self.tx.send(event);
    }
}

/// Progress callback that forwards every event onto the worker channel.
struct ChannelProgress {
    tx: UnboundedSender<WorkerEvent>,
    inner: Option<ProgressCallback>,
}

impl ConversionProgressCallback for ChannelProgress {
    fn on_batch_start(&self, total: usize) {
        if let Some(ref cb) = self.inner {
            cb.on_batch_start(total);
        }
        let _ = self.tx.send(WorkerEvent::Started { total });
    }

    fn on_item_start(&self, index: usize, total: usize, source: &Path) {
        if let Some(ref cb) = self.inner {
            cb.on_item_start(index, total, source);
        }
        let _ = self.tx.send(WorkerEvent::ItemStarted {
            index,
            total,
            path: source.to_path_buf(),
        });
    }

    fn on_item_complete(&self, index: usize, total: usize, source: &Path) {
        if let Some(ref cb) = self.inner {
            cb.on_item_complete(index, total, source);
        }
        let _ = self.tx.send(WorkerEvent::ItemCompleted {
            index,
            total,
            path: source.to_path_buf(),
        });
    }

    fn on_item_error(&self, index: usize, total: usize, source: &Path, error: &str) {
        if let Some(ref cb) = self.inner {
            cb.on_item_error(index, total, source, error);
        }
        let _ = self.tx.send(WorkerEvent::ItemFailed {
            index,
            total,
            path: source.to_path_buf(),
            error: error.to_string(),
        });
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        if let Some(ref cb) = self.inner {
            cb.on_batch_complete(total, success_count);
        }
    }
}

// ── Handle ──────────────────────────────────────────────────────────────────

/// Receiving end of one started job.
#[derive(Debug)]
pub struct WorkerHandle {
    events: UnboundedReceiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Next event without waiting. `None` when nothing is queued yet or
    /// the job is over and every event has been taken.
    ///
    /// Meant for polling from a UI loop.
    pub fn try_recv(&mut self) -> Option<WorkerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next event. `None` once the job is over and drained.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`recv`](Self::recv) there.
    pub fn blocking_recv(&mut self) -> Option<WorkerEvent> {
        self.events.blocking_recv()
    }

    /// Async variant of [`blocking_recv`](Self::blocking_recv).
    pub async fn recv(&mut self) -> Option<WorkerEvent> {
        self.events.recv().await
    }

    /// Block until the job ends and return its result, dropping progress
    /// events on the way.
    pub fn wait(mut self) -> Result<JobOutcome> {
        let mut terminal = None;
        while let Some(event) = self.events.blocking_recv() {
            match event {
                WorkerEvent::Finished(outcome) => terminal = Some(Ok(outcome)),
                WorkerEvent::Failed(e) => terminal = Some(Err(e)),
                _ => {}
            }
        }
        self.join();
        terminal.unwrap_or_else(|| {
            Err(Img2PdfError::Internal(
                "conversion worker ended without a result".into(),
            ))
        })
    }

    /// Wait for the worker thread to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!("Conversion worker thread panicked outside the job");
            }
        }
    }
}
