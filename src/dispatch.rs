//! Serial dispatch queue for playerkit
//!
//! All engine signals, seek completions, and animation completions are
//! re-dispatched onto one UI-affine serial queue before they touch player or
//! session state. Jobs run FIFO relative to enqueue time; no two jobs run
//! concurrently with each other or with user-gesture handling.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

type Job = Box<dyn FnOnce() + Send>;

/// Serial FIFO job queue
///
/// The owner of the UI context pumps the queue with [`Dispatcher::drain`];
/// producers enqueue from anywhere with [`Dispatcher::post`].
pub struct Dispatcher {
    tx: Sender<Job>,
    rx: Receiver<Job>,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new() -> Arc<Self> {
        let (tx, rx) = unbounded();
        Arc::new(Self { tx, rx })
    }

    /// Enqueue a job to run on the next drain
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        // The receiver lives as long as the dispatcher, so send cannot fail.
        let _ = self.tx.send(Box::new(job));
    }

    /// Run queued jobs until the queue is empty, returning how many ran
    ///
    /// Jobs enqueued by running jobs are drained in the same call.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Number of jobs currently waiting
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
