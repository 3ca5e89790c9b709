//! Delivery contexts for subscriber-visible mutations.
//!
//! Sensor readings are produced on a timer task, but the state that views
//! observe (current heartbeat, score) may only be mutated from one serialized
//! context. Producers hand work to a [`DeliveryContext`] instead of touching
//! that state directly.
//!
//! Two contexts are provided:
//! - [`SerialContext`]: a FIFO queue drained by a single [`SerialRunner`].
//!   The task that drives the runner *is* the delivery context.
//! - [`ImmediateContext`]: runs jobs inline on the calling thread. Useful in
//!   tests where the caller wants deliveries to happen synchronously.

use log::{debug, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A unit of work handed to a delivery context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A serialized execution context that runs jobs in dispatch order.
pub trait DeliveryContext: Send + Sync {
    /// Hand a job to the context. Never blocks.
    fn dispatch(&self, job: Job);
}

/// Runs every job immediately on the dispatching thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateContext;

impl DeliveryContext for ImmediateContext {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Sending half of a serial delivery queue.
#[derive(Clone)]
pub struct SerialContext {
    tx: UnboundedSender<Job>,
}

/// Receiving half of a serial delivery queue.
///
/// Exactly one runner exists per queue, so at most one job is in flight and
/// jobs run in the order they were dispatched.
pub struct SerialRunner {
    rx: UnboundedReceiver<Job>,
}

/// Create a serial delivery queue.
pub fn serial_context() -> (SerialContext, SerialRunner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SerialContext { tx }, SerialRunner { rx })
}

impl DeliveryContext for SerialContext {
    fn dispatch(&self, job: Job) {
        if self.tx.send(job).is_err() {
            // Runner is gone; nobody is left to observe the result.
            warn!("[Delivery] runner dropped, discarding job");
        }
    }
}

impl SerialRunner {
    /// Run jobs until every [`SerialContext`] handle has been dropped.
    pub async fn run(&mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
        debug!("[Delivery] all senders closed, runner exiting");
    }

    /// Run every job that is already queued, without waiting for more.
    ///
    /// Returns the number of jobs executed.
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            count += 1;
        }
        count
    }
}
