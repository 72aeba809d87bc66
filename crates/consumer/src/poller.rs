//! The receive / dispatch / acknowledge loop.
//!
//! [`Poller`] owns the running flag. [`Poller::start`] spawns a single
//! background task that repeatedly long-polls the queue, dispatches each
//! received message in order and deletes it. [`Poller::stop`] clears the
//! flag; the loop notices at the top of its next iteration, so an in-flight
//! receive and the batch it returns are always completed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::PollerConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::queue::{QueueClient, RawMessage, ReceiveRequest};

// ---------------------------------------------------------------------------
// IterationReport
// ---------------------------------------------------------------------------

/// Counters for one receive/process/acknowledge iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationReport {
    /// The receive call itself failed.
    pub receive_failed: bool,
    pub received: usize,
    pub deleted: usize,
    pub delete_failed: usize,
    pub handled: usize,
    pub malformed: usize,
    pub unknown: usize,
    pub failed: usize,
}

impl IterationReport {
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Handled { .. } => self.handled += 1,
            DispatchOutcome::Malformed => self.malformed += 1,
            DispatchOutcome::UnknownType(_) => self.unknown += 1,
            DispatchOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Loop task bookkeeping, guarded so start and loop exit cannot interleave.
#[derive(Default)]
struct LoopState {
    handle: Option<JoinHandle<()>>,
    active: bool,
}

/// Long-running queue consumer.
pub struct Poller {
    queue: Arc<dyn QueueClient>,
    dispatcher: Dispatcher,
    config: PollerConfig,
    running: AtomicBool,
    wake: Notify,
    state: Mutex<LoopState>,
}

impl Poller {
    pub fn new(queue: Arc<dyn QueueClient>, dispatcher: Dispatcher, config: PollerConfig) -> Self {
        Self {
            queue,
            dispatcher,
            config,
            running: AtomicBool::new(false),
            wake: Notify::new(),
            state: Mutex::new(LoopState::default()),
        }
    }

    /// Whether polling is enabled.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Enable polling and spawn the loop task.
    ///
    /// Returns `false` without doing anything if already running. If a
    /// previous loop is still finishing its last iteration after
    /// [`stop`](Self::stop), that loop resumes instead of a second one
    /// being spawned.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut state = self.lock_state();

        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("Poller already running");
            return false;
        }

        tracing::info!(
            max_messages = self.config.max_messages,
            wait_secs = self.config.wait_time.as_secs(),
            "Starting queue polling"
        );

        let crashed = state.handle.as_ref().is_some_and(JoinHandle::is_finished);
        if !state.active || crashed {
            state.active = true;
            state.handle = Some(tokio::spawn(Arc::clone(self).run()));
        }
        true
    }

    /// Disable polling.
    ///
    /// Does not interrupt an in-flight receive; the loop exits before
    /// issuing the next one. Cuts a pending error backoff short.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::info!("Stopping queue polling");
        }
        self.wake.notify_waiters();
    }

    /// Wait up to `timeout` for the loop task to exit after [`stop`](Self::stop).
    ///
    /// Returns `true` if no loop task remains.
    pub async fn join(&self, timeout: Duration) -> bool {
        let handle = self.lock_state().handle.take();
        let Some(handle) = handle else {
            return true;
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Poller task ended abnormally");
                true
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Poller did not stop within timeout"
                );
                false
            }
        }
    }

    /// The loop body, run until the running flag is cleared.
    async fn run(self: Arc<Self>) {
        loop {
            if !self.should_continue() {
                break;
            }

            let report = self.run_once().await;

            if report.receive_failed {
                let woken = self.wake.notified();
                tokio::pin!(woken);
                woken.as_mut().enable();
                if !self.is_running() {
                    continue;
                }
                tokio::select! {
                    _ = tokio::time::sleep(self.config.error_backoff) => {}
                    _ = woken => {}
                }
            }
        }
        tracing::info!("Queue polling stopped");
    }

    /// Check the running flag at an iteration boundary.
    ///
    /// The exit decision is made under the state lock so a concurrent
    /// [`start`](Self::start) either sees the loop gone or the loop sees
    /// the flag set again.
    fn should_continue(&self) -> bool {
        if self.is_running() {
            return true;
        }
        let mut state = self.lock_state();
        if self.is_running() {
            return true;
        }
        state.active = false;
        false
    }

    /// Perform one receive and process the returned batch.
    ///
    /// Messages are dispatched and deleted one at a time, in the order the
    /// queue returned them. Every received message gets exactly one delete
    /// attempt whatever its dispatch outcome.
    pub async fn run_once(&self) -> IterationReport {
        let mut report = IterationReport::default();
        let request = ReceiveRequest::from(&self.config);

        let messages = match self.queue.receive_batch(&request).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backoff_secs = self.config.error_backoff.as_secs(),
                    "Error polling messages from queue"
                );
                report.receive_failed = true;
                return report;
            }
        };

        report.received = messages.len();
        if messages.is_empty() {
            return report;
        }

        for message in &messages {
            let outcome = self.dispatcher.dispatch(message).await;
            report.record(&outcome);
            if self.acknowledge(message).await {
                report.deleted += 1;
            } else {
                report.delete_failed += 1;
            }
        }

        tracing::debug!(
            received = report.received,
            handled = report.handled,
            malformed = report.malformed,
            unknown = report.unknown,
            failed = report.failed,
            delete_failed = report.delete_failed,
            "Batch processed"
        );
        report
    }

    /// Delete a processed message. Failures are logged; the queue will
    /// redeliver after its visibility timeout.
    async fn acknowledge(&self, message: &RawMessage) -> bool {
        match self.queue.delete_message(&message.receipt_handle).await {
            Ok(()) => {
                tracing::debug!(message_id = message.id_for_log(), "Message deleted from queue");
                true
            }
            Err(e) => {
                tracing::error!(
                    message_id = message.id_for_log(),
                    error = %e,
                    "Error deleting message from queue"
                );
                false
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
