//! Dispatcher implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Notify, watch};
use tracing::{debug, error, info, warn};

use crate::priority::Priority;
use crate::queue::{QueueEntry, QueueSnapshot, WeightedPriorityQueue};

use super::config::DispatcherConfig;
use super::error::DispatchError;
use super::limiter::RateLimiter;
use super::task::{Pending, Task};
use super::transport::Transport;

/// Lifecycle of the dispatch loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherState {
    Running,
    Stopped,
}

/// Counters for the dispatcher
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub submitted: u64,
    pub rejected: u64,
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Results produced after the producer stopped waiting
    pub abandoned: u64,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    rejected: AtomicU64,
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    abandoned: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// State shared by producers and the dispatch loop
struct Shared<T: Transport> {
    queue: WeightedPriorityQueue<Task<T>>,
    /// Signalled on every push
    work_ready: Notify,
    shutdown_tx: watch::Sender<bool>,
    state_tx: watch::Sender<DispatcherState>,
    max_queue_depth: Option<usize>,
    counters: Counters,
}

impl<T: Transport> Shared<T> {
    /// Suspend until at least one task is queued
    async fn wait_for_work(&self) {
        loop {
            if !self.queue.is_empty() {
                return;
            }
            // A push between the check and this await leaves a permit behind
            self.work_ready.notified().await;
        }
    }

    async fn dispatch(&self, transport: &T, entry: QueueEntry<Task<T>>) {
        let priority = entry.priority;
        let waited = entry.enqueued_at.elapsed();
        let (request, completion) = entry.into_item().into_parts();
        let id = completion.id();

        debug!(%id, %priority, request = %transport.describe(&request), ?waited, "Dispatcher: executing");
        Counters::bump(&self.counters.dispatched);

        let result = transport.execute(request).await;
        match &result {
            Ok(_) => {
                debug!(%id, %priority, "Dispatcher: request succeeded");
                Counters::bump(&self.counters.succeeded);
            }
            Err(e) => {
                warn!(%id, %priority, error = %e, "Dispatcher: request failed");
                Counters::bump(&self.counters.failed);
            }
        }

        if !completion.complete(result) {
            Counters::bump(&self.counters.abandoned);
        }
    }
}

/// Resolves once shutdown has been requested
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

/// The single loop draining the queue at the limiter's pace
async fn run_loop<T: Transport>(
    shared: Arc<Shared<T>>,
    transport: T,
    limiter: Arc<dyn RateLimiter>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!("Dispatcher loop started");

    loop {
        // Idle until there is work; no token is spent on an empty queue
        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => {
                debug!("run_loop: shutdown while idle");
                break;
            }
            _ = shared.wait_for_work() => {}
        }

        let token = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => {
                debug!("run_loop: shutdown while waiting for a token");
                break;
            }
            token = limiter.take() => token,
        };

        if let Err(e) = token {
            error!(error = %e, "Rate limiter failed, stopping dispatcher");
            break;
        }

        let entry = match shared.queue.pop() {
            Ok(entry) => entry,
            Err(e) if e.is_recoverable() => {
                debug!(error = %e, "run_loop: nothing to pop, skipping iteration");
                continue;
            }
            Err(e) => {
                error!(error = %e, "Queue invariant violated, stopping dispatcher");
                break;
            }
        };

        shared.dispatch(&transport, entry).await;
    }

    shared.state_tx.send_replace(DispatcherState::Stopped);
    info!(abandoned_in_queue = shared.queue.len(), "Dispatcher loop stopped");
}

/// Paces requests through a weighted priority queue to a transport
///
/// Producers call [`Dispatcher::submit`] (or [`Dispatcher::enqueue`] and
/// [`Pending::wait`]) from any number of tasks; one background loop executes
/// the requests serially at the configured rate. Requests still queued when
/// [`Dispatcher::close`] is called are never executed, and their producers
/// keep waiting until the dispatcher itself is dropped.
pub struct Dispatcher<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Dispatcher<T> {
    /// Build the limiter described by `config` and start the dispatch loop
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &DispatcherConfig, transport: T) -> Result<Self, DispatchError<T::Error>> {
        debug!(?config, "Dispatcher::start: called");
        config.validate().map_err(DispatchError::Config)?;
        let limiter = config
            .limiter
            .build(config.rate_limit_per_sec)
            .map_err(|e| DispatchError::Config(e.to_string()))?;
        Self::with_limiter(config, transport, limiter)
    }

    /// Start the dispatch loop with a caller-supplied limiter
    ///
    /// `config.limiter` and `config.rate_limit_per_sec` are ignored.
    pub fn with_limiter(
        config: &DispatcherConfig,
        transport: T,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self, DispatchError<T::Error>> {
        debug!(?config, "Dispatcher::with_limiter: called");
        if config.max_queue_depth == Some(0) {
            return Err(DispatchError::Config("max-queue-depth must be at least 1 when set".to_string()));
        }
        let queue = WeightedPriorityQueue::new(config.weights).map_err(|e| DispatchError::Config(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, _) = watch::channel(DispatcherState::Running);

        let shared = Arc::new(Shared {
            queue,
            work_ready: Notify::new(),
            shutdown_tx,
            state_tx,
            max_queue_depth: config.max_queue_depth,
            counters: Counters::default(),
        });

        tokio::spawn(run_loop(Arc::clone(&shared), transport, limiter, shutdown_rx));

        info!(
            max_queue_depth = ?config.max_queue_depth,
            weights = ?config.weights,
            "Dispatcher started"
        );
        Ok(Self { shared })
    }

    /// Queue a request and return the handle its result will arrive on
    ///
    /// Never waits. Fails with `Closed` after [`Dispatcher::close`] and with
    /// `QueueFull` when a max queue depth is configured and reached.
    pub fn enqueue(&self, request: T::Request, priority: Priority) -> Result<Pending<T>, DispatchError<T::Error>> {
        debug!(%priority, "Dispatcher::enqueue: called");
        if self.is_closed() {
            debug!(%priority, "Dispatcher::enqueue: closed, rejecting");
            Counters::bump(&self.shared.counters.rejected);
            return Err(DispatchError::Closed);
        }

        let (task, pending) = Task::new(request);
        match self.shared.max_queue_depth {
            Some(limit) => {
                if let Err(e) = self.shared.queue.push_bounded(task, priority, limit) {
                    debug!(%priority, error = %e, "Dispatcher::enqueue: rejected");
                    Counters::bump(&self.shared.counters.rejected);
                    return Err(DispatchError::QueueFull { limit });
                }
            }
            None => self.shared.queue.push(task, priority),
        }

        Counters::bump(&self.shared.counters.submitted);
        self.shared.work_ready.notify_one();
        Ok(pending)
    }

    /// Queue a request and wait for its result
    pub async fn submit(&self, request: T::Request, priority: Priority) -> Result<T::Response, DispatchError<T::Error>> {
        self.enqueue(request, priority)?.wait().await
    }

    /// Signal the loop to stop after its current iteration
    ///
    /// Does not wait and does not drain the queue. Calling it again is a no-op.
    pub fn close(&self) {
        let was_closed = self.shared.shutdown_tx.send_replace(true);
        if !was_closed {
            info!(queued = self.shared.queue.len(), "Dispatcher close requested");
        }
    }

    /// Whether close has been requested
    pub fn is_closed(&self) -> bool {
        *self.shared.shutdown_tx.borrow()
    }

    pub fn state(&self) -> DispatcherState {
        *self.shared.state_tx.borrow()
    }

    /// Wait until the loop has stopped
    pub async fn stopped(&self) {
        let mut state_rx = self.shared.state_tx.subscribe();
        while *state_rx.borrow_and_update() != DispatcherState::Stopped {
            if state_rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.shared.counters.snapshot()
    }

    /// Number of requests waiting to be dispatched
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        self.shared.queue.snapshot()
    }
}

impl<T: Transport> Drop for Dispatcher<T> {
    fn drop(&mut self) {
        self.shared.shutdown_tx.send_replace(true);
    }
}
