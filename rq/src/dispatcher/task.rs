//! Task and result hand-off between producers and the dispatch loop

use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use super::error::DispatchError;
use super::transport::Transport;

/// Outcome delivered for one task
pub type TaskResult<T> = Result<<T as Transport>::Response, <T as Transport>::Error>;

/// A queued unit of work: the request plus the sender for its single result
pub struct Task<T: Transport> {
    id: Uuid,
    request: T::Request,
    reply_tx: oneshot::Sender<TaskResult<T>>,
}

impl<T: Transport> Task<T> {
    /// Create a task and the producer-side handle that will receive its result
    pub fn new(request: T::Request) -> (Self, Pending<T>) {
        let id = Uuid::now_v7();
        let (reply_tx, reply_rx) = oneshot::channel();
        debug!(%id, "Task::new: called");
        (Self { id, request, reply_tx }, Pending { id, reply_rx })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Split into the request to execute and a completion slot
    pub fn into_parts(self) -> (T::Request, Completion<T>) {
        (
            self.request,
            Completion {
                id: self.id,
                reply_tx: self.reply_tx,
            },
        )
    }
}

/// Write side of a task's result channel, consumed by the single delivery
pub struct Completion<T: Transport> {
    id: Uuid,
    reply_tx: oneshot::Sender<TaskResult<T>>,
}

impl<T: Transport> Completion<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Deliver the result. Never blocks; returns false when the producer has
    /// already stopped waiting.
    pub fn complete(self, result: TaskResult<T>) -> bool {
        match self.reply_tx.send(result) {
            Ok(()) => true,
            Err(_) => {
                debug!(id = %self.id, "Completion::complete: receiver dropped, result discarded");
                false
            }
        }
    }
}

/// Producer-side handle for a submitted task
pub struct Pending<T: Transport> {
    id: Uuid,
    reply_rx: oneshot::Receiver<TaskResult<T>>,
}

impl<T: Transport> Pending<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the task's result
    ///
    /// There is no built-in timeout. Wrap this in `tokio::time::timeout` when
    /// the dispatcher may be closed with the task still queued.
    pub async fn wait(self) -> Result<T::Response, DispatchError<T::Error>> {
        debug!(id = %self.id, "Pending::wait: called");
        match self.reply_rx.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(DispatchError::Transport(e)),
            Err(_) => {
                debug!(id = %self.id, "Pending::wait: task dropped without a result");
                Err(DispatchError::Dropped)
            }
        }
    }
}
