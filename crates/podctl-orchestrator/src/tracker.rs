//! Task completion tracking
//!
//! The tracker subscribes to change batches for a set of tasks and blocks
//! until every task has reached a terminal state. It never polls: each
//! iteration waits on the control plane's change stream, then advances a
//! version cursor past the batch it just handled.
//!
//! # Failure model
//!
//! The first task observed in the Error state ends the wait immediately with
//! that task's fault. Sibling tasks are neither awaited nor cancelled; they
//! keep running on the control plane. The same applies when the optional
//! time bound expires or the caller cancels the wait.

use std::collections::HashSet;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use podctl_core::task::{TaskId, TaskState, Version};
use podctl_core::traits::{Scoped, TaskEvents, UpdateFilter};
use podctl_core::PodError;

/// Waits for remote tasks to finish
#[derive(Debug, Clone, Default)]
pub struct TaskTracker {
    /// Upper bound on a single wait; `None` waits indefinitely
    timeout: Option<Duration>,
    /// Interrupts any wait in progress when cancelled
    cancel: CancellationToken,
}

enum Interrupted {
    Cancelled,
    TimedOut(Duration),
}

impl TaskTracker {
    /// Create a tracker with no time bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every wait by `timeout` (`None` removes the bound)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abort waits when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fail fast once cancellation has been requested
    pub fn check_cancelled(&self) -> Result<(), PodError> {
        if self.cancel.is_cancelled() {
            return Err(PodError::Cancelled { pending: 0 });
        }
        Ok(())
    }

    /// Block until every task in `tasks` succeeds, or report the first failure.
    ///
    /// The subscription is scoped to this call and released on every exit
    /// path.
    pub async fn await_all<C: TaskEvents>(&self, conn: &C, tasks: &[TaskId]) -> Result<(), PodError> {
        if tasks.is_empty() {
            return Ok(());
        }

        let mut pending: HashSet<TaskId> = tasks.iter().cloned().collect();
        let mut filter = Scoped::new(conn.create_filter(tasks).await?);
        tracing::debug!("Waiting for {} task(s): {:?}", pending.len(), tasks);

        let outcome = {
            let deadline = async {
                match self.timeout {
                    Some(limit) => {
                        tokio::time::sleep(limit).await;
                        limit
                    }
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
                result = drain_until_terminal(&mut *filter, &mut pending) => Ok(result),
                limit = deadline => Err(Interrupted::TimedOut(limit)),
            }
        };
        filter.release();

        match outcome {
            Ok(result) => result,
            Err(Interrupted::Cancelled) => {
                tracing::warn!("Stopped waiting for {} task(s): cancelled", pending.len());
                Err(PodError::Cancelled {
                    pending: pending.len(),
                })
            }
            Err(Interrupted::TimedOut(after)) => {
                tracing::warn!(
                    "Gave up waiting for {} task(s) after {:?}",
                    pending.len(),
                    after
                );
                Err(PodError::Timeout {
                    pending: pending.len(),
                    after,
                })
            }
        }
    }
}

/// Consume change batches until `pending` is empty or a task fails
async fn drain_until_terminal<F: UpdateFilter>(
    filter: &mut F,
    pending: &mut HashSet<TaskId>,
) -> Result<(), PodError> {
    let mut version: Option<Version> = None;

    while !pending.is_empty() {
        let update = filter.wait_for_updates(version.as_ref()).await?;

        for object in &update.objects {
            for change in &object.changes {
                // Already finished or never tracked; a second path reporting
                // the same transition lands here too.
                if !pending.contains(&object.task) {
                    break;
                }
                match change.task_state() {
                    Some(TaskState::Success) => {
                        tracing::debug!("Task {} succeeded", object.task);
                        pending.remove(&object.task);
                    }
                    Some(TaskState::Error(fault)) => {
                        tracing::warn!("Task {} failed: {}", object.task, fault);
                        return Err(PodError::RemoteTask {
                            task: object.task.clone(),
                            fault: fault.clone(),
                        });
                    }
                    Some(TaskState::Queued | TaskState::Running) | None => {}
                }
            }
        }

        version = Some(update.version);
    }

    Ok(())
}
