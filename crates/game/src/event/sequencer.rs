use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

type BoxedStep = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
type Thunk = Box<dyn FnOnce() -> BoxedStep + Send>;

struct Task {
    label: &'static str,
    thunk: Thunk,
}

#[derive(Default)]
struct Pipeline {
    pending: VecDeque<Task>,
    active: bool,
}

struct Shared {
    pipeline: Mutex<Pipeline>,
    idle: Notify,
    watchdog: Duration,
}

impl Shared {
    fn pipeline(&self) -> MutexGuard<'_, Pipeline> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Strict FIFO of visual operations with at most one active at a time.
///
/// A task that fails, panics or outlives the watchdog is logged and the
/// pipeline moves on to the next one. Nothing is ever reordered or dropped.
#[derive(Clone)]
pub struct Sequencer {
    shared: Arc<Shared>,
}

impl Sequencer {
    pub fn new(watchdog: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                pipeline: Mutex::new(Pipeline::default()),
                idle: Notify::new(),
                watchdog,
            }),
        }
    }

    /// Appends a task. The thunk is not invoked until every earlier task has
    /// settled. Must be called from within a Tokio runtime.
    pub fn add<F, Fut, E>(&self, label: &'static str, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let thunk: Thunk = Box::new(move || {
            Box::pin(async move { task().await.map_err(|e| e.to_string()) })
        });

        let start_drain = {
            let mut pipeline = self.shared.pipeline();
            pipeline.pending.push_back(Task { label, thunk });
            !std::mem::replace(&mut pipeline.active, true)
        };

        if start_drain {
            tokio::spawn(drain(Arc::clone(&self.shared)));
        }
    }

    pub fn pending(&self) -> usize {
        self.shared.pipeline().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        let pipeline = self.shared.pipeline();
        !pipeline.active && pipeline.pending.is_empty()
    }

    /// Resolves once the queue is empty and nothing is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

async fn drain(shared: Arc<Shared>) {
    loop {
        let next = {
            let mut pipeline = shared.pipeline();
            let next = pipeline.pending.pop_front();
            if next.is_none() {
                pipeline.active = false;
            }
            next
        };

        match next {
            Some(task) => run_task(task, shared.watchdog).await,
            None => {
                shared.idle.notify_waiters();
                return;
            }
        }
    }
}

async fn run_task(task: Task, watchdog: Duration) {
    let Task { label, thunk } = task;
    let mut handle = tokio::spawn(async move { thunk().await });

    match tokio::time::timeout(watchdog, &mut handle).await {
        Ok(Ok(Ok(()))) => log::trace!("Task {} settled", label),
        Ok(Ok(Err(e))) => log::warn!("Task {} failed: {}", label, e),
        Ok(Err(e)) if e.is_panic() => log::error!("Task {} panicked", label),
        Ok(Err(e)) => log::warn!("Task {} was cancelled: {}", label, e),
        Err(_) => {
            handle.abort();
            log::warn!("Task {} exceeded the {:?} watchdog", label, watchdog);
        }
    }
}
