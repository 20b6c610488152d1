use crate::errors::AppResult;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tokio::time::Duration;

static TIMER_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Runtime the delayed actions are spawned on: the caller's when there is
/// one, otherwise a shared background runtime started on first use.
pub fn runtime_handle() -> AppResult<Handle> {
    if let Ok(handle) = Handle::try_current() {
        return Ok(handle);
    }
    if let Some(runtime) = TIMER_RUNTIME.get() {
        return Ok(runtime.handle().clone());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("atlas-timers")
        .enable_time()
        .build()?;
    tracing::debug!("started background timer runtime");
    Ok(TIMER_RUNTIME.get_or_init(|| runtime).handle().clone())
}

#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Runs at most one delayed action at a time. Scheduling a new action or
/// calling [`Debouncer::cancel`] supersedes whatever was pending; a
/// superseded action never runs, even if its timer already fired.
#[derive(Debug, Clone)]
pub struct Debouncer {
    runtime: Handle,
    pending: Arc<Mutex<Pending>>,
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debouncer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        pending.generation = pending.generation.wrapping_add(1);
        if let Some(task) = pending.task.take() {
            task.abort();
        }

        let generation = pending.generation;
        let shared = Arc::clone(&self.pending);
        pending.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut pending = lock(&shared);
            if pending.generation != generation {
                return;
            }
            pending.task = None;
            action();
        }));
    }

    /// Drops the pending action, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = lock(&self.pending);
        pending.generation = pending.generation.wrapping_add(1);
        match pending.task.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                was_running
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}
