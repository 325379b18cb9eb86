use crate::traits::PollJob;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Gate that holds recurring tasks back until the destination session is up.
#[derive(Clone)]
pub struct Readiness {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Readiness {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// A gate that is open from the start.
    pub fn ready() -> Self {
        let readiness = Self::new();
        readiness.mark_ready();
        readiness
    }

    pub fn mark_ready(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.receiver.borrow()
    }

    pub async fn wait_ready(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as any clone of self, so this only fails
        // if every gate handle is gone.
        let _ = receiver.wait_for(|ready| *ready).await;
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs an action every `interval`, measured from the end of one run to the
/// start of the next, so runs never overlap.
///
/// `cancel` stops the loop at the next suspension point. A run in flight is
/// dropped there rather than waited for.
pub struct RecurringTask {
    name: &'static str,
    interval: Duration,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl RecurringTask {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            shutdown: None,
            handle: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the loop. The first run starts as soon as `ready` opens.
    pub fn start<F, Fut>(&mut self, ready: Readiness, action: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_running() {
            warn!("Task '{}' is already running, ignoring start", self.name);
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let name = self.name;
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = ready.wait_ready() => {}
                _ = shutdown_rx.changed() => {
                    debug!("Task '{}' cancelled before becoming ready", name);
                    return;
                }
            }

            info!("Task '{}' started (every {}s)", name, interval.as_secs());

            loop {
                tokio::select! {
                    _ = action() => {}
                    _ = shutdown_rx.changed() => break,
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => break,
                }
            }

            info!("Task '{}' stopped", name);
        });

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);
    }

    /// Convenience for driving a `PollJob` with its own name and interval.
    pub fn for_job<J>(job: Arc<J>, ready: Readiness) -> Self
    where
        J: PollJob + 'static,
    {
        let mut task = Self::new(job.name(), job.interval());
        task.start(ready, move || {
            let job = Arc::clone(&job);
            async move {
                let report = job.run_cycle().await;
                debug!("Job '{}' cycle finished: {:?}", job.name(), report);
            }
        });
        task
    }

    /// Stop the loop and wait for the spawned task to exit. Calling it again
    /// is a no-op.
    pub async fn cancel(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Task '{}' ended abnormally: {}", self.name, e);
            }
        }
    }
}
