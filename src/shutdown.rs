//! Graceful shutdown coordination utilities.
//!
//! Provides a lightweight [`ShutdownCoordinator`] shared by the batch
//! scheduler and every fetch chain. Requesting shutdown interrupts retry
//! backoffs and cohort cooldowns; chains that are interrupted still report a
//! cancelled outcome so the result set stays complete.

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Shared handle to a shutdown coordinator.
pub type SharedShutdown = Arc<ShutdownCoordinator>;

static GLOBAL_SHUTDOWN: OnceCell<SharedShutdown> = OnceCell::new();

/// Register a global shutdown handle so subsystems can discover it lazily.
pub fn set_global_shutdown(handle: SharedShutdown) {
    let _ = GLOBAL_SHUTDOWN.set(handle);
}

/// Retrieve the registered global shutdown handle, if available.
pub fn get_global_shutdown() -> Option<SharedShutdown> {
    GLOBAL_SHUTDOWN.get().cloned()
}

/// Coordinates graceful shutdown across async tasks.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    is_shutdown: AtomicBool,
    notify: Notify,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    pub fn new() -> Self {
        Self {
            is_shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Create a new shared coordinator wrapped in [`Arc`].
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Request shutdown. Notifies all registered waiters exactly once.
    pub fn request_shutdown(&self) {
        if !self.is_shutdown.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is requested. Returns immediately if already set.
    pub async fn wait_for_shutdown(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent request is not lost.
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn sleep_unless_shutdown(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait_for_shutdown() => false,
        }
    }

    /// Create a coordinator that follows this one.
    ///
    /// The child is requested whenever this coordinator is, but requesting
    /// the child leaves this coordinator untouched. Abort the returned handle
    /// once the child is no longer needed.
    pub fn child(self: &Arc<Self>) -> (SharedShutdown, JoinHandle<()>) {
        let child = Self::shared();
        if self.is_shutdown_requested() {
            child.request_shutdown();
        }

        let parent = Arc::clone(self);
        let follower = Arc::clone(&child);
        let forward = tokio::spawn(async move {
            parent.wait_for_shutdown().await;
            follower.request_shutdown();
        });
        (child, forward)
    }

    /// Request shutdown once `deadline` has elapsed.
    ///
    /// Abort the returned handle to disarm the deadline.
    pub fn request_after(self: &Arc<Self>, deadline: Duration) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if this.sleep_unless_shutdown(deadline).await {
                tracing::warn!(
                    deadline_secs = deadline.as_secs(),
                    "Batch deadline reached - cancelling in-flight fetches"
                );
                this.request_shutdown();
            }
        })
    }
}
