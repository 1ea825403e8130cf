//! Host platform abstractions. The grid core never talks to the browser
//! directly; concrete bindings live in `infrastructure::platform`.

use futures::future::LocalBoxFuture;

/// Animation-frame-or-equivalent scheduler. Callbacks queued here run on
/// the next rendering turn; the sync group and resize coalescing rely on
/// this to break reentrant broadcast cycles.
pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
}

/// Cancellable one-shot timers (bump-eviction highlight expiry).
pub trait DelayScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> ScheduledTimeout;
}

/// RAII handle for a pending timeout. Dropping the handle cancels the
/// timeout if it has not fired yet; cancelling a fired timeout is a no-op.
pub struct ScheduledTimeout {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ScheduledTimeout {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduledTimeout {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for ScheduledTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTimeout")
            .field("pending", &self.cancel.is_some())
            .finish()
    }
}

/// Single-threaded task spawner for in-flight data requests. The wasm
/// binding forwards to `spawn_local`; tests drive a `LocalPool`.
pub trait TaskSpawner {
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}
