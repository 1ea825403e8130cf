//! Concrete host-platform bindings: browser implementations used by the
//! wasm entrypoint, plus manually driven schedulers for headless runs and
//! native tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::platform::{DelayScheduler, FrameScheduler, ScheduledTimeout, TaskSpawner};

/// `requestAnimationFrame` scheduler.
pub struct AnimationFrameScheduler;

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            get_logger().warn(
                LogComponent::Infrastructure("Platform"),
                "no window; frame callback dropped",
            );
            return;
        };
        let closure = Closure::once_into_js(move || callback());
        if window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .is_err()
        {
            get_logger().warn(
                LogComponent::Infrastructure("Platform"),
                "requestAnimationFrame rejected",
            );
        }
    }
}

/// `setTimeout` timers via gloo. Dropping the returned handle cancels a
/// pending timeout.
pub struct BrowserDelayScheduler;

impl DelayScheduler for BrowserDelayScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> ScheduledTimeout {
        let timeout = Timeout::new(delay_ms, move || callback());
        // Dropping a gloo Timeout clears the underlying setTimeout.
        ScheduledTimeout::new(move || drop(timeout))
    }
}

/// Forwards to `wasm_bindgen_futures::spawn_local`.
pub struct WasmTaskSpawner;

impl TaskSpawner for WasmTaskSpawner {
    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}

/// A `LocalPool` spawner doubles as the grid's task spawner in headless
/// runs; the pool is pumped by whoever owns it.
impl TaskSpawner for futures::executor::LocalSpawner {
    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if self.spawn_local(future).is_err() {
            get_logger().warn(
                LogComponent::Infrastructure("Platform"),
                "local executor shut down; task dropped",
            );
        }
    }
}

/// Frame scheduler driven by hand. Queued callbacks run when the owner
/// pumps a frame; callbacks queued during a frame land in the next one.
#[derive(Clone, Default)]
pub struct ManualFrameScheduler {
    queue: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run everything queued before this call.
    pub fn run_frame(&self) {
        let batch: Vec<Box<dyn FnOnce()>> = self.queue.borrow_mut().drain(..).collect();
        for callback in batch {
            callback();
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push(callback);
    }
}

#[derive(Default)]
struct ManualTimerState {
    now_ms: u64,
    next_id: u64,
    pending: HashMap<u64, (u64, Box<dyn FnOnce()>)>,
}

/// Timer scheduler driven by an explicit clock. `advance` fires every
/// timeout whose deadline passed, in deadline order.
#[derive(Clone, Default)]
pub struct ManualDelayScheduler {
    state: Rc<RefCell<ManualTimerState>>,
}

impl ManualDelayScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        let mut due: Vec<(u64, Box<dyn FnOnce()>)> = {
            let mut state = self.state.borrow_mut();
            state.now_ms += ms;
            let now = state.now_ms;
            let ids: Vec<u64> = state
                .pending
                .iter()
                .filter(|(_, (deadline, _))| *deadline <= now)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| state.pending.remove(&id))
                .collect()
        };
        due.sort_by_key(|(deadline, _)| *deadline);
        // Borrow released above: callbacks may schedule or cancel freely.
        for (_, callback) in due {
            callback();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

impl DelayScheduler for ManualDelayScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> ScheduledTimeout {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            let deadline = state.now_ms + delay_ms as u64;
            state.pending.insert(id, (deadline, callback));
            id
        };
        let state = Rc::clone(&self.state);
        ScheduledTimeout::new(move || {
            state.borrow_mut().pending.remove(&id);
        })
    }
}
