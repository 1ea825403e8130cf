//! Shared rig for the grid tests: headless chart binding, a hand-resolved
//! timeseries repository, and manually pumped schedulers, so every
//! asynchronous path is driven deterministically.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;

use market_grid_wasm::application::{GridCoordinator, GridDeps};
use market_grid_wasm::domain::errors::{DataResult, GridError};
use market_grid_wasm::domain::grid::{GridConfig, OverlayState};
use market_grid_wasm::domain::market_data::{
    Granularity, Quote, SeriesPoint, Symbol, TimeseriesRepository, Timestamp,
};
use market_grid_wasm::infrastructure::platform::{ManualDelayScheduler, ManualFrameScheduler};
use market_grid_wasm::infrastructure::rendering::HeadlessChartFactory;

type PendingFetch = (Symbol, oneshot::Sender<DataResult<Vec<SeriesPoint>>>);

/// Repository whose responses are resolved by hand, in any order, any time
/// after the request was issued.
#[derive(Clone, Default)]
pub struct ManualRepository {
    pending: Rc<RefCell<VecDeque<PendingFetch>>>,
}

impl ManualRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the oldest outstanding request for `symbol`.
    pub fn resolve(&self, symbol: &Symbol, points: Vec<SeriesPoint>) -> bool {
        self.complete(symbol, Ok(points))
    }

    /// Reject the oldest outstanding request for `symbol`.
    pub fn reject(&self, symbol: &Symbol, message: &str) -> bool {
        self.complete(symbol, Err(GridError::DataLoad(message.to_string())))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn pending_for(&self, symbol: &Symbol) -> usize {
        self.pending
            .borrow()
            .iter()
            .filter(|(s, _)| s == symbol)
            .count()
    }

    fn complete(&self, symbol: &Symbol, outcome: DataResult<Vec<SeriesPoint>>) -> bool {
        let position = self
            .pending
            .borrow()
            .iter()
            .position(|(s, _)| s == symbol);
        let Some(position) = position else {
            return false;
        };
        let (_, sender) = self.pending.borrow_mut().remove(position).unwrap();
        sender.send(outcome).is_ok()
    }
}

impl TimeseriesRepository for ManualRepository {
    fn fetch(
        &self,
        symbol: &Symbol,
        _granularity: Granularity,
    ) -> LocalBoxFuture<'static, DataResult<Vec<SeriesPoint>>> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push_back((symbol.clone(), sender));
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(GridError::DataLoad("request dropped".to_string())))
        }
        .boxed_local()
    }
}

pub fn sym(name: &str) -> Symbol {
    Symbol::from(name)
}

/// Build points from `(epoch_seconds, value)` pairs.
pub fn points(pairs: &[(u64, f64)]) -> Vec<SeriesPoint> {
    pairs
        .iter()
        .map(|(t, v)| SeriesPoint::new(Timestamp::from_secs(*t), Quote::new(*v)))
        .collect()
}

/// `n` daily points starting at epoch second 1_000, one per 86_400 s.
pub fn daily_points(n: usize) -> Vec<SeriesPoint> {
    (0..n)
        .map(|i| {
            SeriesPoint::new(
                Timestamp::from_secs(1_000 + i as u64 * 86_400),
                Quote::new(100.0 + i as f64),
            )
        })
        .collect()
}

/// Full deterministic grid: coordinator wired to headless charts, a manual
/// repository, and hand-pumped frame/timer schedulers.
pub struct GridRig {
    pub factory: HeadlessChartFactory,
    pub repository: ManualRepository,
    pub frames: ManualFrameScheduler,
    pub timers: ManualDelayScheduler,
    pub coordinator: GridCoordinator,
    pub overlay_events: Rc<RefCell<Vec<(Symbol, OverlayState)>>>,
    executor: RefCell<LocalPool>,
}

impl GridRig {
    pub fn new(initial: &[&str]) -> Self {
        let factory = HeadlessChartFactory::new();
        let repository = ManualRepository::new();
        let frames = ManualFrameScheduler::new();
        let timers = ManualDelayScheduler::new();
        let executor = LocalPool::new();

        let config = GridConfig {
            initial_selection: initial.iter().map(|s| Symbol::from(*s)).collect(),
            ..GridConfig::default()
        };
        let deps = GridDeps {
            factory: Rc::new(factory.clone()),
            repository: Rc::new(repository.clone()),
            spawner: Rc::new(executor.spawner()),
            frames: Rc::new(frames.clone()),
            timers: Rc::new(timers.clone()),
        };
        let coordinator = GridCoordinator::new(config, deps);

        let overlay_events: Rc<RefCell<Vec<(Symbol, OverlayState)>>> =
            Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&overlay_events);
        coordinator.set_overlay_listener(Rc::new(move |symbol, state| {
            sink.borrow_mut().push((symbol.clone(), state));
        }));

        Self {
            factory,
            repository,
            frames,
            timers,
            coordinator,
            overlay_events,
            executor: RefCell::new(executor),
        }
    }

    /// Boot the rig and pump once: viewports exist, fetches are pending.
    pub fn bootstrapped(initial: &[&str]) -> Self {
        let rig = Self::new(initial);
        rig.coordinator.bootstrap();
        rig.pump();
        rig
    }

    /// Run spawned tasks until quiescent.
    pub fn run_tasks(&self) {
        self.executor.borrow_mut().run_until_stalled();
    }

    /// Tasks, one frame, tasks again: a full scheduler turn.
    pub fn pump(&self) {
        self.run_tasks();
        self.frames.run_frame();
        self.run_tasks();
    }

    /// Resolve a fetch and settle the turn.
    pub fn resolve(&self, symbol: &str, data: Vec<SeriesPoint>) {
        assert!(
            self.repository.resolve(&sym(symbol), data),
            "no pending fetch for {}",
            symbol
        );
        self.pump();
    }

    pub fn reject(&self, symbol: &str, message: &str) {
        assert!(
            self.repository.reject(&sym(symbol), message),
            "no pending fetch for {}",
            symbol
        );
        self.pump();
    }

    pub fn toggle(&self, symbol: &str) {
        self.coordinator.toggle(&sym(symbol));
        self.pump();
    }

    pub fn overlay_of(&self, symbol: &str) -> Option<OverlayState> {
        self.coordinator.overlay_of(&sym(symbol))
    }
}
