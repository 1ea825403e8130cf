use std::cell::RefCell;
use std::rc::Rc;

use crate::application::fullscreen::FullscreenStage;
use crate::application::sync_group::SyncGroup;
use crate::application::viewport_pool::{OverlayListener, ViewportPool};
use crate::domain::chart::ChartFactory;
use crate::domain::errors::RenderResult;
use crate::domain::grid::{GridConfig, OverlayState, SelectionModel, ToggleChange};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Granularity, Symbol, TimeseriesRepository, Timestamp};
use crate::domain::platform::{DelayScheduler, FrameScheduler, TaskSpawner};

/// Everything the host environment supplies to run a grid.
pub struct GridDeps {
    pub factory: Rc<dyn ChartFactory>,
    pub repository: Rc<dyn TimeseriesRepository>,
    pub spawner: Rc<dyn TaskSpawner>,
    pub frames: Rc<dyn FrameScheduler>,
    pub timers: Rc<dyn DelayScheduler>,
}

/// Facade owning the grid: selection, viewport pool, sync group, and the
/// fullscreen stage. Every mutation funnels through here so selection and
/// viewports can never drift apart.
pub struct GridCoordinator {
    config: GridConfig,
    selection: SelectionModel,
    pool: ViewportPool,
    stage: FullscreenStage,
}

impl GridCoordinator {
    pub fn new(config: GridConfig, deps: GridDeps) -> Self {
        let sync = SyncGroup::new(Rc::clone(&deps.frames));
        let selection =
            SelectionModel::new(config.capacity, config.bump_ttl_ms, Rc::clone(&deps.timers));
        let pool = ViewportPool::new(
            config.clone(),
            Rc::clone(&deps.factory),
            Rc::clone(&deps.repository),
            Rc::clone(&deps.spawner),
            Rc::clone(&deps.frames),
            sync,
        );
        let stage = FullscreenStage::new(
            Rc::clone(&deps.factory),
            Rc::clone(&deps.frames),
            config.clone(),
        );

        Self { config, selection, pool, stage }
    }

    /// Seed the configured initial selection and reconcile once.
    pub fn bootstrap(&self) {
        let initial = self.config.initial_selection.clone();
        self.selection.seed(&initial);
        self.pool.reconcile(&self.selection.visible());
        get_logger().info(
            LogComponent::Application("Coordinator"),
            &format!("grid bootstrapped with {} symbols", self.pool.len()),
        );
    }

    /// Select or deselect a symbol, then reconcile viewports to match.
    pub fn toggle(&self, symbol: &Symbol) -> ToggleChange {
        let change = self.selection.toggle(symbol);
        self.pool.reconcile(&self.selection.visible());
        change
    }

    pub fn set_granularity(&self, granularity: Granularity) {
        self.pool.set_granularity(granularity);
    }

    pub fn granularity(&self) -> Granularity {
        self.pool.granularity()
    }

    /// Recenter every synchronized viewport on a wall-clock date.
    pub fn recenter(&self, target: Timestamp) {
        self.pool.recenter(target);
    }

    /// Promote a symbol to the fullscreen stage, populated from its
    /// already-loaded series if the pool has one.
    pub fn open_fullscreen(&self, symbol: &Symbol) -> RenderResult<()> {
        let series = self.pool.series_of(symbol);
        self.stage.open(symbol, series.as_ref())
    }

    pub fn close_fullscreen(&self) {
        self.stage.close();
    }

    pub fn fullscreen_symbol(&self) -> Option<Symbol> {
        self.stage.symbol()
    }

    pub fn selection(&self) -> Vec<Symbol> {
        self.selection.selected()
    }

    pub fn visible(&self) -> Vec<Symbol> {
        self.selection.visible()
    }

    pub fn is_selected(&self, symbol: &Symbol) -> bool {
        self.selection.is_selected(symbol)
    }

    pub fn bumped(&self) -> Option<Symbol> {
        self.selection.bumped()
    }

    pub fn overlay_of(&self, symbol: &Symbol) -> Option<OverlayState> {
        self.pool.overlay_of(symbol)
    }

    pub fn set_overlay_listener(&self, listener: OverlayListener) {
        self.pool.set_overlay_listener(listener);
    }

    pub fn set_bump_listener(&self, listener: Rc<dyn Fn(Option<Symbol>)>) {
        self.selection.set_bump_listener(listener);
    }

    pub fn pool(&self) -> &ViewportPool {
        &self.pool
    }

    pub fn stage(&self) -> &FullscreenStage {
        &self.stage
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Tear the whole grid down: stage first, then every pooled viewport.
    pub fn teardown(&self) {
        self.stage.close();
        self.pool.clear();
    }
}

// Global coordinator instance (thread-local for WASM)
thread_local! {
    static GLOBAL_COORDINATOR: RefCell<Option<GridCoordinator>> = RefCell::new(None);
}

/// Install the global coordinator, replacing (and tearing down) any
/// previous instance.
pub fn install_grid_coordinator(coordinator: GridCoordinator) {
    GLOBAL_COORDINATOR.with(|global| {
        if let Some(previous) = global.borrow_mut().replace(coordinator) {
            previous.teardown();
        }
    });
}

/// Run `f` against the global coordinator, if one is installed.
pub fn with_grid_coordinator<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&GridCoordinator) -> R,
{
    GLOBAL_COORDINATOR.with(|global| global.borrow().as_ref().map(f))
}

/// Tear down and drop the global coordinator.
pub fn clear_grid_coordinator() {
    GLOBAL_COORDINATOR.with(|global| {
        if let Some(coordinator) = global.borrow_mut().take() {
            coordinator.teardown();
        }
    });
}
