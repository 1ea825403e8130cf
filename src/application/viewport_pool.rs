use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::application::sync_group::SyncGroup;
use crate::domain::chart::{
    ChartApi, ChartFactory, LineStyle, RenderSurface, Subscription, SurfaceKind,
};
use crate::domain::errors::{DataResult, GridError};
use crate::domain::grid::{GridConfig, OverlayState};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    Granularity, SeriesPoint, Symbol, TimeSeries, TimeseriesRepository, Timestamp,
};
use crate::domain::platform::{FrameScheduler, TaskSpawner};

pub type OverlayListener = Rc<dyn Fn(&Symbol, OverlayState)>;

/// One rendering surface plus chart/series handles bound to exactly one
/// visible symbol. Exists iff its symbol is in the visible set.
pub struct Viewport {
    symbol: Symbol,
    surface: Rc<dyn RenderSurface>,
    chart: Rc<dyn ChartApi>,
    overlay: Cell<OverlayState>,
    series: RefCell<Option<TimeSeries>>,
    torn_down: Cell<bool>,
    _size_sub: Subscription,
}

impl Viewport {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn overlay(&self) -> OverlayState {
        self.overlay.get()
    }

    pub fn series(&self) -> Option<TimeSeries> {
        self.series.borrow().clone()
    }

    pub fn chart(&self) -> Rc<dyn ChartApi> {
        Rc::clone(&self.chart)
    }

    /// Release every handle this viewport owns. Safe to call repeatedly;
    /// the size observer disconnects when the subscription drops.
    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.chart.dispose();
        self.surface.remove();
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct PoolInner {
    factory: Rc<dyn ChartFactory>,
    repository: Rc<dyn TimeseriesRepository>,
    spawner: Rc<dyn TaskSpawner>,
    frames: Rc<dyn FrameScheduler>,
    sync: SyncGroup,
    config: GridConfig,
    granularity: Cell<Granularity>,
    /// Registry of live viewports, keyed by symbol. Symbol-keyed identity:
    /// reordering the selection never tears a chart down.
    viewports: RefCell<HashMap<Symbol, Rc<Viewport>>>,
    overlay_listener: RefCell<Option<OverlayListener>>,
}

/// Reconciles the desired symbol set against live rendering surfaces:
/// creates, resizes, and disposes per-symbol chart instances.
#[derive(Clone)]
pub struct ViewportPool {
    inner: Rc<PoolInner>,
}

impl ViewportPool {
    pub fn new(
        config: GridConfig,
        factory: Rc<dyn ChartFactory>,
        repository: Rc<dyn TimeseriesRepository>,
        spawner: Rc<dyn TaskSpawner>,
        frames: Rc<dyn FrameScheduler>,
        sync: SyncGroup,
    ) -> Self {
        let granularity = config.default_granularity;
        Self {
            inner: Rc::new(PoolInner {
                factory,
                repository,
                spawner,
                frames,
                sync,
                config,
                granularity: Cell::new(granularity),
                viewports: RefCell::new(HashMap::new()),
                overlay_listener: RefCell::new(None),
            }),
        }
    }

    /// Observer for overlay transitions, consumed by the presentation
    /// layer. One listener is enough; re-setting replaces it.
    pub fn set_overlay_listener(&self, listener: OverlayListener) {
        *self.inner.overlay_listener.borrow_mut() = Some(listener);
    }

    /// Bring the live viewport set in line with `desired`. Removals run
    /// first so a bump-eviction frees its slot before the newcomer mounts.
    pub fn reconcile(&self, desired: &[Symbol]) {
        let stale: Vec<Symbol> = self
            .inner
            .viewports
            .borrow()
            .keys()
            .filter(|symbol| !desired.contains(*symbol))
            .cloned()
            .collect();
        for symbol in &stale {
            self.destroy_viewport(symbol);
        }

        for symbol in desired {
            let exists = self.inner.viewports.borrow().contains_key(symbol);
            if !exists {
                self.create_viewport(symbol);
            }
        }
    }

    /// Tear down every viewport. Used on grid teardown.
    pub fn clear(&self) {
        self.reconcile(&[]);
    }

    pub fn set_granularity(&self, granularity: Granularity) {
        if self.inner.granularity.replace(granularity) == granularity {
            return;
        }
        // Refresh in place: overlays go Loading while the previous render
        // stays visible underneath.
        let symbols: Vec<Symbol> = self.inner.viewports.borrow().keys().cloned().collect();
        for symbol in &symbols {
            if let Some(viewport) = self.viewport(symbol) {
                viewport.overlay.set(OverlayState::Loading);
                self.notify_overlay(symbol, OverlayState::Loading);
            }
            self.request_data(symbol);
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.inner.granularity.get()
    }

    /// Recenter every synchronized viewport on `target`, each against its
    /// own series. Zoom width is preserved per member; only the center
    /// index is unified. Index-based approximation, not calendar-exact.
    pub fn recenter(&self, target: Timestamp) {
        self.inner.sync.silence_until_next_frame();
        for viewport in self.inner.viewports.borrow().values() {
            let series = viewport.series.borrow();
            let Some(series) = series.as_ref().filter(|s| !s.is_empty()) else {
                continue;
            };
            let Some(range) = viewport.chart.visible_range() else {
                continue;
            };
            let center = series.locate(target) as f64;
            let _ = viewport.chart.set_visible_range(range.centered_at(center));
        }
    }

    /// Apply a resolved fetch. A response for a symbol that already left
    /// the visible set is discarded without side effects; this membership
    /// check is the cancellation story, the request itself may be
    /// uncancellable.
    pub fn apply_response(&self, symbol: &Symbol, outcome: DataResult<Vec<SeriesPoint>>) {
        let viewport = self.inner.viewports.borrow().get(symbol).cloned();
        let Some(viewport) = viewport else {
            get_logger().debug(
                LogComponent::Application("ViewportPool"),
                &format!("{}", GridError::MembershipRace(symbol.clone())),
            );
            return;
        };

        match outcome {
            Ok(points) => {
                let series = TimeSeries::new(points);
                let overlay = OverlayState::resolved(series.len());
                viewport.chart.set_line_data(series.points());
                *viewport.series.borrow_mut() = Some(series);
                viewport.overlay.set(overlay);
                self.notify_overlay(symbol, overlay);
                self.inner.sync.align_member(symbol);
            }
            Err(err) => {
                // A previously rendered series stays on screen under the
                // error indicator. No automatic retry.
                viewport.overlay.set(OverlayState::Error);
                self.notify_overlay(symbol, OverlayState::Error);
                get_logger().warn(
                    LogComponent::Application("ViewportPool"),
                    &format!("data load failed for {}: {}", symbol.value(), err),
                );
            }
        }
    }

    pub fn viewport(&self, symbol: &Symbol) -> Option<Rc<Viewport>> {
        self.inner.viewports.borrow().get(symbol).cloned()
    }

    pub fn overlay_of(&self, symbol: &Symbol) -> Option<OverlayState> {
        self.viewport(symbol).map(|v| v.overlay())
    }

    pub fn series_of(&self, symbol: &Symbol) -> Option<TimeSeries> {
        self.viewport(symbol).and_then(|v| v.series())
    }

    pub fn live_symbols(&self) -> Vec<Symbol> {
        self.inner.viewports.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.viewports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.viewports.borrow().is_empty()
    }

    pub fn sync_group(&self) -> &SyncGroup {
        &self.inner.sync
    }

    fn create_viewport(&self, symbol: &Symbol) {
        let mounted = match self.inner.factory.create(
            symbol,
            SurfaceKind::GridCell,
            LineStyle::for_symbol(symbol),
        ) {
            Ok(mounted) => mounted,
            Err(err) => {
                // One broken surface must not take the grid down.
                get_logger().error(
                    LogComponent::Application("ViewportPool"),
                    &format!("viewport creation failed for {}: {}", symbol.value(), err),
                );
                return;
            }
        };

        let size_sub = self.observe_size(&mounted.surface, &mounted.chart);

        let viewport = Rc::new(Viewport {
            symbol: symbol.clone(),
            surface: mounted.surface,
            chart: mounted.chart,
            overlay: Cell::new(OverlayState::Loading),
            series: RefCell::new(None),
            torn_down: Cell::new(false),
            _size_sub: size_sub,
        });

        self.inner
            .viewports
            .borrow_mut()
            .insert(symbol.clone(), Rc::clone(&viewport));
        self.notify_overlay(symbol, OverlayState::Loading);

        // The factory hands the surface back mounted; join the group now so
        // the newcomer inherits the current pan/zoom before data lands.
        self.inner.sync.attach(symbol, viewport.chart());

        self.request_data(symbol);

        get_logger().debug(
            LogComponent::Application("ViewportPool"),
            &format!("viewport created for {}", symbol.value()),
        );
    }

    fn destroy_viewport(&self, symbol: &Symbol) {
        let Some(viewport) = self.inner.viewports.borrow_mut().remove(symbol) else {
            return;
        };
        self.inner.sync.detach(symbol);
        viewport.teardown();
        get_logger().debug(
            LogComponent::Application("ViewportPool"),
            &format!("viewport destroyed for {}", symbol.value()),
        );
    }

    /// Coalesce size reports onto the rendering scheduler: one resize per
    /// frame per viewport, clamped so layout thrash never produces a
    /// zero-sized chart.
    fn observe_size(
        &self,
        surface: &Rc<dyn RenderSurface>,
        chart: &Rc<dyn ChartApi>,
    ) -> Subscription {
        let pending: Rc<Cell<Option<(u32, u32)>>> = Rc::new(Cell::new(None));
        let frames = Rc::clone(&self.inner.frames);
        let chart = Rc::clone(chart);
        let min_width = self.inner.config.min_chart_width;
        let min_height = self.inner.config.min_chart_height;

        surface.observe_size(Box::new(move |width, height| {
            let first_this_frame = pending.replace(Some((width, height))).is_none();
            if !first_this_frame {
                return;
            }
            let pending = Rc::clone(&pending);
            let chart = Rc::clone(&chart);
            frames.request_frame(Box::new(move || {
                if let Some((width, height)) = pending.take() {
                    let _ = chart.resize(width.max(min_width), height.max(min_height));
                }
            }));
        }))
    }

    fn request_data(&self, symbol: &Symbol) {
        let future = self
            .inner
            .repository
            .fetch(symbol, self.inner.granularity.get());
        let weak: Weak<PoolInner> = Rc::downgrade(&self.inner);
        let symbol = symbol.clone();
        self.inner.spawner.spawn(Box::pin(async move {
            let outcome = future.await;
            if let Some(inner) = weak.upgrade() {
                ViewportPool { inner }.apply_response(&symbol, outcome);
            }
        }));
    }

    fn notify_overlay(&self, symbol: &Symbol, state: OverlayState) {
        let listener = self.inner.overlay_listener.borrow().clone();
        if let Some(listener) = listener {
            listener(symbol, state);
        }
    }
}
