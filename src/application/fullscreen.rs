use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::domain::chart::{
    ChartApi, ChartFactory, LineStyle, RenderSurface, Subscription, SurfaceKind,
};
use crate::domain::errors::RenderResult;
use crate::domain::grid::{GridConfig, OverlayState};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Symbol, TimeSeries};
use crate::domain::platform::FrameScheduler;

struct StageViewport {
    symbol: Symbol,
    surface: Rc<dyn RenderSurface>,
    chart: Rc<dyn ChartApi>,
    overlay: OverlayState,
    torn_down: Cell<bool>,
    _size_sub: Subscription,
    _dismiss_sub: Subscription,
}

impl StageViewport {
    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.chart.dispose();
        self.surface.remove();
    }
}

impl Drop for StageViewport {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Isolated single-viewport surface layered over the grid. Its chart is
/// never a sync-group member, so pan/zoom here does not mirror to the
/// grid or back. Created and destroyed on demand; at most one at a time.
pub struct FullscreenStage {
    factory: Rc<dyn ChartFactory>,
    frames: Rc<dyn FrameScheduler>,
    config: GridConfig,
    active: Rc<RefCell<Option<StageViewport>>>,
}

impl FullscreenStage {
    pub fn new(
        factory: Rc<dyn ChartFactory>,
        frames: Rc<dyn FrameScheduler>,
        config: GridConfig,
    ) -> Self {
        Self {
            factory,
            frames,
            config,
            active: Rc::new(RefCell::new(None)),
        }
    }

    /// Promote `symbol` to fullscreen, populated with its already-loaded
    /// series when there is one, an empty state otherwise. Replaces any
    /// stage already open.
    pub fn open(&self, symbol: &Symbol, series: Option<&TimeSeries>) -> RenderResult<()> {
        self.close();

        let mounted = self.factory.create(
            symbol,
            SurfaceKind::FullscreenStage,
            LineStyle::for_symbol(symbol),
        )?;

        let overlay = match series.filter(|s| !s.is_empty()) {
            Some(series) => {
                mounted.chart.set_line_data(series.points());
                mounted.chart.fit_content();
                OverlayState::DataReady
            }
            None => {
                mounted.chart.set_line_data(&[]);
                OverlayState::EmptyReady
            }
        };

        let size_sub = self.observe_size(&mounted.surface, &mounted.chart);
        let dismiss_sub = self.observe_dismiss(&mounted.surface, symbol);

        *self.active.borrow_mut() = Some(StageViewport {
            symbol: symbol.clone(),
            surface: mounted.surface,
            chart: mounted.chart,
            overlay,
            torn_down: Cell::new(false),
            _size_sub: size_sub,
            _dismiss_sub: dismiss_sub,
        });

        get_logger().info(
            LogComponent::Application("Fullscreen"),
            &format!("stage opened for {}", symbol.value()),
        );
        Ok(())
    }

    /// Dispose the stage chart, remove its surface, and detach every
    /// listener it registered. Safe to call when nothing is open.
    pub fn close(&self) {
        if let Some(stage) = self.active.borrow_mut().take() {
            stage.teardown();
            get_logger().info(
                LogComponent::Application("Fullscreen"),
                &format!("stage closed for {}", stage.symbol.value()),
            );
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.borrow().is_some()
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.active.borrow().as_ref().map(|s| s.symbol.clone())
    }

    pub fn overlay(&self) -> Option<OverlayState> {
        self.active.borrow().as_ref().map(|s| s.overlay)
    }

    pub fn chart(&self) -> Option<Rc<dyn ChartApi>> {
        self.active.borrow().as_ref().map(|s| Rc::clone(&s.chart))
    }

    fn observe_size(
        &self,
        surface: &Rc<dyn RenderSurface>,
        chart: &Rc<dyn ChartApi>,
    ) -> Subscription {
        let pending: Rc<Cell<Option<(u32, u32)>>> = Rc::new(Cell::new(None));
        let frames = Rc::clone(&self.frames);
        let chart = Rc::clone(chart);
        let min_width = self.config.min_chart_width;
        let min_height = self.config.min_chart_height;

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

    /// Close control, escape key, or a click outside the stage bounds all
    /// dismiss. Teardown is deferred one frame so the listener that fired
    /// is not destroyed while it is still being dispatched.
    fn observe_dismiss(&self, surface: &Rc<dyn RenderSurface>, symbol: &Symbol) -> Subscription {
        let slot = Rc::downgrade(&self.active);
        let frames = Rc::clone(&self.frames);
        let symbol = symbol.clone();

        surface.observe_dismiss(Box::new(move |signal| {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            get_logger().debug(
                LogComponent::Application("Fullscreen"),
                &format!("dismiss {:?} for {}", signal, symbol.value()),
            );
            let slot = Rc::clone(&slot);
            frames.request_frame(Box::new(move || {
                if let Some(stage) = slot.borrow_mut().take() {
                    stage.teardown();
                }
            }));
        }))
    }
}
