//! In-memory chart binding. Implements the full factory/surface/chart
//! contract without a browser, recording every operation so the grid can
//! be driven and inspected from native code. This is what the logic-level
//! test suite runs against.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::chart::{
    ChartApi, ChartFactory, DismissSignal, LineStyle, LogicalRange, MountedChart, RenderSurface,
    Subscription, SurfaceKind,
};
use crate::domain::errors::{GridError, RenderResult};
use crate::domain::market_data::{SeriesPoint, Symbol};

type SizeObservers = Rc<RefCell<HashMap<u64, Box<dyn Fn(u32, u32)>>>>;
type DismissObservers = Rc<RefCell<HashMap<u64, Box<dyn Fn(DismissSignal)>>>>;
type RangeObservers = Rc<RefCell<HashMap<u64, Rc<dyn Fn(LogicalRange)>>>>;

/// Mount target that exists only in memory.
pub struct HeadlessSurface {
    symbol: Symbol,
    kind: SurfaceKind,
    size: Cell<(u32, u32)>,
    removed: Cell<bool>,
    next_id: Cell<u64>,
    size_observers: SizeObservers,
    dismiss_observers: DismissObservers,
}

impl HeadlessSurface {
    fn new(symbol: Symbol, kind: SurfaceKind) -> Self {
        Self {
            symbol,
            kind,
            size: Cell::new((640, 260)),
            removed: Cell::new(false),
            next_id: Cell::new(0),
            size_observers: Rc::new(RefCell::new(HashMap::new())),
            dismiss_observers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub fn size_observer_count(&self) -> usize {
        self.size_observers.borrow().len()
    }

    pub fn dismiss_observer_count(&self) -> usize {
        self.dismiss_observers.borrow().len()
    }

    /// Simulate the host resizing this surface.
    pub fn emulate_resize(&self, width: u32, height: u32) {
        self.size.set((width, height));
        let observers: Vec<_> = {
            let map = self.size_observers.borrow();
            map.keys().cloned().collect()
        };
        for id in observers {
            let callback = self.size_observers.borrow();
            if let Some(callback) = callback.get(&id) {
                callback(width, height);
            }
        }
    }

    /// Simulate a dismiss gesture (close control, escape, outside click).
    pub fn emulate_dismiss(&self, signal: DismissSignal) {
        let ids: Vec<u64> = self.dismiss_observers.borrow().keys().cloned().collect();
        for id in ids {
            let map = self.dismiss_observers.borrow();
            if let Some(callback) = map.get(&id) {
                callback(signal);
            }
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn observe_size(&self, callback: Box<dyn Fn(u32, u32)>) -> Subscription {
        let id = self.next_id();
        self.size_observers.borrow_mut().insert(id, callback);
        let observers = Rc::clone(&self.size_observers);
        Subscription::new(move || {
            observers.borrow_mut().remove(&id);
        })
    }

    fn observe_dismiss(&self, callback: Box<dyn Fn(DismissSignal)>) -> Subscription {
        let id = self.next_id();
        self.dismiss_observers.borrow_mut().insert(id, callback);
        let observers = Rc::clone(&self.dismiss_observers);
        Subscription::new(move || {
            observers.borrow_mut().remove(&id);
        })
    }

    fn remove(&self) {
        self.removed.set(true);
    }
}

/// Chart that records operations instead of drawing.
pub struct HeadlessChart {
    symbol: Symbol,
    style: LineStyle,
    data: RefCell<Vec<SeriesPoint>>,
    range: Cell<Option<LogicalRange>>,
    disposed: Cell<bool>,
    next_id: Cell<u64>,
    subscribers: RangeObservers,
    set_data_calls: Cell<usize>,
    set_range_calls: Cell<usize>,
    fit_calls: Cell<usize>,
    resize_calls: RefCell<Vec<(u32, u32)>>,
}

impl HeadlessChart {
    fn new(symbol: Symbol, style: LineStyle) -> Self {
        Self {
            symbol,
            style,
            data: RefCell::new(Vec::new()),
            range: Cell::new(None),
            disposed: Cell::new(false),
            next_id: Cell::new(0),
            subscribers: Rc::new(RefCell::new(HashMap::new())),
            set_data_calls: Cell::new(0),
            set_range_calls: Cell::new(0),
            fit_calls: Cell::new(0),
            resize_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn data_len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn range(&self) -> Option<LogicalRange> {
        self.range.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Programmatic range writes received (broadcasts, joins, recenter).
    pub fn set_range_calls(&self) -> usize {
        self.set_range_calls.get()
    }

    pub fn set_data_calls(&self) -> usize {
        self.set_data_calls.get()
    }

    pub fn fit_calls(&self) -> usize {
        self.fit_calls.get()
    }

    pub fn resize_calls(&self) -> Vec<(u32, u32)> {
        self.resize_calls.borrow().clone()
    }

    /// Simulate a user drag/zoom: moves the range and fires notifications
    /// without counting as a programmatic write.
    pub fn emulate_user_range_change(&self, range: LogicalRange) {
        if self.disposed.get() {
            return;
        }
        self.range.set(Some(range));
        self.notify(range);
    }

    fn notify(&self, range: LogicalRange) {
        let subscribers: Vec<Rc<dyn Fn(LogicalRange)>> =
            self.subscribers.borrow().values().cloned().collect();
        for subscriber in subscribers {
            subscriber(range);
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl ChartApi for HeadlessChart {
    fn set_line_data(&self, points: &[SeriesPoint]) {
        if self.disposed.get() {
            return;
        }
        *self.data.borrow_mut() = points.to_vec();
        self.set_data_calls.set(self.set_data_calls.get() + 1);
    }

    fn resize(&self, width: u32, height: u32) -> RenderResult<()> {
        if self.disposed.get() {
            return Err(GridError::RenderSurface("chart disposed".to_string()));
        }
        self.resize_calls.borrow_mut().push((width, height));
        Ok(())
    }

    fn visible_range(&self) -> Option<LogicalRange> {
        if self.disposed.get() {
            return None;
        }
        self.range.get()
    }

    fn set_visible_range(&self, range: LogicalRange) -> RenderResult<()> {
        if self.disposed.get() {
            return Err(GridError::RenderSurface("chart disposed".to_string()));
        }
        self.range.set(Some(range));
        self.set_range_calls.set(self.set_range_calls.get() + 1);
        self.notify(range);
        Ok(())
    }

    fn fit_content(&self) {
        if self.disposed.get() {
            return;
        }
        self.fit_calls.set(self.fit_calls.get() + 1);
        let len = self.data.borrow().len();
        if len == 0 {
            return;
        }
        let range = LogicalRange::new(0.0, (len - 1) as f64);
        self.range.set(Some(range));
        self.notify(range);
    }

    fn subscribe_range_changes(&self, callback: Rc<dyn Fn(LogicalRange)>) -> Subscription {
        let id = self.next_id();
        self.subscribers.borrow_mut().insert(id, callback);
        let subscribers = Rc::clone(&self.subscribers);
        Subscription::new(move || {
            subscribers.borrow_mut().remove(&id);
        })
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.subscribers.borrow_mut().clear();
    }
}

#[derive(Default)]
struct FactoryState {
    surfaces: RefCell<Vec<Rc<HeadlessSurface>>>,
    charts: RefCell<Vec<Rc<HeadlessChart>>>,
    fail_next_create: Cell<bool>,
}

/// Factory producing in-memory surfaces and charts, keeping handles to
/// everything it created for later inspection.
#[derive(Clone, Default)]
pub struct HeadlessChartFactory {
    state: Rc<FactoryState>,
}

impl HeadlessChartFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` fail, to exercise the broken-surface path.
    pub fn fail_next_create(&self) {
        self.state.fail_next_create.set(true);
    }

    pub fn created_count(&self) -> usize {
        self.state.charts.borrow().len()
    }

    /// Most recent live (not disposed) chart for `symbol` in the grid.
    pub fn grid_chart(&self, symbol: &Symbol) -> Option<Rc<HeadlessChart>> {
        self.state
            .charts
            .borrow()
            .iter()
            .rev()
            .find(|c| c.symbol() == symbol && !c.is_disposed())
            .cloned()
    }

    /// Every chart ever created for `symbol`, oldest first.
    pub fn charts_for(&self, symbol: &Symbol) -> Vec<Rc<HeadlessChart>> {
        self.state
            .charts
            .borrow()
            .iter()
            .filter(|c| c.symbol() == symbol)
            .cloned()
            .collect()
    }

    pub fn grid_surface(&self, symbol: &Symbol) -> Option<Rc<HeadlessSurface>> {
        self.state
            .surfaces
            .borrow()
            .iter()
            .rev()
            .find(|s| s.symbol() == symbol && s.kind() == SurfaceKind::GridCell && !s.is_removed())
            .cloned()
    }

    /// The currently mounted fullscreen surface, if any.
    pub fn stage_surface(&self) -> Option<Rc<HeadlessSurface>> {
        self.state
            .surfaces
            .borrow()
            .iter()
            .rev()
            .find(|s| s.kind() == SurfaceKind::FullscreenStage && !s.is_removed())
            .cloned()
    }

    pub fn stage_chart(&self) -> Option<Rc<HeadlessChart>> {
        let surface = self.stage_surface()?;
        self.state
            .charts
            .borrow()
            .iter()
            .rev()
            .find(|c| c.symbol() == surface.symbol() && !c.is_disposed())
            .cloned()
    }

    /// All surfaces ever created, removed ones included.
    pub fn surfaces(&self) -> Vec<Rc<HeadlessSurface>> {
        self.state.surfaces.borrow().clone()
    }
}

impl ChartFactory for HeadlessChartFactory {
    fn create(
        &self,
        symbol: &Symbol,
        kind: SurfaceKind,
        style: LineStyle,
    ) -> RenderResult<MountedChart> {
        if self.state.fail_next_create.replace(false) {
            return Err(GridError::RenderSurface(format!(
                "simulated mount failure for {}",
                symbol.value()
            )));
        }
        let surface = Rc::new(HeadlessSurface::new(symbol.clone(), kind));
        let chart = Rc::new(HeadlessChart::new(symbol.clone(), style));
        self.state.surfaces.borrow_mut().push(Rc::clone(&surface));
        self.state.charts.borrow_mut().push(Rc::clone(&chart));
        Ok(MountedChart { surface, chart })
    }
}
