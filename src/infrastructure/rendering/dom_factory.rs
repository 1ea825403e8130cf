//! Browser chart binding: DOM cells, a 2-D canvas line renderer, and the
//! host listeners (resize observation, drag panning, wheel zoom, stage
//! dismissal). Everything the grid core sees goes through the
//! `domain::chart` traits; nothing here leaks upward.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
    ResizeObserver, WheelEvent,
};

use crate::domain::chart::{
    ChartApi, ChartFactory, DismissSignal, LineStyle, LogicalRange, MountedChart, RenderSurface,
    Subscription, SurfaceKind,
};
use crate::domain::errors::{GridError, RenderResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{SeriesPoint, Symbol};

const CELL_STYLE: &str = "position:relative;border:1px solid #1e1e22;border-radius:12px;\
    background:#0b0b0c;box-shadow:0 2px 8px rgba(0,0,0,.35);overflow:hidden;min-height:260px;";
const BADGE_STYLE: &str = "position:absolute;left:8px;top:6px;z-index:5;padding:2px 8px;\
    font-size:12px;border-radius:8px;";
const BACKDROP_STYLE: &str =
    "position:fixed;inset:0;z-index:50;background:rgba(0,0,0,.9);padding:12px;";
const PANEL_STYLE: &str = "position:relative;width:100%;height:100%;border-radius:12px;\
    background:#0b0b0c;overflow:hidden;";
const CLOSE_STYLE: &str = "position:absolute;right:8px;top:6px;z-index:5;padding:2px 10px;\
    border-radius:8px;background:#7f1d1d;color:#e5e7eb;cursor:pointer;";

fn js_error(context: &str, err: JsValue) -> GridError {
    GridError::RenderSurface(format!("{}: {:?}", context, err))
}

/// Builds grid cells and fullscreen stages in the document.
pub struct DomChartFactory {
    document: Document,
    grid_container: HtmlElement,
}

impl DomChartFactory {
    pub fn new(container_id: &str) -> RenderResult<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| GridError::RenderSurface("document unavailable".to_string()))?;
        let grid_container = document
            .get_element_by_id(container_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| {
                GridError::RenderSurface(format!("container #{} not found", container_id))
            })?;
        Ok(Self { document, grid_container })
    }

    fn make_element(&self, tag: &str, style: &str) -> RenderResult<HtmlElement> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|e| js_error("create_element", e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| GridError::RenderSurface("element cast failed".to_string()))?;
        element
            .set_attribute("style", style)
            .map_err(|e| js_error("set style", e))?;
        Ok(element)
    }

    fn make_canvas(&self, parent: &HtmlElement) -> RenderResult<HtmlCanvasElement> {
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(|e| js_error("create canvas", e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| GridError::RenderSurface("canvas cast failed".to_string()))?;
        canvas
            .set_attribute("style", "display:block;width:100%;height:100%;")
            .map_err(|e| js_error("canvas style", e))?;
        parent
            .append_child(&canvas)
            .map_err(|e| js_error("mount canvas", e))?;
        let rect = parent.get_bounding_client_rect();
        canvas.set_width((rect.width() as u32).max(10));
        canvas.set_height((rect.height() as u32).max(10));
        Ok(canvas)
    }

    fn create_cell(&self, symbol: &Symbol, style: LineStyle) -> RenderResult<MountedChart> {
        let cell = self.make_element("div", CELL_STYLE)?;

        let badge = self.make_element("div", BADGE_STYLE)?;
        badge.set_text_content(Some(symbol.value()));
        let color = style.color.to_css();
        let _ = badge.style().set_property("color", &color);
        let _ = badge.style().set_property("background", &format!("{}33", color));
        cell.append_child(&badge).map_err(|e| js_error("mount badge", e))?;

        let canvas = self.make_canvas(&cell)?;
        self.grid_container
            .append_child(&cell)
            .map_err(|e| js_error("mount cell", e))?;

        let surface = Rc::new(DomSurface {
            document: self.document.clone(),
            root: cell,
            close_control: None,
            kind: SurfaceKind::GridCell,
            removed: Cell::new(false),
        });
        let chart = DomChart::new(canvas, style)?;
        Ok(MountedChart { surface, chart: Rc::new(chart) })
    }

    fn create_stage(&self, symbol: &Symbol, style: LineStyle) -> RenderResult<MountedChart> {
        let backdrop = self.make_element("div", BACKDROP_STYLE)?;
        let panel = self.make_element("div", PANEL_STYLE)?;

        let badge = self.make_element("div", BADGE_STYLE)?;
        badge.set_text_content(Some(symbol.value()));
        let color = style.color.to_css();
        let _ = badge.style().set_property("color", &color);
        let _ = badge.style().set_property("background", &format!("{}33", color));
        panel.append_child(&badge).map_err(|e| js_error("mount badge", e))?;

        let close = self.make_element("div", CLOSE_STYLE)?;
        close.set_text_content(Some("✕"));
        panel.append_child(&close).map_err(|e| js_error("mount close", e))?;

        let canvas = self.make_canvas(&panel)?;
        backdrop
            .append_child(&panel)
            .map_err(|e| js_error("mount panel", e))?;
        self.document
            .body()
            .ok_or_else(|| GridError::RenderSurface("no body".to_string()))?
            .append_child(&backdrop)
            .map_err(|e| js_error("mount stage", e))?;

        let surface = Rc::new(DomSurface {
            document: self.document.clone(),
            root: backdrop,
            close_control: Some(close),
            kind: SurfaceKind::FullscreenStage,
            removed: Cell::new(false),
        });
        let chart = DomChart::new(canvas, style)?;
        Ok(MountedChart { surface, chart: Rc::new(chart) })
    }
}

impl ChartFactory for DomChartFactory {
    fn create(
        &self,
        symbol: &Symbol,
        kind: SurfaceKind,
        style: LineStyle,
    ) -> RenderResult<MountedChart> {
        match kind {
            SurfaceKind::GridCell => self.create_cell(symbol, style),
            SurfaceKind::FullscreenStage => self.create_stage(symbol, style),
        }
    }
}

/// A DOM mount target: a grid cell, or a stage backdrop with its panel.
pub struct DomSurface {
    document: Document,
    root: HtmlElement,
    close_control: Option<HtmlElement>,
    kind: SurfaceKind,
    removed: Cell<bool>,
}

impl RenderSurface for DomSurface {
    fn size(&self) -> (u32, u32) {
        let rect = self.root.get_bounding_client_rect();
        (rect.width() as u32, rect.height() as u32)
    }

    fn observe_size(&self, callback: Box<dyn Fn(u32, u32)>) -> Subscription {
        let root = self.root.clone();
        let closure = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |_entries: js_sys::Array, _observer: ResizeObserver| {
                let rect = root.get_bounding_client_rect();
                callback(rect.width() as u32, rect.height() as u32);
            },
        );
        match ResizeObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.root);
                Subscription::new(move || {
                    observer.disconnect();
                    drop(closure);
                })
            }
            Err(err) => {
                get_logger().warn(
                    LogComponent::Infrastructure("DomChart"),
                    &format!("ResizeObserver unavailable: {:?}", err),
                );
                Subscription::none()
            }
        }
    }

    fn observe_dismiss(&self, callback: Box<dyn Fn(DismissSignal)>) -> Subscription {
        if self.kind != SurfaceKind::FullscreenStage {
            return Subscription::none();
        }
        let callback: Rc<dyn Fn(DismissSignal)> = Rc::from(callback);
        let mut listeners = Vec::new();

        if let Some(close) = &self.close_control {
            let cb = Rc::clone(&callback);
            listeners.push(EventListener::new(close, "click", move |_event| {
                cb(DismissSignal::CloseControl);
            }));
        }

        let cb = Rc::clone(&callback);
        listeners.push(EventListener::new(&self.document, "keydown", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                if event.key() == "Escape" {
                    cb(DismissSignal::EscapeKey);
                }
            }
        }));

        // A press landing on the backdrop itself is outside the panel.
        let cb = Rc::clone(&callback);
        let root = self.root.clone();
        listeners.push(EventListener::new(&self.root, "mousedown", move |event| {
            let on_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Node>().ok())
                .map(|node| root.is_same_node(Some(&node)))
                .unwrap_or(false);
            if on_backdrop {
                cb(DismissSignal::OutsideClick);
            }
        }));

        Subscription::new(move || drop(listeners))
    }

    fn remove(&self) {
        if self.removed.replace(true) {
            return;
        }
        self.root.remove();
    }
}

struct DomChartState {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    style: LineStyle,
    data: RefCell<Vec<SeriesPoint>>,
    range: Cell<Option<LogicalRange>>,
    disposed: Cell<bool>,
    dragging: Cell<bool>,
    last_x: Cell<f64>,
    next_id: Cell<u64>,
    subscribers: RefCell<HashMap<u64, Rc<dyn Fn(LogicalRange)>>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl DomChartState {
    fn full_range(&self) -> Option<LogicalRange> {
        let len = self.data.borrow().len();
        if len == 0 {
            None
        } else {
            Some(LogicalRange::new(0.0, (len - 1) as f64))
        }
    }

    fn interaction_range(&self) -> Option<LogicalRange> {
        self.range.get().or_else(|| self.full_range())
    }

    /// User-driven range move: store, notify, redraw.
    fn apply_user_range(&self, range: LogicalRange) {
        if self.disposed.get() {
            return;
        }
        self.range.set(Some(range));
        self.notify(range);
        self.draw();
    }

    fn notify(&self, range: LogicalRange) {
        let subscribers: Vec<Rc<dyn Fn(LogicalRange)>> =
            self.subscribers.borrow().values().cloned().collect();
        for subscriber in subscribers {
            subscriber(range);
        }
    }

    fn draw(&self) {
        if self.disposed.get() {
            return;
        }
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        self.context.clear_rect(0.0, 0.0, width, height);

        let data = self.data.borrow();
        if data.is_empty() {
            return;
        }
        let range = match self.range.get() {
            Some(range) => range,
            None => LogicalRange::new(0.0, (data.len() - 1) as f64),
        };
        let span = range.width().max(f64::EPSILON);
        let first = range.from.floor().max(0.0) as usize;
        let last = (range.to.ceil() as usize).min(data.len() - 1);
        if first > last {
            return;
        }

        let slice = &data[first..=last];
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;
        for point in slice {
            low = low.min(point.value.value());
            high = high.max(point.value.value());
        }
        let vspan = (high - low).max(f64::EPSILON);
        let pad = 4.0;

        self.context.begin_path();
        self.context
            .set_stroke_style(&JsValue::from_str(&self.style.color.to_css()));
        self.context.set_line_width(self.style.width as f64);
        for (offset, point) in slice.iter().enumerate() {
            let index = (first + offset) as f64;
            let x = (index - range.from) / span * width;
            let y = pad + (1.0 - (point.value.value() - low) / vspan) * (height - 2.0 * pad);
            if offset == 0 {
                self.context.move_to(x, y);
            } else {
                self.context.line_to(x, y);
            }
        }
        self.context.stroke();
    }
}

/// Canvas line chart with drag panning and wheel zoom.
pub struct DomChart {
    state: Rc<DomChartState>,
}

impl DomChart {
    fn new(canvas: HtmlCanvasElement, style: LineStyle) -> RenderResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| js_error("get 2d context", e))?
            .ok_or_else(|| GridError::RenderSurface("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GridError::RenderSurface("context cast failed".to_string()))?;

        let state = Rc::new(DomChartState {
            canvas,
            context,
            style,
            data: RefCell::new(Vec::new()),
            range: Cell::new(None),
            disposed: Cell::new(false),
            dragging: Cell::new(false),
            last_x: Cell::new(0.0),
            next_id: Cell::new(0),
            subscribers: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
        });
        Self::attach_input(&state);
        Ok(Self { state })
    }

    fn attach_input(state: &Rc<DomChartState>) {
        let mut listeners = Vec::new();

        let s = Rc::clone(state);
        listeners.push(EventListener::new(&state.canvas, "mousedown", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                s.dragging.set(true);
                s.last_x.set(event.client_x() as f64);
            }
        }));

        let s = Rc::clone(state);
        listeners.push(EventListener::new(&state.canvas, "mousemove", move |event| {
            if !s.dragging.get() {
                return;
            }
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(range) = s.interaction_range() else {
                return;
            };
            let x = event.client_x() as f64;
            let dx = x - s.last_x.get();
            s.last_x.set(x);
            let width_px = (s.canvas.width() as f64).max(1.0);
            let shift = -dx / width_px * range.width();
            s.apply_user_range(LogicalRange::new(range.from + shift, range.to + shift));
        }));

        for done in ["mouseup", "mouseleave"] {
            let s = Rc::clone(state);
            listeners.push(EventListener::new(&state.canvas, done, move |_event| {
                s.dragging.set(false);
            }));
        }

        let s = Rc::clone(state);
        listeners.push(EventListener::new_with_options(
            &state.canvas,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                let Some(range) = s.interaction_range() else {
                    return;
                };
                let factor = if event.delta_y() < 0.0 { 0.85 } else { 1.18 };
                let rect = s.canvas.get_bounding_client_rect();
                let ratio = if rect.width() > 0.0 {
                    ((event.client_x() as f64 - rect.left()) / rect.width()).clamp(0.0, 1.0)
                } else {
                    0.5
                };
                let new_width = (range.width() * factor).max(2.0);
                let anchor = range.from + range.width() * ratio;
                let from = anchor - new_width * ratio;
                s.apply_user_range(LogicalRange::new(from, from + new_width));
            },
        ));

        *state.listeners.borrow_mut() = listeners;
    }
}

impl ChartApi for DomChart {
    fn set_line_data(&self, points: &[SeriesPoint]) {
        if self.state.disposed.get() {
            return;
        }
        *self.state.data.borrow_mut() = points.to_vec();
        self.state.draw();
    }

    fn resize(&self, width: u32, height: u32) -> RenderResult<()> {
        if self.state.disposed.get() {
            return Err(GridError::RenderSurface("chart disposed".to_string()));
        }
        self.state.canvas.set_width(width);
        self.state.canvas.set_height(height);
        self.state.draw();
        Ok(())
    }

    fn visible_range(&self) -> Option<LogicalRange> {
        if self.state.disposed.get() {
            return None;
        }
        self.state.range.get()
    }

    fn set_visible_range(&self, range: LogicalRange) -> RenderResult<()> {
        if self.state.disposed.get() {
            return Err(GridError::RenderSurface("chart disposed".to_string()));
        }
        self.state.range.set(Some(range));
        self.state.notify(range);
        self.state.draw();
        Ok(())
    }

    fn fit_content(&self) {
        if self.state.disposed.get() {
            return;
        }
        if let Some(range) = self.state.full_range() {
            self.state.range.set(Some(range));
            self.state.notify(range);
        }
        self.state.draw();
    }

    fn subscribe_range_changes(&self, callback: Rc<dyn Fn(LogicalRange)>) -> Subscription {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        self.state.subscribers.borrow_mut().insert(id, callback);
        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.subscribers.borrow_mut().remove(&id);
            }
        })
    }

    fn dispose(&self) {
        if self.state.disposed.replace(true) {
            return;
        }
        self.state.listeners.borrow_mut().clear();
        self.state.subscribers.borrow_mut().clear();
    }
}
