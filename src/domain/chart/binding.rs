use std::rc::Rc;

use crate::domain::chart::value_objects::{LineStyle, LogicalRange};
use crate::domain::errors::RenderResult;
use crate::domain::market_data::{SeriesPoint, Symbol};

/// RAII listener registration. Dropping the subscription detaches the
/// listener; detaching twice is a no-op. Guarantees release on every exit
/// path, including error paths.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// Subscription with nothing to release.
    pub fn none() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Where a surface lives: a cell inside the grid, or the standalone
/// fullscreen stage layered above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    GridCell,
    FullscreenStage,
}

/// User gestures that dismiss the fullscreen stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissSignal {
    CloseControl,
    EscapeKey,
    OutsideClick,
}

/// Opaque mount target supplied by the host environment.
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);

    /// Observe size changes of the surface. The callback receives the new
    /// width/height; unclamped, the pool clamps before resizing the chart.
    fn observe_size(&self, callback: Box<dyn Fn(u32, u32)>) -> Subscription;

    /// Observe dismiss gestures (close control, escape, outside click).
    /// Only meaningful for `SurfaceKind::FullscreenStage`; grid cells keep
    /// the default no-op.
    fn observe_dismiss(&self, callback: Box<dyn Fn(DismissSignal)>) -> Subscription {
        let _ = callback;
        Subscription::none()
    }

    /// Remove the surface from the host. Idempotent.
    fn remove(&self);
}

/// One chart bound to one surface, holding a single line series.
pub trait ChartApi {
    /// Full replacement of the series data.
    fn set_line_data(&self, points: &[SeriesPoint]);

    fn resize(&self, width: u32, height: u32) -> RenderResult<()>;

    /// Current visible logical range, `None` before any data or range was
    /// applied.
    fn visible_range(&self) -> Option<LogicalRange>;

    fn set_visible_range(&self, range: LogicalRange) -> RenderResult<()>;

    /// Fit the view to the full data extent.
    fn fit_content(&self);

    /// Notifies on every visible-range change, user-driven or programmatic.
    fn subscribe_range_changes(&self, callback: Rc<dyn Fn(LogicalRange)>) -> Subscription;

    /// Release the chart's resources. Idempotent; operations on a disposed
    /// chart return `RenderSurface` errors instead of panicking.
    fn dispose(&self);
}

/// Surface plus chart, mounted and ready for data.
pub struct MountedChart {
    pub surface: Rc<dyn RenderSurface>,
    pub chart: Rc<dyn ChartApi>,
}

/// Factory the host environment implements to supply concrete surfaces and
/// charts. The grid owns lifecycles; the factory owns representation.
pub trait ChartFactory {
    fn create(
        &self,
        symbol: &Symbol,
        kind: SurfaceKind,
        style: LineStyle,
    ) -> RenderResult<MountedChart>;
}
