use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::domain::chart::{ChartApi, LogicalRange, Subscription};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::Symbol;
use crate::domain::platform::FrameScheduler;

struct SyncMember {
    symbol: Symbol,
    chart: Rc<dyn ChartApi>,
    _range_sub: Subscription,
}

struct SyncGroupInner {
    members: RefCell<Vec<SyncMember>>,
    /// Reentrancy guard. Owned by this group alone; a second grid instance
    /// gets its own. While set, incoming range notifications are ignored,
    /// so the notifications fired by a broadcast cannot re-trigger one.
    broadcasting: Cell<bool>,
    frames: Rc<dyn FrameScheduler>,
}

/// Mirrors the visible logical range across every pooled viewport. The
/// fullscreen stage never joins, so its pan/zoom stays isolated.
#[derive(Clone)]
pub struct SyncGroup {
    inner: Rc<SyncGroupInner>,
}

impl SyncGroup {
    pub fn new(frames: Rc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(SyncGroupInner {
                members: RefCell::new(Vec::new()),
                broadcasting: Cell::new(false),
                frames,
            }),
        }
    }

    /// Add a viewport to the group. The joiner inherits the group's current
    /// range before it becomes interactive; only the first member fits to
    /// its own data extent.
    pub fn attach(&self, symbol: &Symbol, chart: Rc<dyn ChartApi>) {
        let inherited = self.current_range_excluding(symbol);
        self.silence_until_next_frame();
        match inherited {
            Some(range) => {
                // A member disposed mid-join is the pool's problem, not ours.
                let _ = chart.set_visible_range(range);
            }
            None => chart.fit_content(),
        }

        let weak = Rc::downgrade(&self.inner);
        let source = symbol.clone();
        let subscription = chart.subscribe_range_changes(Rc::new(move |_range| {
            if let Some(inner) = weak.upgrade() {
                SyncGroup { inner }.broadcast_from(&source);
            }
        }));

        self.inner.members.borrow_mut().push(SyncMember {
            symbol: symbol.clone(),
            chart,
            _range_sub: subscription,
        });
    }

    /// Remove a viewport and release its range listener. Safe to call for
    /// a symbol that was never attached.
    pub fn detach(&self, symbol: &Symbol) {
        self.inner.members.borrow_mut().retain(|m| &m.symbol != symbol);
    }

    /// Re-align one member to the group's current range (or its own full
    /// extent when it is alone). Used after a member's data lands, since
    /// replacing chart data can reset the view.
    pub fn align_member(&self, symbol: &Symbol) {
        let inherited = self.current_range_excluding(symbol);
        self.silence_until_next_frame();
        let members = self.inner.members.borrow();
        let Some(member) = members.iter().find(|m| &m.symbol == symbol) else {
            return;
        };
        match inherited {
            Some(range) => {
                let _ = member.chart.set_visible_range(range);
            }
            None => member.chart.fit_content(),
        }
    }

    /// Suppress broadcasts until the next frame tick. Programmatic range
    /// writes (join alignment, recentering) go through this so the
    /// notifications they fire do not mirror outward.
    pub fn silence_until_next_frame(&self) {
        if self.inner.broadcasting.replace(true) {
            // Already guarded; a release is scheduled.
            return;
        }
        self.release_guard_next_frame();
    }

    pub fn member_count(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_member(&self, symbol: &Symbol) -> bool {
        self.inner.members.borrow().iter().any(|m| &m.symbol == symbol)
    }

    /// The group's current range: the first member able to report one.
    pub fn current_range(&self) -> Option<LogicalRange> {
        self.inner
            .members
            .borrow()
            .iter()
            .find_map(|m| m.chart.visible_range())
    }

    fn current_range_excluding(&self, symbol: &Symbol) -> Option<LogicalRange> {
        self.inner
            .members
            .borrow()
            .iter()
            .filter(|m| &m.symbol != symbol)
            .find_map(|m| m.chart.visible_range())
    }

    fn broadcast_from(&self, source: &Symbol) {
        if self.inner.broadcasting.replace(true) {
            return;
        }

        {
            let members = self.inner.members.borrow();
            let range = members
                .iter()
                .find(|m| &m.symbol == source)
                .and_then(|m| m.chart.visible_range());
            if let Some(range) = range {
                for member in members.iter().filter(|m| &m.symbol != source) {
                    if let Err(err) = member.chart.set_visible_range(range) {
                        // Disposed mid-broadcast; reconcile drops it shortly.
                        get_logger().debug(
                            LogComponent::Application("SyncGroup"),
                            &format!("skipping {}: {}", member.symbol.value(), err),
                        );
                    }
                }
            }
        }

        self.release_guard_next_frame();
    }

    fn release_guard_next_frame(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.frames.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.broadcasting.set(false);
            }
        }));
    }
}
