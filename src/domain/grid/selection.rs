use std::cell::RefCell;
use std::rc::Rc;

use crate::domain::logging::get_time_provider;
use crate::domain::market_data::Symbol;
use crate::domain::platform::{DelayScheduler, ScheduledTimeout};

/// Transient highlight on the symbol most recently evicted from the last
/// slot. At most one is active; a newer bump supersedes a pending one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpEvent {
    pub symbol: Symbol,
    /// Epoch milliseconds at which the highlight auto-clears.
    pub expires_at: u64,
}

/// Outcome of a single `toggle` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleChange {
    Removed(Symbol),
    Added(Symbol),
    /// At capacity: the last slot was replaced and its occupant bumped.
    Replaced { added: Symbol, evicted: Symbol },
}

type BumpListener = Rc<dyn Fn(Option<Symbol>)>;

#[derive(Default)]
struct SelectionState {
    selected: Vec<Symbol>,
    bump: Option<BumpEvent>,
    bump_timer: Option<ScheduledTimeout>,
    /// Monotonic sequence distinguishing a live bump from a superseded one
    /// whose timer is still pending.
    bump_seq: u64,
    bump_listener: Option<BumpListener>,
}

impl SelectionState {
    fn bump_listener(&self) -> Option<BumpListener> {
        self.bump_listener.clone()
    }
}

/// Ordered, capacity-bounded selection with bump-eviction. The bump timer
/// is owned here, not ambient global state; it is cancelled and
/// rescheduled whenever a new eviction supersedes a pending highlight.
pub struct SelectionModel {
    capacity: usize,
    bump_ttl_ms: u32,
    timers: Rc<dyn DelayScheduler>,
    state: Rc<RefCell<SelectionState>>,
}

impl SelectionModel {
    pub fn new(capacity: usize, bump_ttl_ms: u32, timers: Rc<dyn DelayScheduler>) -> Self {
        Self {
            capacity,
            bump_ttl_ms,
            timers,
            state: Rc::new(RefCell::new(SelectionState::default())),
        }
    }

    /// Seed the initial selection. Duplicates collapse to their first
    /// occurrence; overflow beyond capacity is dropped.
    pub fn seed(&self, symbols: &[Symbol]) {
        let mut state = self.state.borrow_mut();
        state.selected.clear();
        for symbol in symbols {
            if state.selected.len() == self.capacity {
                break;
            }
            if !state.selected.contains(symbol) {
                state.selected.push(symbol.clone());
            }
        }
    }

    /// Select or deselect a symbol. Never fails; the resulting list always
    /// satisfies `len <= capacity`.
    pub fn toggle(&self, symbol: &Symbol) -> ToggleChange {
        // Any interaction retires the current highlight immediately.
        self.clear_bump();

        let mut state = self.state.borrow_mut();
        if let Some(position) = state.selected.iter().position(|s| s == symbol) {
            let removed = state.selected.remove(position);
            return ToggleChange::Removed(removed);
        }

        if state.selected.len() < self.capacity {
            state.selected.push(symbol.clone());
            return ToggleChange::Added(symbol.clone());
        }

        // At capacity: the fixed last slot makes way.
        let last = self.capacity - 1;
        let evicted = std::mem::replace(&mut state.selected[last], symbol.clone());
        state.bump_seq += 1;
        let seq = state.bump_seq;
        let expires_at = get_time_provider().current_timestamp() + self.bump_ttl_ms as u64;
        state.bump = Some(BumpEvent { symbol: evicted.clone(), expires_at });

        let shared = Rc::clone(&self.state);
        let timer = self.timers.schedule(
            self.bump_ttl_ms,
            Box::new(move || {
                let listener = {
                    let mut state = shared.borrow_mut();
                    // A later eviction owns the highlight now; leave it
                    // alone. The stale timer handle is reclaimed on the
                    // next toggle.
                    if state.bump_seq != seq {
                        return;
                    }
                    state.bump = None;
                    state.bump_listener()
                };
                if let Some(listener) = listener {
                    listener(None);
                }
            }),
        );
        state.bump_timer = Some(timer);
        let listener = state.bump_listener();
        drop(state);
        if let Some(listener) = listener {
            listener(Some(evicted.clone()));
        }

        ToggleChange::Replaced { added: symbol.clone(), evicted }
    }

    pub fn selected(&self) -> Vec<Symbol> {
        self.state.borrow().selected.clone()
    }

    /// The visible subset: the first `capacity` entries. The list never
    /// grows past capacity, so this is the whole selection.
    pub fn visible(&self) -> Vec<Symbol> {
        let state = self.state.borrow();
        state.selected.iter().take(self.capacity).cloned().collect()
    }

    pub fn is_selected(&self, symbol: &Symbol) -> bool {
        self.state.borrow().selected.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().selected.is_empty()
    }

    /// Currently highlighted (just-evicted) symbol, if any.
    pub fn bumped(&self) -> Option<Symbol> {
        self.state.borrow().bump.as_ref().map(|b| b.symbol.clone())
    }

    pub fn bump_event(&self) -> Option<BumpEvent> {
        self.state.borrow().bump.clone()
    }

    /// Observer for bump transitions: `Some(symbol)` on eviction, `None`
    /// when the highlight clears (interaction or expiry).
    pub fn set_bump_listener(&self, listener: Rc<dyn Fn(Option<Symbol>)>) {
        self.state.borrow_mut().bump_listener = Some(listener);
    }

    fn clear_bump(&self) {
        let (timer, listener) = {
            let mut state = self.state.borrow_mut();
            let had_bump = state.bump.take().is_some();
            let listener = had_bump.then(|| state.bump_listener()).flatten();
            (state.bump_timer.take(), listener)
        };
        // Cancel outside the borrow; the scheduler may reenter.
        if let Some(timer) = timer {
            timer.cancel();
        }
        if let Some(listener) = listener {
            listener(None);
        }
    }
}
