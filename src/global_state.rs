//! Reactive state published for host UIs: which symbols are visible, the
//! transient bump highlight, per-symbol overlay states, and the fullscreen
//! symbol. The coordinator writes; UI layers subscribe.

use std::collections::HashMap;

use leptos::*;
use once_cell::sync::OnceCell;

use crate::domain::grid::OverlayState;
use crate::domain::market_data::{Granularity, Symbol};
use crate::global_signals;

pub struct Globals {
    pub selected_symbols: RwSignal<Vec<Symbol>>,
    pub bumped_symbol: RwSignal<Option<Symbol>>,
    pub granularity: RwSignal<Granularity>,
    pub overlay_states: RwSignal<HashMap<Symbol, OverlayState>>,
    pub fullscreen_symbol: RwSignal<Option<Symbol>>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        selected_symbols: create_rw_signal(Vec::new()),
        bumped_symbol: create_rw_signal(None),
        granularity: create_rw_signal(Granularity::default()),
        overlay_states: create_rw_signal(HashMap::new()),
        fullscreen_symbol: create_rw_signal(None),
    })
}

global_signals! {
    pub selected_symbols => selected_symbols: Vec<Symbol>,
    pub bumped_symbol => bumped_symbol: Option<Symbol>,
    pub granularity => granularity: Granularity,
    pub overlay_states => overlay_states: HashMap<Symbol, OverlayState>,
    pub fullscreen_symbol => fullscreen_symbol: Option<Symbol>,
}
