//! WASM API for JavaScript hosts. Minimal logic: a bridge from DOM-facing
//! calls to the application layer, plus signal publishing for reactive
//! UIs.

use std::rc::Rc;
use std::str::FromStr;

use js_sys::Array;
use leptos::{SignalSet, SignalUpdate};
use wasm_bindgen::prelude::*;

use crate::application::{
    GridCoordinator, GridDeps, clear_grid_coordinator, install_grid_coordinator,
    with_grid_coordinator,
};
use crate::domain::grid::{GridConfig, ToggleChange};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Granularity, Symbol, Timestamp};
use crate::global_state;
use crate::infrastructure::http::TimeseriesHttpClient;
use crate::infrastructure::platform::{
    AnimationFrameScheduler, BrowserDelayScheduler, WasmTaskSpawner,
};
use crate::infrastructure::rendering::DomChartFactory;

/// Grid API handle exposed to JavaScript.
#[wasm_bindgen]
pub struct MarketGridApi {
    initialized: bool,
}

#[wasm_bindgen]
impl MarketGridApi {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Mount the grid into `container_id` and load the initial selection.
    #[wasm_bindgen(js_name = initializeGrid)]
    pub fn initialize_grid(&mut self, container_id: String) -> Result<(), JsValue> {
        let factory = DomChartFactory::new(&container_id)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let deps = GridDeps {
            factory: Rc::new(factory),
            repository: Rc::new(TimeseriesHttpClient::new()),
            spawner: Rc::new(WasmTaskSpawner),
            frames: Rc::new(AnimationFrameScheduler),
            timers: Rc::new(BrowserDelayScheduler),
        };
        let coordinator = GridCoordinator::new(GridConfig::default(), deps);

        coordinator.set_overlay_listener(Rc::new(|symbol, state| {
            global_state::overlay_states().update(|map| {
                map.insert(symbol.clone(), state);
            });
        }));
        coordinator.set_bump_listener(Rc::new(|bumped| {
            global_state::bumped_symbol().set(bumped);
        }));

        coordinator.bootstrap();
        publish_selection(&coordinator);
        install_grid_coordinator(coordinator);
        self.initialized = true;

        get_logger().info(
            LogComponent::Presentation("GridApi"),
            &format!("grid mounted in #{}", container_id),
        );
        Ok(())
    }

    /// Select or deselect a symbol.
    #[wasm_bindgen(js_name = toggleSymbol)]
    pub fn toggle_symbol(&self, symbol: String) -> Result<(), JsValue> {
        with_grid_coordinator(|coordinator| {
            let symbol = Symbol::from(symbol.as_str());
            let change = coordinator.toggle(&symbol);
            let gone = match &change {
                ToggleChange::Removed(symbol) => Some(symbol.clone()),
                ToggleChange::Replaced { evicted, .. } => Some(evicted.clone()),
                ToggleChange::Added(_) => None,
            };
            if let Some(gone) = gone {
                global_state::overlay_states().update(|map| {
                    map.remove(&gone);
                });
            }
            publish_selection(coordinator);
        })
        .ok_or_else(not_initialized)
    }

    /// Switch the sampling window ("1D" | "1W" | "1M" | "1Y") and refetch
    /// every visible symbol.
    #[wasm_bindgen(js_name = setGranularity)]
    pub fn set_granularity(&self, granularity: String) -> Result<(), JsValue> {
        let granularity = Granularity::from_str(&granularity)
            .map_err(|_| JsValue::from_str(&format!("invalid granularity: {}", granularity)))?;
        with_grid_coordinator(|coordinator| {
            coordinator.set_granularity(granularity);
            global_state::granularity().set(granularity);
        })
        .ok_or_else(not_initialized)
    }

    /// Recenter every chart on a wall-clock date (epoch seconds).
    #[wasm_bindgen(js_name = recenterTo)]
    pub fn recenter_to(&self, epoch_seconds: f64) -> Result<(), JsValue> {
        with_grid_coordinator(|coordinator| {
            coordinator.recenter(Timestamp::from_secs(epoch_seconds.max(0.0) as u64));
        })
        .ok_or_else(not_initialized)
    }

    #[wasm_bindgen(js_name = openFullscreen)]
    pub fn open_fullscreen(&self, symbol: String) -> Result<(), JsValue> {
        with_grid_coordinator(|coordinator| {
            let symbol = Symbol::from(symbol.as_str());
            coordinator
                .open_fullscreen(&symbol)
                .map_err(|err| JsValue::from_str(&err.to_string()))?;
            global_state::fullscreen_symbol().set(Some(symbol));
            Ok(())
        })
        .unwrap_or_else(|| Err(not_initialized()))
    }

    #[wasm_bindgen(js_name = closeFullscreen)]
    pub fn close_fullscreen(&self) {
        let _ = with_grid_coordinator(|coordinator| coordinator.close_fullscreen());
        global_state::fullscreen_symbol().set(None);
    }

    /// The fixed symbol universe a picker offers.
    #[wasm_bindgen(js_name = symbolUniverse)]
    pub fn symbol_universe(&self) -> Array {
        crate::domain::chart::symbol_universe()
            .iter()
            .map(|s| JsValue::from_str(s.value()))
            .collect::<Array>()
    }

    /// CSS color for a symbol, as used by its chart line and badge.
    #[wasm_bindgen(js_name = colorFor)]
    pub fn color_for(&self, symbol: String) -> String {
        crate::domain::chart::color_for(&Symbol::from(symbol.as_str())).to_css()
    }

    /// Current selection, in slot order.
    #[wasm_bindgen(js_name = selectedSymbols)]
    pub fn selected_symbols(&self) -> Array {
        with_grid_coordinator(|coordinator| {
            coordinator
                .selection()
                .iter()
                .map(|s| JsValue::from_str(s.value()))
                .collect::<Array>()
        })
        .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = bumpedSymbol)]
    pub fn bumped_symbol(&self) -> Option<String> {
        with_grid_coordinator(|c| c.bumped().map(|s| s.value().to_string())).flatten()
    }

    /// Overlay state class for a symbol: "loading" | "error" | "empty" |
    /// "ready".
    #[wasm_bindgen(js_name = overlayOf)]
    pub fn overlay_of(&self, symbol: String) -> Option<String> {
        with_grid_coordinator(|c| {
            c.overlay_of(&Symbol::from(symbol.as_str()))
                .map(|state| state.css_class().to_string())
        })
        .flatten()
    }

    #[wasm_bindgen(js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Tear the grid down and release every chart, surface, and listener.
    pub fn dispose(&mut self) {
        clear_grid_coordinator();
        global_state::fullscreen_symbol().set(None);
        self.initialized = false;
    }
}

impl Default for MarketGridApi {
    fn default() -> Self {
        Self::new()
    }
}

fn publish_selection(coordinator: &GridCoordinator) {
    global_state::selected_symbols().set(coordinator.selection());
}

fn not_initialized() -> JsValue {
    JsValue::from_str("grid not initialized")
}
