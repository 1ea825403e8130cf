use std::collections::HashSet;
use std::rc::Rc;

use market_grid_wasm::domain::grid::{SelectionModel, ToggleChange};
use market_grid_wasm::domain::market_data::Symbol;
use market_grid_wasm::infrastructure::platform::ManualDelayScheduler;
use quickcheck_macros::quickcheck;

const UNIVERSE: [&str; 8] = [
    "MOVE", "GOLD", "SILVER", "WTI", "US10Y", "VIX", "SPY", "QQQ",
];

fn model() -> SelectionModel {
    SelectionModel::new(4, 2_000, Rc::new(ManualDelayScheduler::new()))
}

#[quickcheck]
fn any_toggle_sequence_respects_capacity_and_uniqueness(ops: Vec<u8>) -> bool {
    let model = model();
    for op in ops {
        let symbol = Symbol::from(UNIVERSE[op as usize % UNIVERSE.len()]);
        model.toggle(&symbol);

        let selected = model.selected();
        if selected.len() > 4 {
            return false;
        }
        let unique: HashSet<&Symbol> = selected.iter().collect();
        if unique.len() != selected.len() {
            return false;
        }
    }
    true
}

#[test]
fn toggling_a_visible_symbol_removes_exactly_that_symbol() {
    let model = model();
    model.seed(&[
        Symbol::from("SPY"),
        Symbol::from("QQQ"),
        Symbol::from("VIX"),
    ]);

    // Middle of the list, not just the tail.
    let change = model.toggle(&Symbol::from("QQQ"));
    assert_eq!(change, ToggleChange::Removed(Symbol::from("QQQ")));
    assert_eq!(model.selected(), vec![Symbol::from("SPY"), Symbol::from("VIX")]);
}

#[test]
fn toggling_below_capacity_appends() {
    let model = model();
    model.seed(&[Symbol::from("SPY")]);

    let change = model.toggle(&Symbol::from("GOLD"));
    assert_eq!(change, ToggleChange::Added(Symbol::from("GOLD")));
    assert_eq!(model.selected(), vec![Symbol::from("SPY"), Symbol::from("GOLD")]);
}

#[test]
fn seed_collapses_duplicates_and_overflow() {
    let model = model();
    model.seed(&[
        Symbol::from("SPY"),
        Symbol::from("SPY"),
        Symbol::from("QQQ"),
        Symbol::from("VIX"),
        Symbol::from("US10Y"),
        Symbol::from("GOLD"),
    ]);
    assert_eq!(model.len(), 4);
    assert_eq!(model.selected()[0], Symbol::from("SPY"));
    assert!(!model.is_selected(&Symbol::from("GOLD")));
}
