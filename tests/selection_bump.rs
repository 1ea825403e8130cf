use std::cell::RefCell;
use std::rc::Rc;

use market_grid_wasm::domain::grid::{SelectionModel, ToggleChange};
use market_grid_wasm::domain::market_data::Symbol;
use market_grid_wasm::infrastructure::platform::ManualDelayScheduler;

fn full_model() -> (SelectionModel, ManualDelayScheduler) {
    let timers = ManualDelayScheduler::new();
    let model = SelectionModel::new(4, 2_000, Rc::new(timers.clone()));
    model.seed(&[
        Symbol::from("SPY"),
        Symbol::from("QQQ"),
        Symbol::from("VIX"),
        Symbol::from("US10Y"),
    ]);
    (model, timers)
}

#[test]
fn at_capacity_the_last_slot_is_replaced_and_bumped() {
    let (model, _timers) = full_model();

    let change = model.toggle(&Symbol::from("GOLD"));
    assert_eq!(
        change,
        ToggleChange::Replaced {
            added: Symbol::from("GOLD"),
            evicted: Symbol::from("US10Y"),
        }
    );
    assert_eq!(
        model.selected(),
        vec![
            Symbol::from("SPY"),
            Symbol::from("QQQ"),
            Symbol::from("VIX"),
            Symbol::from("GOLD"),
        ]
    );
    // The evicted symbol is highlighted and no longer visible.
    assert_eq!(model.bumped(), Some(Symbol::from("US10Y")));
    assert!(!model.is_selected(&Symbol::from("US10Y")));
}

#[test]
fn bump_clears_automatically_after_the_configured_interval() {
    let (model, timers) = full_model();
    model.toggle(&Symbol::from("GOLD"));
    assert!(model.bumped().is_some());

    timers.advance(1_999);
    assert_eq!(model.bumped(), Some(Symbol::from("US10Y")));

    timers.advance(1);
    assert_eq!(model.bumped(), None);
}

#[test]
fn a_new_eviction_supersedes_the_pending_auto_clear() {
    let (model, timers) = full_model();
    model.toggle(&Symbol::from("GOLD"));
    timers.advance(1_500);

    // Second eviction before the first expiry: fresh highlight, fresh timer.
    model.toggle(&Symbol::from("WTI"));
    assert_eq!(model.bumped(), Some(Symbol::from("GOLD")));

    // The original deadline passes without clearing the new bump.
    timers.advance(600);
    assert_eq!(model.bumped(), Some(Symbol::from("GOLD")));

    timers.advance(1_400);
    assert_eq!(model.bumped(), None);
}

#[test]
fn any_interaction_retires_the_highlight_immediately() {
    let (model, timers) = full_model();
    model.toggle(&Symbol::from("GOLD"));
    assert!(model.bumped().is_some());

    model.toggle(&Symbol::from("SPY"));
    assert_eq!(model.bumped(), None);
    // The cancelled timer must not fire later against a new state.
    assert_eq!(timers.pending_count(), 0);
}

#[test]
fn bump_listener_sees_set_and_clear() {
    let (model, timers) = full_model();
    let events: Rc<RefCell<Vec<Option<Symbol>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    model.set_bump_listener(Rc::new(move |bump| sink.borrow_mut().push(bump)));

    model.toggle(&Symbol::from("GOLD"));
    timers.advance(2_000);

    assert_eq!(
        *events.borrow(),
        vec![Some(Symbol::from("US10Y")), None]
    );
}
