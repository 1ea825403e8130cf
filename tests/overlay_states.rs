mod support;

use market_grid_wasm::domain::grid::OverlayState;
use support::{GridRig, daily_points, sym};

#[test]
fn viewports_enter_the_visible_set_loading() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ"]);
    assert_eq!(rig.overlay_of("SPY"), Some(OverlayState::Loading));
    assert_eq!(rig.overlay_of("QQQ"), Some(OverlayState::Loading));
}

#[test]
fn a_non_empty_resolution_is_data_ready() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(5));
    assert_eq!(rig.overlay_of("SPY"), Some(OverlayState::DataReady));

    let chart = rig.factory.grid_chart(&sym("SPY")).unwrap();
    assert_eq!(chart.data_len(), 5);
}

#[test]
fn an_empty_resolution_is_empty_ready() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", Vec::new());
    assert_eq!(rig.overlay_of("SPY"), Some(OverlayState::EmptyReady));
}

#[test]
fn a_rejection_marks_only_that_symbol() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ", "VIX"]);
    rig.resolve("QQQ", daily_points(5));

    rig.reject("SPY", "provider unavailable");

    assert_eq!(rig.overlay_of("SPY"), Some(OverlayState::Error));
    // Every other symbol keeps its state.
    assert_eq!(rig.overlay_of("QQQ"), Some(OverlayState::DataReady));
    assert_eq!(rig.overlay_of("VIX"), Some(OverlayState::Loading));
}

#[test]
fn a_rejection_keeps_previously_rendered_data_visible() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(20));
    let chart = rig.factory.grid_chart(&sym("SPY")).unwrap();
    assert_eq!(chart.set_data_calls(), 1);

    // Refresh fails: the error overlay goes up, the old line stays.
    rig.coordinator.set_granularity(
        market_grid_wasm::domain::market_data::Granularity::Weekly,
    );
    rig.pump();
    assert_eq!(rig.overlay_of("SPY"), Some(OverlayState::Loading));

    rig.reject("SPY", "upstream timeout");
    assert_eq!(rig.overlay_of("SPY"), Some(OverlayState::Error));
    assert_eq!(chart.data_len(), 20);
    assert_eq!(chart.set_data_calls(), 1);
}

#[test]
fn overlay_transitions_are_published_to_the_listener() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(3));
    rig.toggle("SPY");

    let events = rig.overlay_events.borrow();
    assert_eq!(
        *events,
        vec![
            (sym("SPY"), OverlayState::Loading),
            (sym("SPY"), OverlayState::DataReady),
        ]
    );
}
