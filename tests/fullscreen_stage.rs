mod support;

use market_grid_wasm::domain::chart::{DismissSignal, LogicalRange, SurfaceKind};
use market_grid_wasm::domain::grid::OverlayState;
use support::{GridRig, daily_points, sym};

#[test]
fn the_stage_is_populated_from_the_already_loaded_series() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(30));

    rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();

    assert_eq!(rig.coordinator.fullscreen_symbol(), Some(sym("SPY")));
    let stage_surface = rig.factory.stage_surface().unwrap();
    assert_eq!(stage_surface.kind(), SurfaceKind::FullscreenStage);
    let stage_chart = rig.factory.stage_chart().unwrap();
    assert_eq!(stage_chart.data_len(), 30);
    assert_eq!(rig.coordinator.stage().overlay(), Some(OverlayState::DataReady));
}

#[test]
fn a_symbol_without_loaded_data_opens_in_the_empty_state() {
    let rig = GridRig::bootstrapped(&["SPY"]);

    rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();

    let stage_chart = rig.factory.stage_chart().unwrap();
    assert_eq!(stage_chart.data_len(), 0);
    assert_eq!(rig.coordinator.stage().overlay(), Some(OverlayState::EmptyReady));
}

#[test]
fn stage_pan_zoom_never_mirrors_to_or_from_the_grid() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ"]);
    rig.resolve("SPY", daily_points(30));
    rig.resolve("QQQ", daily_points(30));
    rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();
    rig.pump();

    let grid_spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    let grid_qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();
    let stage = rig.factory.stage_chart().unwrap();
    let grid_range = grid_spy.range();

    // Panning the stage moves nothing in the grid.
    stage.emulate_user_range_change(LogicalRange::new(1.0, 3.0));
    assert_eq!(grid_spy.range(), grid_range);
    assert_eq!(grid_qqq.range(), grid_range);

    // Panning the grid moves nothing on the stage.
    grid_spy.emulate_user_range_change(LogicalRange::new(8.0, 16.0));
    assert_eq!(stage.range(), Some(LogicalRange::new(1.0, 3.0)));
}

#[test]
fn every_dismiss_signal_closes_and_fully_disposes_the_stage() {
    for signal in [
        DismissSignal::CloseControl,
        DismissSignal::EscapeKey,
        DismissSignal::OutsideClick,
    ] {
        let rig = GridRig::bootstrapped(&["SPY"]);
        rig.resolve("SPY", daily_points(10));
        rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();

        let surface = rig.factory.stage_surface().unwrap();
        let chart = rig.factory.stage_chart().unwrap();
        assert!(surface.dismiss_observer_count() > 0);

        surface.emulate_dismiss(signal);
        // Teardown is deferred one frame.
        assert!(rig.coordinator.stage().is_open());
        rig.pump();

        assert!(!rig.coordinator.stage().is_open());
        assert!(chart.is_disposed());
        assert!(surface.is_removed());
        // No leaked listeners survive the close.
        assert_eq!(surface.dismiss_observer_count(), 0);
        assert_eq!(surface.size_observer_count(), 0);
    }
}

#[test]
fn closing_is_idempotent_and_reopening_replaces_the_stage() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ"]);
    rig.resolve("SPY", daily_points(10));
    rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();

    rig.coordinator.close_fullscreen();
    rig.coordinator.close_fullscreen();
    assert!(!rig.coordinator.stage().is_open());

    // Reopening for another symbol replaces any previous stage outright.
    rig.coordinator.open_fullscreen(&sym("QQQ")).unwrap();
    let first = rig.factory.stage_surface().unwrap();
    rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();
    assert!(first.is_removed());
    assert_eq!(rig.coordinator.fullscreen_symbol(), Some(sym("SPY")));
}

#[test]
fn the_stage_chart_never_joins_the_sync_group() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(10));
    assert_eq!(rig.coordinator.pool().sync_group().member_count(), 1);

    rig.coordinator.open_fullscreen(&sym("SPY")).unwrap();
    assert_eq!(rig.coordinator.pool().sync_group().member_count(), 1);
}
