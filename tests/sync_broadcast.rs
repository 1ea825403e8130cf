mod support;

use market_grid_wasm::domain::chart::{ChartApi, LogicalRange};
use support::{GridRig, daily_points, sym};

#[test]
fn a_manual_range_change_mirrors_to_every_peer_within_one_tick() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ", "VIX"]);
    rig.resolve("SPY", daily_points(30));
    rig.resolve("QQQ", daily_points(30));
    rig.resolve("VIX", daily_points(30));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    let qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();
    let vix = rig.factory.grid_chart(&sym("VIX")).unwrap();

    spy.emulate_user_range_change(LogicalRange::new(5.0, 12.0));

    assert_eq!(qqq.range(), Some(LogicalRange::new(5.0, 12.0)));
    assert_eq!(vix.range(), Some(LogicalRange::new(5.0, 12.0)));
}

#[test]
fn one_externally_triggered_change_produces_exactly_one_broadcast() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ"]);
    rig.resolve("SPY", daily_points(30));
    rig.resolve("QQQ", daily_points(30));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    let qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();
    let spy_writes = spy.set_range_calls();
    let qqq_writes = qqq.set_range_calls();

    spy.emulate_user_range_change(LogicalRange::new(3.0, 9.0));

    // The peer gets exactly one programmatic write; the mirrored change
    // never ping-pongs back into the source.
    assert_eq!(qqq.set_range_calls(), qqq_writes + 1);
    assert_eq!(spy.set_range_calls(), spy_writes);
}

#[test]
fn the_guard_clears_on_the_next_tick_so_later_changes_still_mirror() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ"]);
    rig.resolve("SPY", daily_points(30));
    rig.resolve("QQQ", daily_points(30));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    let qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();

    spy.emulate_user_range_change(LogicalRange::new(1.0, 4.0));
    rig.pump();
    qqq.emulate_user_range_change(LogicalRange::new(10.0, 20.0));

    assert_eq!(spy.range(), Some(LogicalRange::new(10.0, 20.0)));
    assert_eq!(qqq.range(), Some(LogicalRange::new(10.0, 20.0)));
}

#[test]
fn changes_while_the_guard_is_held_are_dropped_not_queued() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ"]);
    rig.resolve("SPY", daily_points(30));
    rig.resolve("QQQ", daily_points(30));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    let qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();

    spy.emulate_user_range_change(LogicalRange::new(1.0, 4.0));
    // Guard still held within the same tick: this one is coalesced away.
    spy.emulate_user_range_change(LogicalRange::new(2.0, 6.0));

    assert_eq!(qqq.range(), Some(LogicalRange::new(1.0, 4.0)));
}

#[test]
fn a_disposed_peer_is_skipped_without_breaking_the_broadcast() {
    let rig = GridRig::bootstrapped(&["SPY", "QQQ", "VIX"]);
    rig.resolve("SPY", daily_points(30));
    rig.resolve("QQQ", daily_points(30));
    rig.resolve("VIX", daily_points(30));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    let qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();
    let vix = rig.factory.grid_chart(&sym("VIX")).unwrap();

    // Dispose behind the group's back; detach has not happened yet.
    qqq.dispose();

    spy.emulate_user_range_change(LogicalRange::new(7.0, 9.0));
    assert_eq!(vix.range(), Some(LogicalRange::new(7.0, 9.0)));
}
