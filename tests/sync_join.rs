mod support;

use market_grid_wasm::domain::chart::LogicalRange;
use support::{GridRig, daily_points, sym};

#[test]
fn the_first_member_fits_to_its_own_data_extent() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(50));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    assert!(spy.fit_calls() > 0);
    assert_eq!(spy.range(), Some(LogicalRange::new(0.0, 49.0)));
}

#[test]
fn a_joiner_inherits_the_group_range_instead_of_fitting() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(100));

    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    rig.pump();
    spy.emulate_user_range_change(LogicalRange::new(10.0, 25.0));
    rig.pump();

    rig.toggle("QQQ");
    let qqq = rig.factory.grid_chart(&sym("QQQ")).unwrap();
    // Aligned to the group before its own data even exists.
    assert_eq!(qqq.range(), Some(LogicalRange::new(10.0, 25.0)));

    rig.resolve("QQQ", daily_points(40));
    // Data landing re-aligns to the group range, never a full-data fit.
    assert_eq!(qqq.range(), Some(LogicalRange::new(10.0, 25.0)));
    assert_eq!(qqq.fit_calls(), 0);
}

#[test]
fn join_alignment_does_not_broadcast_outward() {
    let rig = GridRig::bootstrapped(&["SPY"]);
    rig.resolve("SPY", daily_points(100));
    let spy = rig.factory.grid_chart(&sym("SPY")).unwrap();
    rig.pump();
    spy.emulate_user_range_change(LogicalRange::new(10.0, 25.0));
    rig.pump();

    let spy_writes = spy.set_range_calls();
    rig.toggle("QQQ");
    rig.resolve("QQQ", daily_points(40));

    // The joiner's programmatic alignment fired notifications, but none of
    // them were mirrored back into the existing member.
    assert_eq!(spy.set_range_calls(), spy_writes);
    assert_eq!(spy.range(), Some(LogicalRange::new(10.0, 25.0)));
}
